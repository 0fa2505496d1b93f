// Xephyr -br -ac -noreset -screen 800x600 :1
// DISPLAY=:1 cargo run --bin final_test
#![warn(clippy::correctness)]
#![warn(clippy::suspicious)]
#![warn(clippy::complexity)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
//! Manual X11 probes.
//!
//! Every binary under `src/bin` is one probe: it connects, creates a few server resources, maps a
//! window and sits in a blocking event loop so a human can look at the result. This library holds
//! what the probes share.

pub mod config;
pub mod connection;
pub mod events;
pub mod keys;
pub mod pixels;
pub mod probes;
pub mod resources;
pub mod stage;
pub mod text;

#[cfg(test)]
mod testing;

use std::{io::BufRead as _, process::ExitCode};

use x11rb::{connection::Connection, rust_connection::RustConnection};

use crate::{
    config::{Config, ConfigDeserialized},
    connection::{ProbeConnection, Res},
};

/// Sets up `env_logger` on stdout, defaulting to `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
}

/// Runs a probe from start to finish.
///
/// Connects with the default display, runs `probe`, then frees every resource the probe
/// registered (even if the probe failed) before the connection is dropped.
///
/// Exit code is 1 when the connection can't be opened or the probe returns an error.
pub fn launch<F>(title: &str, probe: F) -> ExitCode
where
    F: FnOnce(&ProbeConnection<'_, RustConnection>, &Config) -> Res,
{
    init_logging();
    println!("=== {title} ===");

    let config = Config::from(ConfigDeserialized::new());

    let (conn, screen_num) = match x11rb::connect(None) {
        Ok(c) => c,
        Err(e) => {
            log::error!("connection failed: {e}");
            println!("❌ could not connect to the X server");
            return ExitCode::from(1);
        }
    };

    let probe_conn = ProbeConnection::new(&conn, screen_num);
    println!(
        "✅ connected to screen {}x{}, depth {}",
        probe_conn.screen.width_in_pixels,
        probe_conn.screen.height_in_pixels,
        probe_conn.screen.root_depth
    );

    let result = probe(&probe_conn, &config);
    let released = probe_conn.release_all();
    let flushed = conn.flush().map_err(Into::into);

    match result.and(released).and(flushed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}

/// Blocks until the user presses Enter on stdin.
pub fn wait_for_enter() {
    println!("Press Enter to close...");
    let mut line = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut line) {
        log::error!("couldn't read stdin: {e}");
    }
}
