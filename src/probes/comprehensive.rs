//!
//! Runs the whole request surface once, one sub-test after another, printing what the server said.
//!
//! Each sub-test frees what it created before the next one starts.
use x11rb::{
    connection::Connection,
    protocol::xproto::{CreateWindowAux, EventMask, Window},
};

use crate::{
    config::Config,
    connection::{
        ConnectionInfoExt, ConnectionInputExt, PointerPosition, ProbeConnection, Res, Rgb,
        WindowSpec,
    },
    probes::cursor::{CURSOR_SIZE, HOTSPOT},
    resources::Resource,
    wait_for_enter,
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 300,
    height: 200,
    border: 1,
};

/// `WM_CLASS` is an instance name and a class name, each NUL terminated.
pub const WM_CLASS_VALUE: &[u8] = b"TestApp\0TestClass\0";
pub const EXTENSION: &str = "BIG-REQUESTS";

fn test_colors<C: Connection>(
    conn: &ProbeConnection<'_, C>,
    window: Window,
    config: &Config,
) -> Res {
    println!("\n🎨 colours");
    let colormap = conn.create_colormap(window)?;
    match conn.alloc_color(colormap, config.red)? {
        Some(reply) => println!("✅ red allocated: pixel {}", reply.pixel),
        None => println!("❌ couldn't allocate red"),
    }
    conn.release(Resource::Colormap(colormap))
}

fn test_fonts<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    println!("\n🔤 fonts");
    let font = conn.open_font(&config.info_font)?;
    match conn.query_font(font)? {
        Some(info) => println!(
            "✅ {}: ascent {}, descent {}",
            config.info_font, info.ascent, info.descent
        ),
        None => println!("❌ couldn't query {}", config.info_font),
    }
    conn.release(Resource::Font(font))
}

fn test_cursor<C: Connection>(conn: &ProbeConnection<'_, C>, window: Window) -> Res {
    println!("\n🖱️ cursor");
    let source = conn.create_pixmap(1, window, CURSOR_SIZE, CURSOR_SIZE)?;
    let mask = conn.create_pixmap(1, window, CURSOR_SIZE, CURSOR_SIZE)?;
    let cursor = conn.create_pixmap_cursor(source, mask, Rgb::BLACK, Rgb::WHITE, HOTSPOT)?;
    println!("✅ cursor created: {cursor}");

    conn.release(Resource::Cursor(cursor))?;
    conn.release(Resource::Pixmap(mask))?;
    conn.release(Resource::Pixmap(source))
}

/// Where the pointer sits, relative to the probe window.
#[must_use]
pub fn pointer_line(p: &PointerPosition) -> String {
    format!("pointer at ({}, {}) in the window", p.win_x, p.win_y)
}

fn test_grab_input<C: Connection>(conn: &ProbeConnection<'_, C>, window: Window) -> Res {
    println!("\n✋ input grab");
    match conn.grab_pointer(window, EventMask::BUTTON_PRESS)? {
        Some(status) => {
            println!("✅ pointer grab status: {status}");
            conn.ungrab_pointer()?;
        }
        None => println!("❌ pointer grab failed"),
    }

    match conn.query_pointer(window)? {
        Some(p) => println!("✅ {}", pointer_line(&p)),
        None => println!("❌ couldn't query the pointer"),
    }
    Ok(())
}

fn test_properties<C: Connection>(conn: &ProbeConnection<'_, C>, window: Window) -> Res {
    println!("\n🏷️ properties");
    match conn.intern_atom("WM_CLASS")? {
        Some(atom) => {
            println!("✅ WM_CLASS atom: {atom}");
            conn.set_string_property(window, atom, WM_CLASS_VALUE)?;
            println!("✅ WM_CLASS set");
        }
        None => println!("❌ couldn't intern WM_CLASS"),
    }
    Ok(())
}

fn test_extensions<C: Connection>(conn: &ProbeConnection<'_, C>) -> Res {
    println!("\n🧩 extensions");
    match conn.query_extension(EXTENSION)? {
        Some(ext) => println!(
            "✅ {EXTENSION}: present {}, major opcode {}, first event {}",
            ext.present, ext.major_opcode, ext.first_event
        ),
        None => println!("❌ couldn't query {EXTENSION}"),
    }
    if let Some(count) = conn.count_extensions()? {
        println!("✅ server lists {count} extensions");
    }
    Ok(())
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new().event_mask(EventMask::EXPOSURE),
    )?;
    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window created: {window}");

    test_colors(conn, window, config)?;
    test_fonts(conn, config)?;
    test_cursor(conn, window)?;
    test_grab_input(conn, window)?;
    test_properties(conn, window)?;
    test_extensions(conn)?;
    conn.flush()?;

    println!("\n✅ all sub-tests ran");
    wait_for_enter();

    conn.destroy_window(window)?;
    conn.flush()
}
