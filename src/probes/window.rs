//! The smallest probe: a bare window that stays up until Enter is pressed.
use x11rb::{connection::Connection, protocol::xproto::CreateWindowAux};

use crate::{
    config::Config,
    connection::{ProbeConnection, Res, WindowSpec},
    wait_for_enter,
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 200,
    y: 200,
    width: 400,
    height: 300,
    border: 2,
};

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, _config: &Config) -> Res {
    let window = conn.create_window(WINDOW, &CreateWindowAux::new())?;

    conn.map_window(window)?;
    conn.flush()?;

    println!("✅ window created! id: {window}");
    wait_for_enter();

    conn.destroy_window(window)?;
    conn.flush()
}
