//!
//! One module per probe. Each exposes a `run` function that its binary hands to `launch`, plus
//! a handler struct generic over the drawing traits so redraws can be checked without a server.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{AllocColorReply, Gcontext, Window},
};

use crate::connection::ProbeConnection;

pub mod color;
pub mod comprehensive;
pub mod cursor;
pub mod font;
pub mod input_grab;
pub mod paint;
pub mod pixmap;
pub mod simple_cursor;
pub mod window;

/// Prints the result of a colour allocation and makes a foreground GC for it.
///
/// A failed allocation leaves the GC unset.
pub fn color_gc<C: Connection>(
    conn: &ProbeConnection<'_, C>,
    window: Window,
    name: &str,
    reply: Option<&AllocColorReply>,
) -> Result<Option<Gcontext>, ReplyOrIdError> {
    match reply {
        Some(r) => println!(
            "✅ {name}: pixel={}, RGB=({},{},{})",
            r.pixel, r.red, r.green, r.blue
        ),
        None => println!("❌ couldn't allocate {name}"),
    }
    conn.create_color_gc(window, reply)
}
