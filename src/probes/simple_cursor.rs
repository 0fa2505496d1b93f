//! A glyph cursor from the core `cursor` font, or a themed one when asked for.
use x11rb::{
    NONE,
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        CreateWindowAux, EventMask, ExposeEvent, Gcontext, KeyPressEvent, Point, Window,
    },
};

use crate::{
    config::Config,
    connection::{Canvas, ProbeConnection, Res, Rgb, WindowSpec},
    events::{Flow, ProbeHandler, run_event_loop},
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 400,
    height: 300,
    border: 2,
};

pub const THEME_CURSOR: &str = "left_ptr";

const fn point(x: i16, y: i16) -> Point {
    Point { x, y }
}

/// Four edges of (50,50)-(350,250) as endpoint pairs, sent as a single polyline.
pub const OUTLINE: [Point; 8] = [
    point(50, 50),
    point(350, 50),
    point(350, 50),
    point(350, 250),
    point(350, 250),
    point(50, 250),
    point(50, 250),
    point(50, 50),
];

pub struct SimpleCursorProbe<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub gc: Gcontext,
}

impl<K: Canvas> ProbeHandler for SimpleCursorProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.canvas.draw_polyline(self.window, self.gc, &OUTLINE)?;
        println!("🖼️ outline drawn");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        println!("⌨️ key pressed, exiting");
        Ok(Flow::Exit)
    }
}

/// Swaps in the themed cursor. Failures leave the current cursor alone.
fn try_theme_cursor<C: Connection>(conn: &ProbeConnection<'_, C>, window: Window) -> Res {
    match conn.load_theme_cursor(THEME_CURSOR) {
        Ok(cursor) if cursor != NONE => {
            conn.set_window_cursor(window, cursor)?;
            println!("✅ themed cursor set: {THEME_CURSOR}");
        }
        Ok(_) => log::error!("cursor theme has no {THEME_CURSOR}"),
        Err(e) => log::error!("couldn't load themed cursor! {e}"),
    }
    Ok(())
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new()
            .background_pixel(conn.screen.white_pixel)
            .event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
    )?;

    let cursor_font = conn.open_font("cursor")?;
    let cursor =
        conn.create_glyph_cursor(cursor_font, config.cursor_glyph, Rgb::BLACK, Rgb::WHITE)?;
    println!("✅ glyph cursor {} created: {cursor}", config.cursor_glyph);
    conn.set_window_cursor(window, cursor)?;

    if config.try_theme_cursor {
        try_theme_cursor(conn, window)?;
    }

    let gc = conn.create_foreground_gc(window, conn.screen.black_pixel)?;

    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window shown");
    println!("🎯 press any key to exit");

    run_event_loop(
        conn.conn,
        &mut SimpleCursorProbe {
            canvas: conn,
            window,
            gc,
        },
    )?;

    println!("✅ simple cursor test finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingCanvas};

    #[test]
    fn expose_draws_the_outline_in_one_request() {
        let canvas = RecordingCanvas::default();
        let mut probe = SimpleCursorProbe {
            canvas: &canvas,
            window: 4,
            gc: 5,
        };
        probe.on_expose(ExposeEvent::default()).unwrap();

        assert_eq!(
            canvas.calls(),
            vec![Call::Polyline {
                drawable: 4,
                gc: 5,
                points: OUTLINE.to_vec()
            }]
        );
    }

    #[test]
    fn outline_is_closed() {
        assert_eq!(OUTLINE.first(), OUTLINE.last());
        for pair in OUTLINE.chunks(2).collect::<Vec<_>>().windows(2) {
            assert_eq!(pair[0][1], pair[1][0]);
        }
    }
}
