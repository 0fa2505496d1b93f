//! A cursor built from two 1 bit pixmaps.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        ButtonPressEvent, CreateWindowAux, EventMask, ExposeEvent, Gcontext, KeyPressEvent, Pixmap,
        Rectangle, Window,
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

pub const CURSOR_SIZE: u16 = 16;
pub const HOTSPOT: (u16, u16) = (8, 8);

const fn rect(x: i16, y: i16, width: u16, height: u16) -> Rectangle {
    Rectangle {
        x,
        y,
        width,
        height,
    }
}

/// The cross drawn into the source bitmap.
pub const CROSSHAIR: [Rectangle; 2] = [rect(2, 7, 12, 2), rect(7, 2, 2, 12)];
/// The same cross, one pixel wider on every side.
pub const CROSSHAIR_MASK: [Rectangle; 2] = [rect(1, 6, 14, 4), rect(6, 1, 4, 14)];

/// Paints the cursor's source and mask bitmaps.
///
/// Both are cleared with `clear_gc`, then the cross is drawn with `ink_gc`.
pub fn draw_cursor_bitmaps(
    canvas: &impl Canvas,
    source: Pixmap,
    mask: Pixmap,
    clear_gc: Gcontext,
    ink_gc: Gcontext,
) -> Res {
    let full = rect(0, 0, CURSOR_SIZE, CURSOR_SIZE);
    canvas.fill_rectangles(source, clear_gc, &[full])?;
    canvas.fill_rectangles(mask, clear_gc, &[full])?;
    canvas.fill_rectangles(source, ink_gc, &CROSSHAIR)?;
    canvas.fill_rectangles(mask, ink_gc, &CROSSHAIR_MASK)
}

pub struct CursorProbe<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub background_gc: Gcontext,
}

impl<K: Canvas> ProbeHandler for CursorProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.canvas
            .fill_rectangles(self.window, self.background_gc, &[WINDOW.area()])?;
        println!("🖼️ window drawn");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        println!("⌨️ key pressed ({}), exiting", event.detail);
        Ok(Flow::Exit)
    }

    fn on_button_press(&mut self, event: ButtonPressEvent) -> Result<Flow, ReplyOrIdError> {
        println!("🖱️ button {} pressed, exiting", event.detail);
        Ok(Flow::Exit)
    }
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, _config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new()
            .event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS | EventMask::BUTTON_PRESS),
    )?;

    let source = conn.create_pixmap(1, window, CURSOR_SIZE, CURSOR_SIZE)?;
    let mask = conn.create_pixmap(1, window, CURSOR_SIZE, CURSOR_SIZE)?;
    let white_gc = conn.create_foreground_gc(source, conn.screen.white_pixel)?;
    let black_gc = conn.create_foreground_gc(source, conn.screen.black_pixel)?;
    draw_cursor_bitmaps(conn, source, mask, white_gc, black_gc)?;

    let cursor = conn.create_pixmap_cursor(source, mask, Rgb::BLACK, Rgb::WHITE, HOTSPOT)?;
    println!("✅ cursor created: {cursor}");

    let background_gc = conn.create_foreground_gc(window, conn.screen.white_pixel)?;

    conn.map_window(window)?;
    conn.set_window_cursor(window, cursor)?;
    conn.flush()?;
    println!("✅ window shown with the custom cursor");
    println!("🎯 move the pointer over the window, then press a key or click to exit");

    run_event_loop(
        conn.conn,
        &mut CursorProbe {
            canvas: conn,
            window,
            background_gc,
        },
    )?;

    println!("✅ cursor test finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingCanvas};

    fn contains(outer: &Rectangle, inner: &Rectangle) -> bool {
        outer.x <= inner.x
            && outer.y <= inner.y
            && i32::from(outer.x) + i32::from(outer.width)
                >= i32::from(inner.x) + i32::from(inner.width)
            && i32::from(outer.y) + i32::from(outer.height)
                >= i32::from(inner.y) + i32::from(inner.height)
    }

    #[test]
    fn mask_covers_the_cross() {
        for (source, mask) in CROSSHAIR.iter().zip(&CROSSHAIR_MASK) {
            assert!(contains(mask, source), "{mask:?} doesn't cover {source:?}");
        }
    }

    #[test]
    fn cross_fits_the_bitmap_and_hotspot_is_inside() {
        let full = rect(0, 0, CURSOR_SIZE, CURSOR_SIZE);
        assert!(CROSSHAIR_MASK.iter().all(|r| contains(&full, r)));
        assert!(HOTSPOT.0 < CURSOR_SIZE && HOTSPOT.1 < CURSOR_SIZE);
    }

    #[test]
    fn bitmaps_are_cleared_before_the_cross() {
        let canvas = RecordingCanvas::default();
        draw_cursor_bitmaps(&canvas, 1, 2, 10, 11).unwrap();

        let full = rect(0, 0, 16, 16);
        assert_eq!(
            canvas.calls(),
            vec![
                Call::Fill {
                    drawable: 1,
                    gc: 10,
                    rects: vec![full]
                },
                Call::Fill {
                    drawable: 2,
                    gc: 10,
                    rects: vec![full]
                },
                Call::Fill {
                    drawable: 1,
                    gc: 11,
                    rects: CROSSHAIR.to_vec()
                },
                Call::Fill {
                    drawable: 2,
                    gc: 11,
                    rects: CROSSHAIR_MASK.to_vec()
                },
            ]
        );
    }

    #[test]
    fn key_and_button_both_exit() {
        let canvas = RecordingCanvas::default();
        let mut probe = CursorProbe {
            canvas: &canvas,
            window: 1,
            background_gc: 2,
        };
        assert_eq!(
            probe.on_key_press(KeyPressEvent::default()).unwrap(),
            Flow::Exit
        );
        assert_eq!(
            probe.on_button_press(ButtonPressEvent::default()).unwrap(),
            Flow::Exit
        );
    }
}
