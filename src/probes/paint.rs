//!
//! A small paint program: drag to draw, number keys pick a colour, `c` clears.
//!
//! Everything drawn is kept as strokes and replayed on expose. The top 40 pixels hold the
//! palette and never take paint.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        ButtonPressEvent, ButtonReleaseEvent, CreateWindowAux, EventMask, ExposeEvent, Gcontext,
        KeyPressEvent, MotionNotifyEvent, Point, Rectangle, Window,
    },
};
use xkeysym::Keysym;

use crate::{
    config::Config,
    connection::{Canvas, ConnectionInfoExt, ProbeConnection, Res, Rgb, WindowSpec, fill_with},
    events::{Flow, ProbeHandler, run_event_loop},
    keys::{KeyHandler, key_label},
    probes::color_gc,
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 600,
    height: 400,
    border: 1,
};

pub const WINDOW_TITLE: &str = "Simple Paint";
/// Height of the palette strip. Strokes only start and continue below it.
pub const TOOLBAR_HEIGHT: u16 = 40;
pub const TITLE_POS: (i16, i16) = (10, 20);
pub const HINT_POS: (i16, i16) = (450, 20);

/// Keycodes of `1`..`4` on a standard evdev/xorg layout.
const FALLBACK_PALETTE_KEYCODES: [u8; 4] = [10, 11, 12, 13];
/// Keycode of `c` on the same layout.
const FALLBACK_CLEAR_KEYCODE: u8 = 54;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Brush {
    #[default]
    Black,
    Red,
    Green,
    Blue,
}

impl Brush {
    pub const PALETTE: [Self; 4] = [Self::Black, Self::Red, Self::Green, Self::Blue];

    const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

/// The palette square of the `index`th brush.
#[must_use]
pub const fn swatch(index: usize) -> Rectangle {
    Rectangle {
        x: 150 + index as i16 * 60,
        y: 5,
        width: 30,
        height: 30,
    }
}

/// The frame around the selected swatch.
#[must_use]
pub const fn selection_frame(index: usize) -> Rectangle {
    let s = swatch(index);
    Rectangle {
        x: s.x - 2,
        y: s.y - 2,
        width: s.width + 4,
        height: s.height + 4,
    }
}

#[must_use]
pub fn key_hint(exit_key: &str) -> String {
    format!("1-4: colors, C: clear, {}: exit", key_label(exit_key))
}

const fn in_canvas(y: i16) -> bool {
    y > TOOLBAR_HEIGHT as i16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stroke {
    pub brush: Brush,
    pub from: Point,
    pub to: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintKey {
    Select(Brush),
    Clear,
    Exit,
}

/// Keycodes for the palette and clear keys, looked up in the server's keymap.
pub struct PaintKeys {
    pub keys: KeyHandler,
    pub palette: [u8; 4],
    pub clear: u8,
}

impl PaintKeys {
    #[must_use]
    pub fn new(keys: KeyHandler) -> Self {
        let code = |ch: char, fallback: u8| {
            keys.code_for(Keysym::from_char(ch))
                .and_then(|code| u8::try_from(code.raw()).ok())
                .unwrap_or_else(|| {
                    log::debug!("no keycode for {ch}, using {fallback}");
                    fallback
                })
        };
        let mut palette = FALLBACK_PALETTE_KEYCODES;
        for (slot, ch) in palette.iter_mut().zip(['1', '2', '3', '4']) {
            *slot = code(ch, *slot);
        }
        let clear = code('c', FALLBACK_CLEAR_KEYCODE);
        Self {
            keys,
            palette,
            clear,
        }
    }

    #[must_use]
    pub fn classify(&self, keycode: u8) -> Option<PaintKey> {
        if self.keys.is_exit(keycode) {
            return Some(PaintKey::Exit);
        }
        if keycode == self.clear {
            return Some(PaintKey::Clear);
        }
        self.palette
            .iter()
            .position(|&code| code == keycode)
            .map(|i| PaintKey::Select(Brush::PALETTE[i]))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PaintGcs {
    pub white: Gcontext,
    pub black: Gcontext,
    pub text: Gcontext,
    pub red: Option<Gcontext>,
    pub green: Option<Gcontext>,
    pub blue: Option<Gcontext>,
}

impl PaintGcs {
    const fn for_brush(&self, brush: Brush) -> Option<Gcontext> {
        match brush {
            Brush::Black => Some(self.black),
            Brush::Red => self.red,
            Brush::Green => self.green,
            Brush::Blue => self.blue,
        }
    }
}

pub struct PaintApp<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub gcs: PaintGcs,
    pub keys: PaintKeys,
    pub hint: String,
    pub brush: Brush,
    /// Where the pointer was when it last painted, while a button is held.
    pub last: Option<Point>,
    pub strokes: Vec<Stroke>,
}

impl<K: Canvas> PaintApp<'_, K> {
    fn draw_ui(&self) -> Res {
        let strip = Rectangle {
            x: 0,
            y: 0,
            width: WINDOW.width,
            height: TOOLBAR_HEIGHT,
        };
        self.canvas
            .fill_rectangles(self.window, self.gcs.white, &[strip])?;
        self.canvas.draw_text(
            self.window,
            self.gcs.text,
            TITLE_POS.0,
            TITLE_POS.1,
            WINDOW_TITLE,
        )?;

        for (i, brush) in Brush::PALETTE.into_iter().enumerate() {
            let gc = self.gcs.for_brush(brush);
            fill_with(self.canvas, self.window, gc, swatch(i))?;
            if brush == self.brush {
                self.canvas
                    .draw_rectangles(self.window, self.gcs.black, &[selection_frame(i)])?;
            }
        }

        self.canvas.draw_text(
            self.window,
            self.gcs.text,
            HINT_POS.0,
            HINT_POS.1,
            &self.hint,
        )
    }

    fn draw_stroke(&self, stroke: &Stroke) -> Res {
        match self.gcs.for_brush(stroke.brush) {
            Some(gc) => self
                .canvas
                .draw_polyline(self.window, gc, &[stroke.from, stroke.to]),
            None => Ok(()),
        }
    }

    fn clear(&mut self) -> Res {
        self.strokes.clear();
        let area = Rectangle {
            x: 0,
            y: TOOLBAR_HEIGHT as i16,
            width: WINDOW.width,
            height: WINDOW.height - TOOLBAR_HEIGHT,
        };
        self.canvas
            .fill_rectangles(self.window, self.gcs.white, &[area])?;
        self.draw_ui()
    }
}

impl<K: Canvas> ProbeHandler for PaintApp<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.draw_ui()?;
        for stroke in &self.strokes {
            self.draw_stroke(stroke)?;
        }
        Ok(Flow::Continue)
    }

    fn on_button_press(&mut self, event: ButtonPressEvent) -> Result<Flow, ReplyOrIdError> {
        if in_canvas(event.event_y) {
            self.last = Some(Point {
                x: event.event_x,
                y: event.event_y,
            });
            println!(
                "🖊️ start drawing at ({}, {})",
                event.event_x, event.event_y
            );
        }
        Ok(Flow::Continue)
    }

    fn on_button_release(&mut self, _event: ButtonReleaseEvent) -> Result<Flow, ReplyOrIdError> {
        if self.last.take().is_some() {
            println!("🖊️ stop drawing");
        }
        Ok(Flow::Continue)
    }

    fn on_motion_notify(&mut self, event: MotionNotifyEvent) -> Result<Flow, ReplyOrIdError> {
        let Some(from) = self.last else {
            return Ok(Flow::Continue);
        };
        if !in_canvas(event.event_y) {
            return Ok(Flow::Continue);
        }

        let to = Point {
            x: event.event_x,
            y: event.event_y,
        };
        let stroke = Stroke {
            brush: self.brush,
            from,
            to,
        };
        self.draw_stroke(&stroke)?;
        self.strokes.push(stroke);
        self.last = Some(to);
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        match self.keys.classify(event.detail) {
            Some(PaintKey::Select(brush)) => {
                self.brush = brush;
                println!("🎨 colour changed to {}", brush.name());
                self.draw_ui()?;
            }
            Some(PaintKey::Clear) => {
                println!("🧹 canvas cleared");
                self.clear()?;
            }
            Some(PaintKey::Exit) => {
                println!("🚪 exit key pressed");
                return Ok(Flow::Exit);
            }
            None => log::trace!("unbound key {}", event.detail),
        }
        Ok(Flow::Continue)
    }
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new()
            .background_pixel(conn.screen.white_pixel)
            .event_mask(
                EventMask::EXPOSURE
                    | EventMask::BUTTON_PRESS
                    | EventMask::BUTTON_RELEASE
                    | EventMask::POINTER_MOTION
                    | EventMask::KEY_PRESS,
            ),
    )?;
    conn.set_title(window, WINDOW_TITLE)?;

    let font = conn.open_font(&config.info_font)?;
    let cursor_font = conn.open_font("cursor")?;
    let cursor =
        conn.create_glyph_cursor(cursor_font, config.cursor_glyph, Rgb::BLACK, Rgb::WHITE)?;
    conn.set_window_cursor(window, cursor)?;

    let colormap = conn.create_colormap(window)?;
    let white = conn.create_foreground_gc(window, conn.screen.white_pixel)?;
    let black = conn.create_foreground_gc(window, conn.screen.black_pixel)?;
    let red = conn.alloc_color(colormap, config.red)?;
    let green = conn.alloc_color(colormap, config.green)?;
    let blue = conn.alloc_color(colormap, config.blue)?;
    let red = color_gc(conn, window, "red", red.as_ref())?;
    let green = color_gc(conn, window, "green", green.as_ref())?;
    let blue = color_gc(conn, window, "blue", blue.as_ref())?;
    let text = conn.create_text_gc(window, font)?;

    conn.map_window(window)?;
    conn.flush()?;
    println!("🎨 paint started");
    println!("🖱️ drag to draw");
    println!("🎨 press 1-4 to change colours");
    println!("🧹 press c to clear");
    println!("🚪 press {} to exit", config.exit_key);

    let mut app = PaintApp {
        canvas: conn,
        window,
        gcs: PaintGcs {
            white,
            black,
            text,
            red,
            green,
            blue,
        },
        keys: PaintKeys::new(KeyHandler::new(conn.conn, config)?),
        hint: key_hint(&config.exit_key),
        brush: Brush::default(),
        last: None,
        strokes: Vec::new(),
    };
    run_event_loop(conn.conn, &mut app)?;

    println!("✅ paint finished with {} strokes", app.strokes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use xkeysym::{KeyCode, RawKeysym};

    use super::*;
    use crate::{
        keys::build_sym_code,
        testing::{Call, RecordingCanvas},
    };

    const GCS: PaintGcs = PaintGcs {
        white: 1,
        black: 2,
        text: 3,
        red: Some(10),
        green: Some(11),
        blue: None,
    };

    fn paint_app(canvas: &RecordingCanvas) -> PaintApp<'_, RecordingCanvas> {
        PaintApp {
            canvas,
            window: 5,
            gcs: GCS,
            keys: PaintKeys::new(KeyHandler::from_map(HashMap::new(), "Escape")),
            hint: key_hint("Escape"),
            brush: Brush::Black,
            last: None,
            strokes: Vec::new(),
        }
    }

    fn press(x: i16, y: i16) -> ButtonPressEvent {
        ButtonPressEvent {
            event_x: x,
            event_y: y,
            ..ButtonPressEvent::default()
        }
    }

    fn motion(x: i16, y: i16) -> MotionNotifyEvent {
        MotionNotifyEvent {
            event_x: x,
            event_y: y,
            ..MotionNotifyEvent::default()
        }
    }

    fn key(detail: u8) -> KeyPressEvent {
        KeyPressEvent {
            detail,
            ..KeyPressEvent::default()
        }
    }

    fn line(gc: Gcontext, from: (i16, i16), to: (i16, i16)) -> Call {
        Call::Polyline {
            drawable: 5,
            gc,
            points: vec![
                Point {
                    x: from.0,
                    y: from.1,
                },
                Point { x: to.0, y: to.1 },
            ],
        }
    }

    #[test]
    fn dragging_draws_and_records_segments() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);

        app.on_button_press(press(100, 100)).unwrap();
        app.on_motion_notify(motion(110, 105)).unwrap();
        app.on_motion_notify(motion(120, 115)).unwrap();
        app.on_button_release(ButtonReleaseEvent::default()).unwrap();
        app.on_motion_notify(motion(200, 200)).unwrap();

        assert_eq!(
            canvas.calls(),
            vec![
                line(2, (100, 100), (110, 105)),
                line(2, (110, 105), (120, 115)),
            ]
        );
        assert_eq!(app.strokes.len(), 2);
        assert_eq!(app.last, None);
    }

    #[test]
    fn the_toolbar_takes_no_paint() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);

        app.on_button_press(press(100, 40)).unwrap();
        app.on_motion_notify(motion(110, 100)).unwrap();
        assert!(canvas.calls().is_empty());

        app.on_button_press(press(100, 100)).unwrap();
        app.on_motion_notify(motion(110, 20)).unwrap();
        app.on_motion_notify(motion(120, 90)).unwrap();
        assert_eq!(canvas.calls(), vec![line(2, (100, 100), (120, 90))]);
    }

    #[test]
    fn palette_keys_switch_brush_and_redraw_the_toolbar() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);

        assert_eq!(app.on_key_press(key(11)).unwrap(), Flow::Continue);
        assert_eq!(app.brush, Brush::Red);
        assert!(canvas.calls().contains(&Call::Outline {
            drawable: 5,
            gc: 2,
            rects: vec![selection_frame(1)]
        }));

        canvas.clear();
        app.on_button_press(press(50, 50)).unwrap();
        app.on_motion_notify(motion(60, 60)).unwrap();
        assert_eq!(canvas.calls(), vec![line(10, (50, 50), (60, 60))]);
    }

    #[test]
    fn strokes_without_a_colour_are_kept_but_not_drawn() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);

        app.on_key_press(key(13)).unwrap();
        canvas.clear();
        app.on_button_press(press(50, 50)).unwrap();
        app.on_motion_notify(motion(60, 60)).unwrap();

        assert!(canvas.calls().is_empty());
        assert_eq!(app.strokes[0].brush, Brush::Blue);
    }

    #[test]
    fn expose_redraws_toolbar_then_strokes() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);
        app.strokes = vec![Stroke {
            brush: Brush::Green,
            from: Point { x: 1, y: 50 },
            to: Point { x: 2, y: 60 },
        }];
        app.on_expose(ExposeEvent::default()).unwrap();

        let calls = canvas.calls();
        assert_eq!(
            calls[0],
            Call::Fill {
                drawable: 5,
                gc: 1,
                rects: vec![Rectangle {
                    x: 0,
                    y: 0,
                    width: 600,
                    height: 40
                }]
            }
        );
        assert_eq!(
            calls[1],
            Call::Text {
                drawable: 5,
                gc: 3,
                x: 10,
                y: 20,
                text: "Simple Paint".to_owned()
            }
        );
        // blue has no gc, so three swatches plus one frame
        let swatches = calls
            .iter()
            .filter(|c| matches!(c, Call::Fill { rects, .. } if rects[0].y == 5))
            .count();
        assert_eq!(swatches, 3);
        assert!(calls.contains(&Call::Outline {
            drawable: 5,
            gc: 2,
            rects: vec![selection_frame(0)]
        }));
        assert_eq!(
            calls[calls.len() - 2],
            Call::Text {
                drawable: 5,
                gc: 3,
                x: 450,
                y: 20,
                text: "1-4: colors, C: clear, ESC: exit".to_owned()
            }
        );
        assert_eq!(calls.last(), Some(&line(11, (1, 50), (2, 60))));
    }

    #[test]
    fn clear_wipes_strokes_and_the_drawing_area() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);
        app.strokes = vec![Stroke {
            brush: Brush::Black,
            from: Point { x: 1, y: 50 },
            to: Point { x: 2, y: 60 },
        }];

        assert_eq!(app.on_key_press(key(54)).unwrap(), Flow::Continue);
        assert!(app.strokes.is_empty());
        assert_eq!(
            canvas.calls()[0],
            Call::Fill {
                drawable: 5,
                gc: 1,
                rects: vec![Rectangle {
                    x: 0,
                    y: 40,
                    width: 600,
                    height: 360
                }]
            }
        );
    }

    #[test]
    fn exit_key_ends_the_loop() {
        let canvas = RecordingCanvas::default();
        let mut app = paint_app(&canvas);

        assert_eq!(app.on_key_press(key(38)).unwrap(), Flow::Continue);
        assert_eq!(app.on_key_press(key(9)).unwrap(), Flow::Exit);
        assert!(canvas.calls().is_empty());
    }

    #[test]
    fn keys_follow_the_keymap() {
        const ONE: RawKeysym = 0x31;
        const TWO: RawKeysym = 0x32;
        const LOWER_C: RawKeysym = 0x63;
        // keycodes 20..=22, one column each
        let map: HashMap<Keysym, KeyCode> = build_sym_code(20, 22, 1, &[ONE, TWO, LOWER_C]);
        let keys = PaintKeys::new(KeyHandler::from_map(map, "Escape"));

        assert_eq!(keys.classify(20), Some(PaintKey::Select(Brush::Black)));
        assert_eq!(keys.classify(21), Some(PaintKey::Select(Brush::Red)));
        assert_eq!(keys.classify(12), Some(PaintKey::Select(Brush::Green)));
        assert_eq!(keys.classify(22), Some(PaintKey::Clear));
        assert_eq!(keys.classify(54), None);
        assert_eq!(keys.classify(9), Some(PaintKey::Exit));
    }

    #[test]
    fn swatches_sit_inside_the_toolbar() {
        for i in 0..Brush::PALETTE.len() {
            let frame = selection_frame(i);
            assert!(frame.y >= 0);
            assert!(frame.y as u16 + frame.height <= TOOLBAR_HEIGHT);
            assert!(frame.x as u16 + frame.width <= HINT_POS.0 as u16);
        }
        assert_eq!(swatch(3).x, 330);
    }
}
