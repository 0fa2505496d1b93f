//! Core font loading and `ImageText8`, with an optional client side TrueType line below.
use std::path::Path;

use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{CreateWindowAux, EventMask, ExposeEvent, Gcontext, KeyPressEvent, Window},
};

use crate::{
    config::Config,
    connection::{Canvas, ProbeConnection, Res, Rgb, WindowSpec},
    events::{Flow, ProbeHandler, run_event_loop},
    pixels::BgraImage,
    text::TextHandler,
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 500,
    height: 300,
    border: 2,
};

/// Sample lines and where their baselines start.
pub const LINES: [(i16, i16, &str); 5] = [
    (50, 50, "Hello XCB Fonts!"),
    (50, 80, "Test fonts XCB"),
    (20, 120, "abcdefghijklm"),
    (20, 150, "ABCDEFGHIJKLM"),
    (20, 180, "0123456789"),
];

pub const INFO_POS: (i16, i16) = (20, 220);
/// Top left corner of the rasterized TrueType line.
pub const TTF_POS: (i16, i16) = (20, 240);
pub const TTF_SAMPLE: &str = "Hello TrueType!";

pub struct FontProbe<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub background_gc: Gcontext,
    pub text_gc: Gcontext,
    /// The "Font ID" line.
    pub info: String,
    pub rendered: Option<BgraImage>,
}

impl<K: Canvas> ProbeHandler for FontProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.canvas
            .fill_rectangles(self.window, self.background_gc, &[WINDOW.area()])?;

        for (x, y, line) in LINES {
            self.canvas
                .draw_text(self.window, self.text_gc, x, y, line)?;
        }
        self.canvas
            .draw_text(self.window, self.text_gc, INFO_POS.0, INFO_POS.1, &self.info)?;

        if let Some(image) = &self.rendered {
            self.canvas.put_image(
                self.window,
                self.text_gc,
                TTF_POS.0,
                TTF_POS.1,
                image.width,
                image.height,
                &image.data,
            )?;
        }

        println!("📝 text drawn");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Exit)
    }
}

/// Renders the sample line with the configured TrueType font, if there is one.
fn rasterize_sample(config: &Config) -> Option<BgraImage> {
    let path = config.ttf_path.as_deref()?;
    let handler = TextHandler::new(Path::new(path), config.ttf_size).ok()?;
    let image = handler.rasterize_line(TTF_SAMPLE, Rgb::BLACK.to_rgb8(), Rgb::WHITE.to_rgb8());
    log::debug!("rasterized {}x{} sample", image.width, image.height);
    Some(image)
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new().event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
    )?;

    let font = conn.open_font(&config.text_font)?;
    conn.flush()?;
    println!("✅ font loaded: {}", config.text_font);

    match conn.query_font(font)? {
        Some(info) => {
            println!("📏 ascent {}, descent {}", info.ascent, info.descent);
            println!("📏 min bounds: {}x{}", info.min_width, info.min_height);
            println!("📏 max bounds: {}x{}", info.max_width, info.max_height);
        }
        None => println!("❌ couldn't query font info"),
    }

    let background_gc = conn.create_foreground_gc(window, conn.screen.white_pixel)?;
    let text_gc = conn.create_text_gc(window, font)?;

    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window shown");

    let rendered = rasterize_sample(config);
    if config.ttf_path.is_some() && rendered.is_none() {
        println!("❌ TrueType sample skipped");
    }

    println!("🎯 press any key to exit");
    run_event_loop(
        conn.conn,
        &mut FontProbe {
            canvas: conn,
            window,
            background_gc,
            text_gc,
            info: format!(
                "Font ID: {font}, Screen: {}x{}",
                conn.screen.width_in_pixels, conn.screen.height_in_pixels
            ),
            rendered,
        },
    )?;

    println!("✅ font test finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingCanvas};

    fn probe(
        canvas: &RecordingCanvas,
        rendered: Option<BgraImage>,
    ) -> FontProbe<'_, RecordingCanvas> {
        FontProbe {
            canvas,
            window: 7,
            background_gc: 1,
            text_gc: 2,
            info: "Font ID: 5, Screen: 800x600".to_owned(),
            rendered,
        }
    }

    #[test]
    fn expose_draws_background_then_every_line() {
        let canvas = RecordingCanvas::default();
        probe(&canvas, None)
            .on_expose(ExposeEvent::default())
            .unwrap();

        let calls = canvas.calls();
        assert_eq!(
            calls[0],
            Call::Fill {
                drawable: 7,
                gc: 1,
                rects: vec![WINDOW.area()]
            }
        );

        let texts: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Text { x, y, text, gc, .. } => Some((*x, *y, text.as_str(), *gc)),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 6);
        assert_eq!(texts[0], (50, 50, "Hello XCB Fonts!", 2));
        assert_eq!(texts[4], (20, 180, "0123456789", 2));
        assert_eq!(texts[5], (20, 220, "Font ID: 5, Screen: 800x600", 2));
        assert!(!calls.iter().any(|c| matches!(c, Call::Image { .. })));
    }

    #[test]
    fn uploads_the_rendered_line_last() {
        let canvas = RecordingCanvas::default();
        let image = BgraImage::filled(30, 12, (255, 255, 255));
        probe(&canvas, Some(image))
            .on_expose(ExposeEvent::default())
            .unwrap();

        assert_eq!(
            canvas.calls().last(),
            Some(&Call::Image {
                drawable: 7,
                x: 20,
                y: 240,
                width: 30,
                height: 12,
                len: 30 * 12 * 4
            })
        );
    }

    #[test]
    fn no_ttf_path_means_no_sample() {
        assert!(rasterize_sample(&Config::default()).is_none());
    }
}
