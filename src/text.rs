//!
//! This module provides a font helper that rasterizes text client side, for comparing against the
//! server's core fonts.
use std::{fs, path::Path};

use fontdue::{Font, FontSettings};

use crate::pixels::{BgraImage, blend};

/// A helper for drawing with a TrueType font.
pub struct TextHandler {
    /// The loaded font.
    font: Font,
    /// The pixel size to render at.
    size: f32,
}

impl TextHandler {
    /// Loads a font from a file.
    ///
    /// May return an error if the file is missing or the font is damaged.
    pub fn new(path: &Path, size: f32) -> Result<Self, Box<dyn std::error::Error>> {
        log::debug!("loading font from {}", path.display());
        let file = match fs::read(path) {
            Ok(f) => f,
            Err(e) => {
                log::error!("couldnt open file! {e}");
                return Err(Box::new(e));
            }
        };

        let font = match Font::from_bytes(file, FontSettings::default()) {
            Ok(f) => f,
            Err(e) => {
                log::error!("couldn't make font! {e}");
                return Err(e.into());
            }
        };

        Ok(Self { font, size })
    }

    /// The distance from the top of a line to its baseline, in whole pixels.
    fn ascent(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map_or(self.size, |m| m.ascent)
            .ceil() as i32
    }

    fn line_height(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map_or(self.size, |m| m.ascent - m.descent)
            .ceil() as i32
    }

    /// Renders a single line of text into a BGRA buffer, foreground over background.
    #[must_use]
    pub fn rasterize_line(&self, text: &str, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> BgraImage {
        let glyphs: Vec<_> = text
            .chars()
            .map(|c| self.font.rasterize(c, self.size))
            .collect();

        let width = glyphs
            .iter()
            .map(|(m, _)| m.advance_width.round() as i32)
            .sum::<i32>()
            .clamp(1, i32::from(u16::MAX));
        let height = self.line_height().clamp(1, i32::from(u16::MAX));
        let ascent = self.ascent();

        let mut image = BgraImage::filled(width as u16, height as u16, bg);
        let mut pen_x = 0;
        for (metrics, coverage) in &glyphs {
            let top = ascent - (metrics.height as i32 + metrics.ymin);
            coverage.iter().enumerate().for_each(|(i, &alpha)| {
                let x = pen_x + metrics.xmin + (i % metrics.width.max(1)) as i32;
                let y = top + (i / metrics.width.max(1)) as i32;
                image.set(x, y, blend(fg, bg, alpha));
            });
            pen_x += metrics.advance_width.round() as i32;
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_an_error() {
        assert!(TextHandler::new(Path::new("/nonexistent/font.ttf"), 16.0).is_err());
    }

    #[test]
    fn garbage_font_file_is_an_error() {
        let path = std::env::temp_dir().join("xprobe-not-a-font.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        let result = TextHandler::new(&path, 16.0);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }
}
