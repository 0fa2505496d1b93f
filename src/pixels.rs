//!
//! Client side pixel buffers in the BGRA layout `PutImage` expects for 24/32 bit visuals.
use std::path::Path;

use image::{RgbaImage, imageops};

/// A BGRA buffer ready to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BgraImage {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl BgraImage {
    /// A buffer filled with one colour.
    #[must_use]
    pub fn filled(width: u16, height: u16, color: (u8, u8, u8)) -> Self {
        let pixel = [color.2, color.1, color.0, 0xFF];
        Self {
            width,
            height,
            data: pixel.repeat(usize::from(width) * usize::from(height)),
        }
    }

    /// Overwrites one pixel, ignoring coordinates outside the buffer.
    pub fn set(&mut self, x: i32, y: i32, color: (u8, u8, u8)) {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return;
        }
        let j = (y as usize * usize::from(self.width) + x as usize) * 4;
        self.data[j] = color.2;
        self.data[j + 1] = color.1;
        self.data[j + 2] = color.0;
        self.data[j + 3] = 0xFF;
    }
}

/// Determines the blended combination of both colors with the specified alpha mask.
#[must_use]
pub fn alpha_interpolate(color1: u8, color2: u8, alpha: u8) -> u8 {
    ((u32::from(color1) * u32::from(alpha) + (255 - u32::from(alpha)) * u32::from(color2)) / 255)
        as u8
}

/// Blends a foreground over a background colour.
#[must_use]
pub fn blend(fg: (u8, u8, u8), bg: (u8, u8, u8), alpha: u8) -> (u8, u8, u8) {
    (
        alpha_interpolate(fg.0, bg.0, alpha),
        alpha_interpolate(fg.1, bg.1, alpha),
        alpha_interpolate(fg.2, bg.2, alpha),
    )
}

/// Converts an RGBA image, cropped to at most `max_width` x `max_height`.
///
/// Image alpha is dropped; the server has no use for it on a plain visual.
#[must_use]
pub fn image_to_bgra(image: &RgbaImage, max_width: u16, max_height: u16) -> BgraImage {
    let width = image.width().min(u32::from(max_width));
    let height = image.height().min(u32::from(max_height));
    let cropped = imageops::crop_imm(image, 0, 0, width, height).to_image();

    let data = cropped
        .pixels()
        .flat_map(|p| [p[2], p[1], p[0], 0xFF])
        .collect();

    BgraImage {
        width: width as u16,
        height: height as u16,
        data,
    }
}

/// Loads an image file for upload.
///
/// May return an error if the file is missing or can't be decoded.
pub fn load_image(
    path: &Path,
    max_width: u16,
    max_height: u16,
) -> Result<BgraImage, image::ImageError> {
    log::debug!("loading image from {}", path.display());
    let image = image::open(path)?.to_rgba8();
    Ok(image_to_bgra(&image, max_width, max_height))
}
