//!
//! This module uses the `serde` crate to read an optional config file.
//!
//! The config only tunes what the probes draw with (fonts, colours, cursor glyph, exit key and a
//! couple of optional client side extras). Without a file every probe behaves exactly like its
//! defaults below.
use std::path::Path;

use serde::Deserialize;

use crate::connection::Rgb;

/// The server font used for probe text.
pub const TEXT_FONT: &str = "6x13";
/// The server font the comprehensive probe queries.
pub const INFO_FONT: &str = "fixed";
/// The crosshair glyph of the `cursor` font.
pub const CURSOR_GLYPH: u16 = 34;
/// The keysym that ends final_test and simple_paint.
pub const EXIT_KEY: &str = "Escape";
/// The pixel size of client side rendered text.
pub const TTF_SIZE: f32 = 16.0;
/// Full intensity red.
pub const RED: Rgb = Rgb::new(65535, 0, 0);
/// Full intensity green.
pub const GREEN: Rgb = Rgb::new(0, 65535, 0);
/// Full intensity blue.
pub const BLUE: Rgb = Rgb::new(0, 0, 65535);

/// Converts a `#rrggbb` string into X11's 16 bit colour channels.
///
/// The `#` is optional; anything but exactly six hex digits after it is rejected.
#[must_use]
pub fn hex_color_to_rgb(hex: &str) -> Option<Rgb> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u16::from_str_radix(&hex[i..i + 2], 16).ok().map(|c| c * 257);
    Some(Rgb {
        red: channel(0)?,
        green: channel(2)?,
        blue: channel(4)?,
    })
}

#[derive(Clone, Debug, PartialEq)]
/// Everything a user might want to change about the probes.
pub struct Config {
    /// The font probe text is drawn with.
    pub text_font: String,
    /// The font the comprehensive probe queries.
    pub info_font: String,
    /// An optional TrueType file for client side rendered text.
    pub ttf_path: Option<String>,
    /// The size to render client side text at.
    pub ttf_size: f32,
    pub red: Rgb,
    pub green: Rgb,
    pub blue: Rgb,
    /// The glyph of the `cursor` font used for glyph cursors.
    pub cursor_glyph: u16,
    /// Whether the simple cursor probe also tries the cursor theme.
    pub try_theme_cursor: bool,
    /// The keysym name of the key that exits final_test and simple_paint.
    pub exit_key: String,
    /// An optional image drawn into the simple pixmap probe's pixmap.
    pub pixmap_image: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(ConfigDeserialized::default())
    }
}

/// Empty strings mean "not set".
fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn color_or(hex: &str, fallback: Rgb) -> Rgb {
    hex_color_to_rgb(hex).unwrap_or_else(|| {
        log::debug!("BAD COLOR VALUE {hex}");
        fallback
    })
}

impl From<ConfigDeserialized> for Config {
    fn from(config: ConfigDeserialized) -> Self {
        let ttf_size = if config.fonts.ttf_size.is_finite() && config.fonts.ttf_size > 0.0 {
            config.fonts.ttf_size.clamp(4.0, 200.0)
        } else {
            log::debug!("BAD FONT SIZE {}", config.fonts.ttf_size);
            TTF_SIZE
        };

        // the mask is the glyph after the source, so the source can't be the last one
        let cursor_glyph = if config.cursor.glyph % 2 == 0 && config.cursor.glyph < 154 {
            config.cursor.glyph
        } else {
            log::debug!("BAD CURSOR GLYPH {}", config.cursor.glyph);
            CURSOR_GLYPH
        };

        Self {
            text_font: non_empty(config.fonts.text).unwrap_or_else(|| TEXT_FONT.to_owned()),
            info_font: non_empty(config.fonts.info).unwrap_or_else(|| INFO_FONT.to_owned()),
            ttf_path: non_empty(config.fonts.ttf_path),
            ttf_size,
            red: color_or(&config.colors.red, RED),
            green: color_or(&config.colors.green, GREEN),
            blue: color_or(&config.colors.blue, BLUE),
            cursor_glyph,
            try_theme_cursor: config.cursor.try_theme,
            exit_key: non_empty(config.keys.exit).unwrap_or_else(|| EXIT_KEY.to_owned()),
            pixmap_image: non_empty(config.pixmap.image),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// The config as written in the file.
///
/// This struct is then parsed into the `Config` struct.
pub struct ConfigDeserialized {
    fonts: Fonts,
    colors: Colors,
    cursor: CursorSection,
    keys: Keys,
    pixmap: PixmapSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Fonts {
    /// Server font for probe text.
    text: String,
    /// Server font for the font query test.
    info: String,
    /// TrueType file, empty for none.
    ttf_path: String,
    ttf_size: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Colors {
    /// Colours in `#rrggbb` format.
    red: String,
    green: String,
    blue: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CursorSection {
    glyph: u16,
    try_theme: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Keys {
    /// Keysym name, e.g. `Escape` or `q`.
    exit: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PixmapSection {
    /// Image file, empty for none.
    image: String,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            text: TEXT_FONT.to_owned(),
            info: INFO_FONT.to_owned(),
            ttf_path: String::new(),
            ttf_size: TTF_SIZE,
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            red: String::from("#ff0000"),
            green: String::from("#00ff00"),
            blue: String::from("#0000ff"),
        }
    }
}

impl Default for CursorSection {
    fn default() -> Self {
        Self {
            glyph: CURSOR_GLYPH,
            try_theme: false,
        }
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            exit: EXIT_KEY.to_owned(),
        }
    }
}

impl ConfigDeserialized {
    /// Reads the config from `$XDG_CONFIG_HOME/xprobe/config.toml`.
    ///
    /// A missing or broken file means defaults. The file is never written.
    #[must_use]
    pub fn new() -> Self {
        match xdg::BaseDirectories::with_prefix("xprobe").find_config_file("config.toml") {
            Some(path) => Self::from_path(&path),
            None => {
                log::debug!("no config file, using defaults");
                Self::default()
            }
        }
    }

    /// Reads the config from a specific file.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        log::info!("loading config from {}", path.display());

        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml(&s),
            Err(e) => {
                log::error!("couldn't read config {e:?}, using default");
                Self::default()
            }
        }
    }

    /// Parses config text, falling back to defaults on errors.
    #[must_use]
    pub fn from_toml(text: &str) -> Self {
        match toml::from_str(text) {
            Ok(d) => d,
            Err(e) => {
                log::error!("error parsing config {e:?}, using default");
                Self::default()
            }
        }
    }
}
