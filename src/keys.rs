//!
//! This module maps keysyms to the keycodes the server reports, so probes can name their exit key
//! instead of hard coding a keycode.
use std::collections::HashMap;

use x11rb::{
    connection::Connection, errors::ReplyOrIdError, protocol::xproto::ConnectionExt as _,
};
use xkeysym::{KeyCode, Keysym, RawKeysym};

use crate::config::Config;

/// The Escape keycode on a standard evdev/xorg layout, used when the keymap has no Escape.
pub const FALLBACK_EXIT_KEYCODE: u8 = 9;

/// Turns a keysym name like `Escape`, `XK_Return` or `q` into a keysym.
#[must_use]
pub fn parse_keysym(name: &str) -> Option<Keysym> {
    let name = name.strip_prefix("XK_").unwrap_or(name);
    match name {
        "Escape" => Some(Keysym::Escape),
        "Return" => Some(Keysym::Return),
        "space" => Some(Keysym::space),
        "Tab" => Some(Keysym::Tab),
        "BackSpace" => Some(Keysym::BackSpace),
        "Left" => Some(Keysym::Left),
        "Right" => Some(Keysym::Right),
        c => {
            let mut chars = c.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some(Keysym::from_char(ch)),
                _ => {
                    log::error!("BAD KEYSYM {c}");
                    None
                }
            }
        }
    }
}

/// A short name for a key, as shown in on-screen hints.
#[must_use]
pub fn key_label(name: &str) -> &str {
    match name.strip_prefix("XK_").unwrap_or(name) {
        "Escape" => "ESC",
        other => other,
    }
}

/// Builds a keysym to keycode map from a `GetKeyboardMapping` reply.
///
/// Only the first column is used. When several keycodes carry the same keysym the lowest wins.
#[must_use]
pub fn build_sym_code(
    min: u8,
    max: u8,
    keysyms_per_keycode: u8,
    keysyms: &[RawKeysym],
) -> HashMap<Keysym, KeyCode> {
    let mut sym_code = HashMap::new();
    (min..=max)
        .filter_map(|x| {
            xkeysym::keysym(
                x.into(),
                0,
                min.into(),
                keysyms_per_keycode,
                keysyms,
            )
            .map(|s| (s, KeyCode::new(x.into())))
        })
        .for_each(|(sym, code)| {
            sym_code.entry(sym).or_insert(code);
        });
    sym_code
}

/// A helper for recognising the exit key.
pub struct KeyHandler {
    /// The keycode that ends the probe.
    pub exit: u8,
    /// A map of keysyms and their respective keycodes.
    sym_code: HashMap<Keysym, KeyCode>,
}

impl KeyHandler {
    /// Creates a new handler from the server's keyboard mapping.
    pub fn new(conn: &impl Connection, config: &Config) -> Result<Self, ReplyOrIdError> {
        let min = conn.setup().min_keycode;
        let max = conn.setup().max_keycode;

        let mapping = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;
        let sym_code = build_sym_code(
            min,
            max,
            mapping.keysyms_per_keycode,
            mapping.keysyms.as_slice(),
        );

        Ok(Self::from_map(sym_code, &config.exit_key))
    }

    /// Resolves the exit key against an existing map.
    #[must_use]
    pub fn from_map(sym_code: HashMap<Keysym, KeyCode>, exit_key: &str) -> Self {
        let exit = parse_keysym(exit_key)
            .and_then(|sym| sym_code.get(&sym))
            .and_then(|code| u8::try_from(code.raw()).ok())
            .unwrap_or_else(|| {
                log::debug!("no keycode for {exit_key}, using {FALLBACK_EXIT_KEYCODE}");
                FALLBACK_EXIT_KEYCODE
            });
        log::debug!("exit key {exit_key} is keycode {exit}");
        Self { exit, sym_code }
    }

    #[must_use]
    pub const fn is_exit(&self, keycode: u8) -> bool {
        keycode == self.exit
    }

    /// The keycode for a keysym, if the keymap has one.
    #[must_use]
    pub fn code_for(&self, sym: Keysym) -> Option<KeyCode> {
        self.sym_code.get(&sym).copied()
    }
}
