//! Key code translation from platform key symbols to emulator key codes.
//!
//! The emulator console injects Linux input-event key codes into the guest.
//! The harness window reports platform key symbols (X11 KeySyms).  A small
//! fixed table maps the keys that matter to an Android device (arrows, enter,
//! menu, back, home); every other symbol is passed through unchanged.

pub mod x11_keysym;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key code in the numbering understood by the emulator console.
///
/// The named constants are the keys the console documents.  The type is an
/// open newtype rather than a closed enum because unmapped platform symbols
/// are forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKeyCode(pub u32);

impl LogicalKeyCode {
    pub const HOME: LogicalKeyCode = LogicalKeyCode(102);
    pub const UP: LogicalKeyCode = LogicalKeyCode(103);
    pub const LEFT: LogicalKeyCode = LogicalKeyCode(105);
    pub const RIGHT: LogicalKeyCode = LogicalKeyCode(106);
    pub const END: LogicalKeyCode = LogicalKeyCode(107);
    pub const DOWN: LogicalKeyCode = LogicalKeyCode(108);
    pub const VOLUME_DOWN: LogicalKeyCode = LogicalKeyCode(114);
    pub const VOLUME_UP: LogicalKeyCode = LogicalKeyCode(115);
    pub const POWER: LogicalKeyCode = LogicalKeyCode(116);
    pub const BACK: LogicalKeyCode = LogicalKeyCode(158);
    pub const ENTER: LogicalKeyCode = LogicalKeyCode(28);
    pub const SOFT1: LogicalKeyCode = LogicalKeyCode(229);
    pub const SEND: LogicalKeyCode = LogicalKeyCode(231);

    /// Returns the raw numeric code.
    pub const fn code(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LogicalKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Translates platform key symbols into [`LogicalKeyCode`]s.
pub struct KeyTranslator;

impl KeyTranslator {
    /// Translates a platform key symbol.
    ///
    /// Linear scan over [`x11_keysym::KEYMAP`]; the first matching entry wins.
    /// Symbols with no entry are returned unchanged as a logical code.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn translate(platform_key: u32) -> LogicalKeyCode {
        Self::translate_with(x11_keysym::KEYMAP, platform_key)
    }

    /// Same as [`KeyTranslator::translate`] against an explicit table.
    pub fn translate_with(table: &[(u32, LogicalKeyCode)], platform_key: u32) -> LogicalKeyCode {
        table
            .iter()
            .find(|(sym, _)| *sym == platform_key)
            .map(|(_, logical)| *logical)
            .unwrap_or(LogicalKeyCode(platform_key))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::x11_keysym::*;
    use super::*;

    #[test]
    fn test_mapped_keys_translate_to_documented_codes() {
        let cases = [
            (XK_LEFT, LogicalKeyCode::LEFT),
            (XK_RIGHT, LogicalKeyCode::RIGHT),
            (XK_DOWN, LogicalKeyCode::DOWN),
            (XK_UP, LogicalKeyCode::UP),
            (XK_RETURN, LogicalKeyCode::ENTER),
            (XK_F1, LogicalKeyCode::SOFT1),
            (XK_ESCAPE, LogicalKeyCode::BACK),
            (XK_HOME, LogicalKeyCode::HOME),
        ];

        for (sym, expected) in cases {
            assert_eq!(KeyTranslator::translate(sym), expected, "keysym 0x{sym:04X}");
        }
    }

    #[test]
    fn test_unmapped_keys_pass_through_unchanged() {
        // Arrange – letters, digits, F2 and an arbitrary large value
        let unmapped = [0x0061u32, 0x0071, 0x0031, 0xFFBF, 0, u32::MAX];

        for sym in unmapped {
            // Act / Assert
            assert_eq!(KeyTranslator::translate(sym), LogicalKeyCode(sym));
        }
    }

    #[test]
    fn test_first_match_wins() {
        // Arrange – a table with a duplicated symbol
        let table = [
            (1u32, LogicalKeyCode::BACK),
            (1u32, LogicalKeyCode::HOME),
        ];

        // Act
        let logical = KeyTranslator::translate_with(&table, 1);

        // Assert
        assert_eq!(logical, LogicalKeyCode::BACK);
    }

    #[test]
    fn test_empty_table_is_identity() {
        assert_eq!(KeyTranslator::translate_with(&[], XK_LEFT), LogicalKeyCode(XK_LEFT));
    }

    #[test]
    fn test_logical_key_code_displays_as_plain_number() {
        assert_eq!(LogicalKeyCode::BACK.to_string(), "158");
        assert_eq!(LogicalKeyCode::ENTER.code(), 28);
    }
}
