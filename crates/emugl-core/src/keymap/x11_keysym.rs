//! X11 KeySym values and the harness key table.
//!
//! KeySym values are defined in X11/keysymdef.h.
//! Reference: https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h

use super::LogicalKeyCode;

pub const XK_RETURN: u32 = 0xFF0D;
pub const XK_ESCAPE: u32 = 0xFF1B;
pub const XK_HOME: u32 = 0xFF50;
pub const XK_LEFT: u32 = 0xFF51;
pub const XK_UP: u32 = 0xFF52;
pub const XK_RIGHT: u32 = 0xFF53;
pub const XK_DOWN: u32 = 0xFF54;
pub const XK_F1: u32 = 0xFFBE;

/// Lowercase `q`, used by the quit accelerator.
pub const XK_Q: u32 = 0x0071;

/// Ordered `(keysym, logical)` table consulted by [`super::KeyTranslator`].
pub const KEYMAP: &[(u32, LogicalKeyCode)] = &[
    (XK_LEFT, LogicalKeyCode::LEFT),
    (XK_RIGHT, LogicalKeyCode::RIGHT),
    (XK_DOWN, LogicalKeyCode::DOWN),
    (XK_UP, LogicalKeyCode::UP),
    (XK_RETURN, LogicalKeyCode::ENTER),
    (XK_F1, LogicalKeyCode::SOFT1),
    (XK_ESCAPE, LogicalKeyCode::BACK),
    (XK_HOME, LogicalKeyCode::HOME),
];
