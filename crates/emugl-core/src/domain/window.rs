//! Native window identity and window dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the environment variable that overrides the window size.
pub const WINDOW_SIZE_ENV: &str = "ANDROID_WINDOW_SIZE";

/// Opaque identifier of the native window surface the render target draws into.
///
/// On X11 this is the `Window` XID; on Windows an `HWND`; on macOS an
/// `NSWindow*`.  The value is resolved once at startup and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Wraps a raw platform window identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw platform window identifier.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Error returned when a `<width>x<height>` string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowSizeError {
    /// The string has no `x` separator.
    #[error("expected <width>x<height>, got {0:?}")]
    MissingSeparator(String),

    /// One of the two dimensions is not a decimal integer.
    #[error("invalid dimension {0:?}")]
    InvalidDimension(String),

    /// One of the two dimensions is zero.
    #[error("window dimensions must be non-zero")]
    ZeroDimension,
}

/// Width and height of the harness window in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    /// The default window size used when no override is present.
    pub const DEFAULT: WindowSize = WindowSize {
        width: 320,
        height: 480,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Applies the value of `ANDROID_WINDOW_SIZE` on top of `fallback`.
    ///
    /// An absent or malformed value is not an error: `fallback` is returned
    /// unchanged.
    pub fn from_env_value(value: Option<&str>, fallback: WindowSize) -> WindowSize {
        match value.map(str::parse::<WindowSize>) {
            Some(Ok(size)) => size,
            Some(Err(e)) => {
                tracing::debug!("ignoring {WINDOW_SIZE_ENV}: {e}");
                fallback
            }
            None => fallback,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for WindowSize {
    type Err = WindowSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (w, h) = trimmed
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(|| WindowSizeError::MissingSeparator(trimmed.to_string()))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| WindowSizeError::InvalidDimension(part.to_string()))
        };
        let (width, height) = (parse(w)?, parse(h)?);

        if width == 0 || height == 0 {
            return Err(WindowSizeError::ZeroDimension);
        }
        Ok(Self { width, height })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
