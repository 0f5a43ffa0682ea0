//! Native window implementations.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]` and exported as [`NativeWindowImpl`]:
//!
//! - Linux: [`xlib_window::X11Window`], an Xlib top-level window.
//! - Everything else: [`unsupported::UnsupportedWindow`], which refuses to
//!   open so the binary fails at startup with a clear message.
//!
//! [`mock::ScriptedWindow`] replays scripted events for tests.

use thiserror::Error;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod xlib_window;

#[cfg(not(target_os = "linux"))]
pub mod unsupported;

#[cfg(target_os = "linux")]
pub type NativeWindowImpl = xlib_window::X11Window;

#[cfg(not(target_os = "linux"))]
pub type NativeWindowImpl = unsupported::UnsupportedWindow;

/// Error type for opening a native window.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The window system connection could not be opened.
    #[error("cannot open display (DISPLAY={display})")]
    DisplayUnavailable { display: String },

    /// The window title contains an interior NUL byte.
    #[error("window title contains a NUL byte")]
    InvalidTitle,

    /// The window system refused to create the window.
    #[error("window system failed to create a {width}x{height} window")]
    CreateFailed { width: u32, height: u32 },

    /// No native window implementation exists for this platform.
    #[error("native windows are not supported on this platform")]
    UnsupportedPlatform,
}

/// Opens the platform's native window with the given client size and title.
pub fn open_native_window(
    size: emugl_core::WindowSize,
    title: &str,
) -> Result<NativeWindowImpl, WindowError> {
    NativeWindowImpl::open(size, title)
}
