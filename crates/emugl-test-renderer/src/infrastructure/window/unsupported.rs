//! Fallback for platforms without a native window implementation.

use emugl_core::{WindowHandle, WindowSize};

use super::WindowError;
use crate::application::window_events::{NativeWindow, WindowEvent};

/// A window that can never be opened.
pub struct UnsupportedWindow {
    _private: (),
}

impl UnsupportedWindow {
    /// Always fails with [`WindowError::UnsupportedPlatform`].
    pub fn open(_size: WindowSize, _title: &str) -> Result<Self, WindowError> {
        Err(WindowError::UnsupportedPlatform)
    }
}

impl NativeWindow for UnsupportedWindow {
    fn acquire_native_handle(&self) -> WindowHandle {
        WindowHandle::from_raw(0)
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        Some(WindowEvent::Quit)
    }
}
