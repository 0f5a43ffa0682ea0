//! The remote rendering endpoint description.

use super::window::{WindowHandle, WindowSize};

/// Default TCP port the render target listens on for encoded GL commands.
pub const DEFAULT_RENDER_PORT: u16 = 22468;

/// Everything the render library needs to start presenting into a window.
///
/// Created once at startup after the window handle has been resolved.  The
/// fields are private so a target cannot be modified after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    window: WindowHandle,
    size: WindowSize,
    port: u16,
}

impl RenderTarget {
    pub fn new(window: WindowHandle, size: WindowSize, port: u16) -> Self {
        Self { window, size, port }
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> WindowSize {
        self.size
    }

    /// TCP port the render target listens on.
    pub fn port(&self) -> u16 {
        self.port
    }
}
