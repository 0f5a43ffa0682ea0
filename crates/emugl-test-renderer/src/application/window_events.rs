//! Window-system events as the session loop sees them.
//!
//! Platform window implementations translate their native events into
//! [`WindowEvent`]s and expose the native surface through
//! [`NativeWindow::acquire_native_handle`].  Nothing in the application layer
//! knows which window system produced an event.

#[cfg(target_os = "macos")]
use emugl_core::keymap::x11_keysym::XK_Q;
use emugl_core::WindowHandle;

/// Keyboard modifier flags held during a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(0x01);
    pub const CTRL: Modifiers = Modifiers(0x02);
    pub const ALT: Modifiers = Modifiers(0x04);
    pub const META: Modifiers = Modifiers(0x08);

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Platform key symbol (X11 KeySym).
    pub sym: u32,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(sym: u32) -> Self {
        Self {
            sym,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(sym: u32, modifiers: Modifiers) -> Self {
        Self { sym, modifiers }
    }
}

/// An event drained from the window system queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    PointerDown { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    PointerMotion { x: i32, y: i32 },
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// The window was closed or the application was asked to quit.
    Quit,
}

/// A native window hosting the render target.
pub trait NativeWindow {
    /// Returns the platform identifier of the window surface.
    fn acquire_native_handle(&self) -> WindowHandle;

    /// Returns the next queued event without blocking, `None` when the queue
    /// is empty.
    fn poll_event(&mut self) -> Option<WindowEvent>;
}

/// Key combination that ends the session without being forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitAccelerator {
    sym: u32,
    modifiers: Modifiers,
}

impl QuitAccelerator {
    pub const fn new(sym: u32, modifiers: Modifiers) -> Self {
        Self { sym, modifiers }
    }

    /// The platform's quit shortcut: Command-Q on macOS.
    #[cfg(target_os = "macos")]
    pub const fn native() -> Option<Self> {
        Some(Self::new(XK_Q, Modifiers::META))
    }

    /// Other platforms have no quit shortcut; Ctrl+Q reaches the guest like
    /// any other key and the window is closed through the window manager.
    #[cfg(not(target_os = "macos"))]
    pub const fn native() -> Option<Self> {
        None
    }

    /// Returns `true` if `event` triggers the accelerator.  Extra modifiers
    /// are tolerated.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.sym == self.sym && event.modifiers.contains(self.modifiers)
    }
}
