//! Linux harness window via the X11 Xlib API.
//!
//! Opens a plain top-level window on the default screen, asks for pointer,
//! key and structure events, and registers `WM_DELETE_WINDOW` so closing the
//! window from the window manager arrives as a client message instead of a
//! killed connection.
//!
//! The window's XID is the native handle handed to the render library.

use std::ffi::{c_char, CString};
use std::ptr;

use emugl_core::{WindowHandle, WindowSize};
use tracing::{debug, info};
use x11::xlib;

use super::WindowError;
use crate::application::window_events::{KeyEvent, Modifiers, NativeWindow, WindowEvent};

const WM_DELETE_WINDOW: &[u8] = b"WM_DELETE_WINDOW\0";

const EVENT_MASK: std::ffi::c_long = xlib::ButtonPressMask
    | xlib::ButtonReleaseMask
    | xlib::PointerMotionMask
    | xlib::KeyPressMask
    | xlib::KeyReleaseMask
    | xlib::StructureNotifyMask;

/// An Xlib top-level window.
pub struct X11Window {
    display: *mut xlib::Display,
    window: xlib::Window,
    wm_delete: xlib::Atom,
    /// Set once the server reported the window gone; its XID is dead then.
    destroyed: bool,
}

impl X11Window {
    /// Opens and maps a `size` window titled `title`.
    ///
    /// # Errors
    ///
    /// [`WindowError::DisplayUnavailable`] when `XOpenDisplay` fails (usually
    /// an unset `DISPLAY`), [`WindowError::InvalidTitle`] for a title with a
    /// NUL byte, [`WindowError::CreateFailed`] when no window was created.
    pub fn open(size: WindowSize, title: &str) -> Result<Self, WindowError> {
        let title = CString::new(title).map_err(|_| WindowError::InvalidTitle)?;

        // SAFETY: a null name selects the DISPLAY environment variable.  The
        // returned pointer is released by XCloseDisplay in Drop.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let display = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(WindowError::DisplayUnavailable { display });
        }

        // SAFETY: `display` is a valid connection for every call below.
        unsafe {
            let screen = xlib::XDefaultScreen(display);
            let root = xlib::XRootWindow(display, screen);
            let black = xlib::XBlackPixel(display, screen);

            let window = xlib::XCreateSimpleWindow(
                display,
                root,
                0,
                0,
                size.width,
                size.height,
                0,
                black,
                black,
            );
            if window == 0 {
                xlib::XCloseDisplay(display);
                return Err(WindowError::CreateFailed {
                    width: size.width,
                    height: size.height,
                });
            }

            xlib::XStoreName(display, window, title.as_ptr());
            xlib::XSelectInput(display, window, EVENT_MASK);

            let mut wm_delete = xlib::XInternAtom(
                display,
                WM_DELETE_WINDOW.as_ptr() as *const c_char,
                xlib::False,
            );
            xlib::XSetWMProtocols(display, window, &mut wm_delete, 1);

            xlib::XMapWindow(display, window);
            xlib::XFlush(display);

            info!("opened X11 window 0x{window:x} ({size})");
            Ok(Self {
                display,
                window,
                wm_delete,
                destroyed: false,
            })
        }
    }
}

/// Translates one Xlib event.  `wm_delete` is the window's
/// `WM_DELETE_WINDOW` atom; client messages carrying any other atom are
/// ignored.
fn translate_event(event: &xlib::XEvent, wm_delete: xlib::Atom) -> Option<WindowEvent> {
    // SAFETY: each union field is read only for the event type that defines
    // it.
    unsafe {
        match event.get_type() {
            xlib::ButtonPress | xlib::ButtonRelease => {
                let button = event.button;
                // 4..=7 are wheel clicks, not touches.
                if (4..=7).contains(&button.button) {
                    return None;
                }
                let (x, y) = (button.x, button.y);
                Some(if event.get_type() == xlib::ButtonPress {
                    WindowEvent::PointerDown { x, y }
                } else {
                    WindowEvent::PointerUp { x, y }
                })
            }
            xlib::MotionNotify => {
                let motion = event.motion;
                Some(WindowEvent::PointerMotion {
                    x: motion.x,
                    y: motion.y,
                })
            }
            xlib::KeyPress | xlib::KeyRelease => {
                let mut key = event.key;
                let sym = xlib::XLookupKeysym(&mut key, 0) as u32;
                let key_event = KeyEvent::with_modifiers(sym, modifiers_from_state(key.state));
                Some(if event.get_type() == xlib::KeyPress {
                    WindowEvent::KeyDown(key_event)
                } else {
                    WindowEvent::KeyUp(key_event)
                })
            }
            xlib::ClientMessage => {
                let message = event.client_message;
                (message.data.get_long(0) as xlib::Atom == wm_delete).then_some(WindowEvent::Quit)
            }
            xlib::DestroyNotify => Some(WindowEvent::Quit),
            other => {
                debug!("ignoring X11 event type {other}");
                None
            }
        }
    }
}

/// Returns `true` if `event` reports that `window` no longer exists.
fn destroys(event: &xlib::XEvent, window: xlib::Window) -> bool {
    // SAFETY: `destroy_window` is only read for DestroyNotify events.
    event.get_type() == xlib::DestroyNotify && unsafe { event.destroy_window.window } == window
}

/// Maps an X11 modifier state mask to [`Modifiers`].
fn modifiers_from_state(state: std::ffi::c_uint) -> Modifiers {
    let mut modifiers = Modifiers::NONE;
    if state & xlib::ShiftMask != 0 {
        modifiers = modifiers | Modifiers::SHIFT;
    }
    if state & xlib::ControlMask != 0 {
        modifiers = modifiers | Modifiers::CTRL;
    }
    if state & xlib::Mod1Mask != 0 {
        modifiers = modifiers | Modifiers::ALT;
    }
    if state & xlib::Mod4Mask != 0 {
        modifiers = modifiers | Modifiers::META;
    }
    modifiers
}

impl NativeWindow for X11Window {
    fn acquire_native_handle(&self) -> WindowHandle {
        WindowHandle::from_raw(u64::from(self.window))
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        // SAFETY: `display` stays valid until Drop; XNextEvent only runs when
        // XPending reported a queued event, so it never blocks.
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);
                if destroys(&event, self.window) {
                    self.destroyed = true;
                }
                if let Some(translated) = translate_event(&event, self.wm_delete) {
                    return Some(translated);
                }
            }
        }
        None
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        // SAFETY: both resources were created in `open` and are released
        // once.  A window the server already destroyed is not destroyed again.
        unsafe {
            if !self.destroyed {
                xlib::XDestroyWindow(self.display, self.window);
            }
            xlib::XCloseDisplay(self.display);
        }
        debug!("closed X11 window");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
