//! # emugl-core
//!
//! Shared library for the emugl test renderer containing the domain types of
//! a remote rendering session, the key translation table, the emulator console
//! wire protocol, and the GLES client context used by the guest-side shim.
//!
//! This crate has zero dependencies on OS APIs, windowing toolkits, or network
//! sockets.
//!
//! # Architecture overview (for beginners)
//!
//! The emulator renders guest OpenGL ES calls on the host.  A *render target*
//! listens on a TCP port for encoded GL commands and presents the result into
//! a native window.  The test renderer harness owns that window, starts the
//! render target inside it, and forwards the mouse and keyboard input it
//! receives to the emulator console so the guest reacts to it.
//!
//! This crate (`emugl-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Window handles, window sizes, the immutable
//!   [`RenderTarget`] description, and the [`PointerState`] gate used when
//!   forwarding pointer events.
//!
//! - **`keymap`** – The table that converts platform key symbols into the
//!   [`LogicalKeyCode`] numbering understood by the emulator console.
//!
//! - **`protocol`** – How input events travel to the emulator console: one
//!   text command per line, plus classification of the console's replies.
//!
//! - **`gles`** – The explicitly owned context object behind the GLESv1
//!   client shim (string queries, EGL image binding, entry point lookup).

pub mod domain;
pub mod gles;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `emugl_core::RenderTarget` instead of `emugl_core::domain::target::RenderTarget`.
pub use domain::pointer::{PointerState, PointerTransition};
pub use domain::target::RenderTarget;
pub use domain::window::{WindowHandle, WindowSize, WindowSizeError};
pub use keymap::{KeyTranslator, LogicalKeyCode};
pub use protocol::console::{ConsoleCommand, ConsoleReply, ProtocolError};
