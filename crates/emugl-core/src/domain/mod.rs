//! Domain entities for the remote rendering session.
//!
//! This module contains pure session logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! - [`window`] – the opaque [`window::WindowHandle`] of the native surface and
//!   the [`window::WindowSize`] parsed from `ANDROID_WINDOW_SIZE`.
//! - [`target`] – the [`target::RenderTarget`] tuple handed to the render
//!   library when the session starts.
//! - [`pointer`] – the single "button is down" flag that decides which pointer
//!   events reach the emulator.
//!
//! Code in outer layers (application, infrastructure) depends on the domain,
//! but the domain never depends on them.

pub mod pointer;
pub mod target;
pub mod window;
