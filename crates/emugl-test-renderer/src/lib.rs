//! emugl-test-renderer library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the test renderer do? (for beginners)
//!
//! The emulator's guest GL calls are encoded and streamed to a *render
//! library* on the host, which replays them with the host's OpenGL.  This
//! harness lets that path be exercised without a full emulator UI:
//!
//! 1. Opens a native window of the configured size (`ANDROID_WINDOW_SIZE`).
//! 2. Asks the render library to start a renderer presenting into that window
//!    and listening for GL command streams on a TCP port.
//! 3. Pumps the window's pointer and key events, translates keys to Android
//!    key codes, and forwards everything to the emulator console.
//! 4. Stops the renderer when the window is closed or the quit accelerator
//!    is pressed.

/// Application layer: use cases and the session loop.
pub mod application;

/// Infrastructure layer: console client, render library, window, config.
pub mod infrastructure;
