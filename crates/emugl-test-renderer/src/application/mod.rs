//! Application layer use cases for the test renderer.
//!
//! # What use cases does the test renderer have?
//!
//! - **`render_session`** – Starts and stops the remote render target through
//!   a `RenderBackend` implementation injected at construction time.
//!
//! - **`forward_events`** – Delivers pointer and key events to the emulator's
//!   input sink and absorbs transport failures so the session keeps running.
//!
//! - **`window_events`** – The window-system events the loop consumes and the
//!   `NativeWindow` seam that produces them.
//!
//! - **`session_loop`** – The control loop tying the three together: start the
//!   renderer, pump events at a bounded rate until quit, stop the renderer.

pub mod forward_events;
pub mod render_session;
pub mod session_loop;
pub mod window_events;
