//! Infrastructure layer for the test renderer.
//!
//! Contains OS-facing adapters: the emulator console client, the dynamically
//! loaded render library, the native window, and config file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `emugl_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`input_sink`** – `InputSink` over the emulator console TCP port, plus a
//!   recording `MockInputSink`.
//!
//! - **`render_backend`** – `RenderBackend` calling `initOpenGLRenderer` and
//!   `stopOpenGLRenderer` through `libloading`, plus a recording backend.
//!
//! - **`window`** – `NativeWindow` implementations selected with
//!   `#[cfg(target_os)]` (Xlib on Linux), plus a scripted window for tests.
//!
//! - **`storage`** – TOML configuration loading.

pub mod input_sink;
pub mod render_backend;
pub mod storage;
pub mod window;
