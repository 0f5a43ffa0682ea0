//! Render backend implementations.
//!
//! - **`dylib`** – calls `initOpenGLRenderer` / `stopOpenGLRenderer` in the
//!   dynamically loaded render library.
//! - **`mock`** – records calls for tests.

pub mod dylib;
pub mod mock;

pub use dylib::{DylibError, DylibRenderBackend};
