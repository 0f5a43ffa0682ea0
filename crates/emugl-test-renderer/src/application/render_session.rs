//! RenderSession: lifecycle of the remote render target.
//!
//! Starting a session asks the render library to create a renderer bound to
//! the harness window and to listen for GL command streams on a TCP port.
//! Stopping it tears that renderer down.  The session value is the proof that
//! `start` succeeded: `stop` consumes it, so teardown can only be requested
//! once and only after a successful start.

use emugl_core::RenderTarget;
use thiserror::Error;
use tracing::{error, info};

/// Error type for render backend operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend reported that it could not start a renderer.
    #[error("render library failed to initialize a renderer on port {port}")]
    InitializeFailed { port: u16 },

    /// The target dimensions do not fit the backend's integer types.
    #[error("window size {width}x{height} is out of range for the render library")]
    InvalidDimensions { width: u32, height: u32 },

    /// The backend reported that teardown failed.
    #[error("render library failed to stop the renderer")]
    ShutdownFailed,
}

/// The render library as seen by the session.
///
/// The production implementation calls into the dynamically loaded render
/// library; tests use a recording implementation.
#[cfg_attr(test, mockall::automock)]
pub trait RenderBackend {
    /// Starts a renderer presenting into `target.window()` at `(x, y)` with
    /// the target's size, listening on `target.port()`.
    fn initialize(&self, target: &RenderTarget, x: i32, y: i32) -> Result<(), RenderError>;

    /// Stops the renderer started by `initialize`.
    fn shutdown(&self) -> Result<(), RenderError>;
}

/// A running render target.
///
/// Dropping a session without calling [`RenderSession::stop`] still stops the
/// renderer, so early returns and panics in the caller cannot leak it.
pub struct RenderSession<'b> {
    backend: &'b dyn RenderBackend,
    target: RenderTarget,
    active: bool,
}

impl<'b> RenderSession<'b> {
    /// Starts a renderer for `target`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.  No teardown is attempted on failure
    /// because nothing was acquired.
    pub fn start(backend: &'b dyn RenderBackend, target: RenderTarget) -> Result<Self, RenderError> {
        backend.initialize(&target, 0, 0)?;
        info!(
            "renderer started for window {} ({}x{}) on port {}",
            target.window(),
            target.width(),
            target.height(),
            target.port()
        );
        Ok(Self {
            backend,
            target,
            active: true,
        })
    }

    /// The target this session was started with.
    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Stops the renderer.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.  The session counts as stopped either way.
    pub fn stop(mut self) -> Result<(), RenderError> {
        self.active = false;
        self.backend.shutdown()
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = self.backend.shutdown() {
                error!("renderer teardown on drop failed: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
