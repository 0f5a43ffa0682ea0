//! Recording render backend for tests.
//!
//! Stands in for the render library so the session lifecycle can be checked
//! without a GPU: every call is pushed into a `Mutex<Vec<...>>` field.

use std::sync::Mutex;

use emugl_core::RenderTarget;

use crate::application::render_session::{RenderBackend, RenderError};

/// A backend that records calls instead of starting a renderer.
#[derive(Debug, Default)]
pub struct RecordingRenderBackend {
    /// Each `(target, x, y)` passed to `initialize`.
    pub initializations: Mutex<Vec<(RenderTarget, i32, i32)>>,
    /// One entry per `shutdown` call.
    pub shutdowns: Mutex<Vec<()>>,
    /// When `true`, `initialize` records the call and then fails.
    pub fail_initialize: bool,
    /// When `true`, `shutdown` records the call and then fails.
    pub fail_shutdown: bool,
}

impl RecordingRenderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize_count(&self) -> usize {
        self.initializations.lock().unwrap().len()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.lock().unwrap().len()
    }
}

impl RenderBackend for RecordingRenderBackend {
    fn initialize(&self, target: &RenderTarget, x: i32, y: i32) -> Result<(), RenderError> {
        self.initializations.lock().unwrap().push((*target, x, y));
        if self.fail_initialize {
            return Err(RenderError::InitializeFailed { port: target.port() });
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<(), RenderError> {
        self.shutdowns.lock().unwrap().push(());
        if self.fail_shutdown {
            return Err(RenderError::ShutdownFailed);
        }
        Ok(())
    }
}
