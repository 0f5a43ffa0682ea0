//! Recording input sink for tests.
//!
//! The session loop takes ownership of its sink, so `MockInputSink` keeps its
//! record behind an `Arc`: clone it before handing it over and inspect the
//! clone afterwards.
//!
//! ```ignore
//! let sink = MockInputSink::new();
//! let mut session = SessionLoop::new(window, sink.clone(), settings);
//! session.run(&backend).await?;
//! assert_eq!(sink.calls()[2], SinkCall::MouseDown(10, 20));
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use emugl_core::LogicalKeyCode;

use crate::application::forward_events::{InputSink, SinkError};

/// One recorded sink call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Wait(Duration),
    Poll,
    MouseDown(i32, i32),
    MouseUp(i32, i32),
    MouseMotion(i32, i32),
    KeyDown(LogicalKeyCode),
    KeyUp(LogicalKeyCode),
}

/// A sink that records every call and never touches the network.
#[derive(Debug, Clone, Default)]
pub struct MockInputSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    /// When `true`, every `send_*` call is recorded and then rejected with
    /// [`SinkError::NotConnected`].
    pub should_fail: bool,
}

impl MockInputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose sends always fail.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the calls recorded so far, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn record_send(&self, call: SinkCall) -> Result<(), SinkError> {
        self.record(call);
        if self.should_fail {
            Err(SinkError::NotConnected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl InputSink for MockInputSink {
    async fn wait(&mut self, max_wait: Duration) -> Result<(), SinkError> {
        self.record(SinkCall::Wait(max_wait));
        Ok(())
    }

    fn poll(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Poll);
        Ok(())
    }

    fn send_mouse_down(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.record_send(SinkCall::MouseDown(x, y))
    }

    fn send_mouse_up(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.record_send(SinkCall::MouseUp(x, y))
    }

    fn send_mouse_motion(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.record_send(SinkCall::MouseMotion(x, y))
    }

    fn send_key_down(&mut self, code: LogicalKeyCode) -> Result<(), SinkError> {
        self.record_send(SinkCall::KeyDown(code))
    }

    fn send_key_up(&mut self, code: LogicalKeyCode) -> Result<(), SinkError> {
        self.record_send(SinkCall::KeyUp(code))
    }
}
