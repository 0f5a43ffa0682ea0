//! EventForwarder: delivers translated window input to the emulator's input sink.
//!
//! This use case sits at the application layer and delegates to an
//! [`InputSink`] implementation for the actual transport.  The production sink
//! is the emulator console client in the infrastructure layer; tests inject a
//! recording sink.
//!
//! # Failure policy
//!
//! Transport failures never stop the session.  Every sink error is absorbed
//! here: the event is counted as dropped and logged.  The first failure after
//! a success is logged at `warn`, the rest of the streak at `debug`, so a
//! console that is down does not flood the log at the loop rate.  Recovery is
//! left to the sink's own reconnect logic, which runs inside [`InputSink::wait`].

use std::time::Duration;

use async_trait::async_trait;
use emugl_core::{LogicalKeyCode, ProtocolError};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for input sink operations.
#[derive(Debug, Error)]
pub enum SinkError {
    /// No connection to the input sink is currently established.
    #[error("input sink is not connected")]
    NotConnected,

    /// Connecting to the input sink failed.
    #[error("failed to connect to input sink at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection attempt did not finish within the wait budget.
    #[error("connection attempt to {addr} timed out")]
    ConnectTimeout { addr: String },

    /// An I/O error occurred on the established connection.
    #[error("input sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote side closed the connection.
    #[error("input sink closed the connection")]
    Closed,

    /// The remote side sent something that could not be decoded.
    #[error("input sink protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// `wait` did not return within its budget and was cancelled.
    #[error("input sink overran its {budget:?} wait budget")]
    WaitOverrun { budget: Duration },
}

/// Slack granted to [`InputSink::wait`] past its own budget before
/// [`EventForwarder::tick`] cancels it.
pub const WAIT_GRACE: Duration = Duration::from_millis(10);

/// Remote consumer of pointer and key events.
///
/// `wait` is the only method allowed to suspend; everything else must return
/// without blocking.  `wait` may be cancelled at any await point when it
/// overruns its budget, so it must leave the sink consistent there.
#[async_trait]
pub trait InputSink: Send {
    /// Suspends for at most `max_wait`, letting the connection do its
    /// housekeeping (connect, reconnect, read replies).  May return early.
    async fn wait(&mut self, max_wait: Duration) -> Result<(), SinkError>;

    /// Processes work buffered by the connection.  Non-blocking.
    fn poll(&mut self) -> Result<(), SinkError>;

    fn send_mouse_down(&mut self, x: i32, y: i32) -> Result<(), SinkError>;
    fn send_mouse_up(&mut self, x: i32, y: i32) -> Result<(), SinkError>;
    fn send_mouse_motion(&mut self, x: i32, y: i32) -> Result<(), SinkError>;
    fn send_key_down(&mut self, code: LogicalKeyCode) -> Result<(), SinkError>;
    fn send_key_up(&mut self, code: LogicalKeyCode) -> Result<(), SinkError>;
}

/// Counters describing what happened to forwarded input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    /// Events the sink accepted for delivery.
    pub forwarded: u64,
    /// Events the sink rejected.
    pub dropped: u64,
    /// Failed `wait` / `poll` calls.
    pub transport_errors: u64,
}

/// Forwards pointer and key events to an [`InputSink`].
///
/// Pointer gating (duplicate presses, motion while up) is the caller's job;
/// this type forwards whatever it is given.
pub struct EventForwarder<S: InputSink> {
    sink: S,
    stats: ForwarderStats,
    failing: bool,
}

impl<S: InputSink> EventForwarder<S> {
    /// Creates a forwarder owning `sink` for the rest of the session.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: ForwarderStats::default(),
            failing: false,
        }
    }

    /// Scheduling point of the session loop.
    ///
    /// Returns after at most `max_wait` plus [`WAIT_GRACE`].  A sink that is
    /// still busy at that point is cut off and the overrun counts as a
    /// transport error.
    pub async fn tick(&mut self, max_wait: Duration) {
        let budget = max_wait + WAIT_GRACE;
        let result = match tokio::time::timeout(budget, self.sink.wait(max_wait)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::WaitOverrun { budget: max_wait }),
        };
        self.absorb_transport("wait", result);
    }

    /// Lets the sink process buffered inbound and outbound work.
    pub fn drain_pending(&mut self) {
        let result = self.sink.poll();
        self.absorb_transport("poll", result);
    }

    pub fn pointer_down(&mut self, x: i32, y: i32) {
        let result = self.sink.send_mouse_down(x, y);
        self.absorb_event("pointer down", result);
    }

    pub fn pointer_up(&mut self, x: i32, y: i32) {
        let result = self.sink.send_mouse_up(x, y);
        self.absorb_event("pointer up", result);
    }

    pub fn pointer_motion(&mut self, x: i32, y: i32) {
        let result = self.sink.send_mouse_motion(x, y);
        self.absorb_event("pointer motion", result);
    }

    pub fn key_down(&mut self, code: LogicalKeyCode) {
        let result = self.sink.send_key_down(code);
        self.absorb_event("key down", result);
    }

    pub fn key_up(&mut self, code: LogicalKeyCode) {
        let result = self.sink.send_key_up(code);
        self.absorb_event("key up", result);
    }

    /// Returns the counters accumulated so far.
    pub fn stats(&self) -> ForwarderStats {
        self.stats
    }

    /// Borrows the underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn absorb_event(&mut self, what: &str, result: Result<(), SinkError>) {
        match result {
            Ok(()) => {
                self.stats.forwarded += 1;
                self.failing = false;
            }
            Err(e) => {
                self.stats.dropped += 1;
                self.report(what, &e);
            }
        }
    }

    fn absorb_transport(&mut self, what: &str, result: Result<(), SinkError>) {
        if let Err(e) = result {
            self.stats.transport_errors += 1;
            self.report(what, &e);
        }
    }

    fn report(&mut self, what: &str, error: &SinkError) {
        if self.failing {
            debug!("input sink {what} failed: {error}");
        } else {
            warn!("input sink {what} failed: {error}");
            self.failing = true;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
