//! SessionLoop: the control loop of the test renderer.
//!
//! This use case is the heart of the harness.  It starts the render target
//! inside the native window, then repeatedly lets the input sink do its timed
//! work, drains the window-system queue, and forwards pointer and key events
//! until a quit signal arrives.  Finally it stops the render target.
//!
//! # State machine
//!
//! ```text
//!            start ok                quit / accelerator          stop done
//! Starting ──────────▶ Running ───────────────────────▶ Stopping ─────────▶ Stopped
//!     │                  ▲  │
//!     │ start failed     └──┘ any other iteration
//!     └──────────────────────────────────────────────────────────────────▶ Stopped
//! ```
//!
//! # One iteration
//!
//! 1. `EventForwarder::tick(tick_interval)` – the only suspension point; it
//!    caps the loop at roughly `iterations_per_second`.
//! 2. `EventForwarder::drain_pending()`.
//! 3. Drain every queued window event:
//!    - pointer down / up go through [`PointerState`] so duplicates are dropped;
//!    - pointer motion is forwarded only while the pointer is down;
//!    - key down / up are translated by [`KeyTranslator`]; the quit
//!      accelerator (Command-Q on macOS, none elsewhere) is never forwarded
//!      and ends the session;
//!    - quit ends the session and leaves the rest of the queue untouched.
//!
//! After the last iteration the sink gets one more `drain_pending()` so input
//! dispatched right before the quit is written before the renderer stops.

use std::ops::ControlFlow;
use std::time::Duration;

use emugl_core::{KeyTranslator, PointerState, PointerTransition, RenderTarget, WindowSize};
use thiserror::Error;
use tracing::{debug, info};

use super::forward_events::{EventForwarder, ForwarderStats, InputSink};
use super::render_session::{RenderBackend, RenderError, RenderSession};
use super::window_events::{NativeWindow, QuitAccelerator, WindowEvent};

/// Default loop rate.
pub const DEFAULT_ITERATIONS_PER_SECOND: u32 = 15;

/// Error type for the session loop.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The render target could not be started; nothing needs tearing down.
    #[error("failed to start the renderer: {0}")]
    RenderStart(#[source] RenderError),

    /// The render target reported a failure while stopping.
    #[error("failed to stop the renderer: {0}")]
    RenderStop(#[source] RenderError),
}

/// Lifecycle state of a [`SessionLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Fixed parameters of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub window_size: WindowSize,
    /// Port the render target listens on.
    pub render_port: u16,
    /// Upper bound of each `tick`.
    pub tick_interval: Duration,
}

impl SessionSettings {
    pub fn new(window_size: WindowSize, render_port: u16, iterations_per_second: u32) -> Self {
        Self {
            window_size,
            render_port,
            tick_interval: tick_interval_for(iterations_per_second),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(
            WindowSize::DEFAULT,
            emugl_core::domain::target::DEFAULT_RENDER_PORT,
            DEFAULT_ITERATIONS_PER_SECOND,
        )
    }
}

/// Converts a loop rate into the per-iteration wait budget.
///
/// A rate of zero is treated as one iteration per second.
pub fn tick_interval_for(iterations_per_second: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(iterations_per_second.max(1)))
}

/// The control loop.
pub struct SessionLoop<W: NativeWindow, S: InputSink> {
    window: W,
    forwarder: EventForwarder<S>,
    pointer: PointerState,
    quit: Option<QuitAccelerator>,
    settings: SessionSettings,
    state: SessionState,
    iterations: u64,
}

impl<W: NativeWindow, S: InputSink> SessionLoop<W, S> {
    /// Creates a loop in the `Starting` state.
    ///
    /// The sink is only wrapped here; it does not touch the network before
    /// the first `tick`, which happens after the render target started.
    pub fn new(window: W, sink: S, settings: SessionSettings) -> Self {
        Self {
            window,
            forwarder: EventForwarder::new(sink),
            pointer: PointerState::new(),
            quit: QuitAccelerator::native(),
            settings,
            state: SessionState::Starting,
            iterations: 0,
        }
    }

    /// Replaces the platform quit accelerator.
    pub fn with_quit_accelerator(mut self, quit: QuitAccelerator) -> Self {
        self.quit = Some(quit);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> ForwarderStats {
        self.forwarder.stats()
    }

    /// Borrows the input sink, e.g. to inspect a recording sink in tests.
    pub fn sink(&self) -> &S {
        self.forwarder.sink()
    }

    /// Number of completed loop iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Runs the session from `Starting` to `Stopped`.
    ///
    /// # Errors
    ///
    /// [`SessionError::RenderStart`] when the render target cannot be
    /// started; [`SessionError::RenderStop`] when teardown reports failure.
    pub async fn run(&mut self, backend: &dyn RenderBackend) -> Result<(), SessionError> {
        let handle = self.window.acquire_native_handle();
        let target = RenderTarget::new(handle, self.settings.window_size, self.settings.render_port);

        info!("initializing renderer process");
        let session = match RenderSession::start(backend, target) {
            Ok(session) => session,
            Err(e) => {
                self.state = SessionState::Stopped;
                return Err(SessionError::RenderStart(e));
            }
        };
        info!("renderer process started");
        self.state = SessionState::Running;

        while self.state == SessionState::Running {
            self.step().await;
        }
        // Events dispatched in the last iteration are still queued.
        self.forwarder.drain_pending();

        info!("stopping the renderer process");
        let result = session.stop();
        self.state = SessionState::Stopped;

        let stats = self.forwarder.stats();
        info!(
            iterations = self.iterations,
            forwarded = stats.forwarded,
            dropped = stats.dropped,
            transport_errors = stats.transport_errors,
            "session finished"
        );
        result.map_err(SessionError::RenderStop)
    }

    /// Runs one iteration.  Does nothing unless the loop is `Running`.
    pub async fn step(&mut self) {
        if self.state != SessionState::Running {
            return;
        }

        self.forwarder.tick(self.settings.tick_interval).await;
        self.forwarder.drain_pending();

        while let Some(event) = self.window.poll_event() {
            if self.dispatch(event).is_break() {
                self.state = SessionState::Stopping;
                break;
            }
        }
        self.iterations += 1;
    }

    fn dispatch(&mut self, event: WindowEvent) -> ControlFlow<()> {
        match event {
            WindowEvent::PointerDown { x, y } => {
                if self.pointer.press() == PointerTransition::Pressed {
                    self.forwarder.pointer_down(x, y);
                }
            }
            WindowEvent::PointerUp { x, y } => {
                if self.pointer.release() == PointerTransition::Released {
                    self.forwarder.pointer_up(x, y);
                }
            }
            WindowEvent::PointerMotion { x, y } => {
                if self.pointer.forwards_motion() {
                    self.forwarder.pointer_motion(x, y);
                }
            }
            WindowEvent::KeyDown(key) => {
                if self.quit.is_some_and(|quit| quit.matches(&key)) {
                    info!("quit accelerator pressed");
                    return ControlFlow::Break(());
                }
                self.forwarder.key_down(KeyTranslator::translate(key.sym));
            }
            WindowEvent::KeyUp(key) => {
                self.forwarder.key_up(KeyTranslator::translate(key.sym));
            }
            WindowEvent::Quit => {
                debug!("quit event received");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_session::MockRenderBackend;
    use crate::application::window_events::{KeyEvent, Modifiers};
    use crate::infrastructure::input_sink::mock::{MockInputSink, SinkCall};
    use crate::infrastructure::window::mock::ScriptedWindow;
    use emugl_core::keymap::x11_keysym::{XK_ESCAPE, XK_LEFT, XK_Q};
    use emugl_core::LogicalKeyCode;

    fn backend_expecting_stop(stops: usize) -> MockRenderBackend {
        let mut backend = MockRenderBackend::new();
        backend.expect_initialize().returning(|_, _, _| Ok(()));
        backend.expect_shutdown().times(stops).returning(|| Ok(()));
        backend
    }

    fn forwarded(sink: &MockInputSink) -> Vec<SinkCall> {
        sink.calls()
            .into_iter()
            .filter(|c| !matches!(c, SinkCall::Wait(_) | SinkCall::Poll))
            .collect()
    }

    #[test]
    fn test_tick_interval_matches_fifteen_per_second() {
        assert_eq!(tick_interval_for(15), Duration::from_millis(66));
        assert_eq!(tick_interval_for(0), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_new_loop_is_starting() {
        let session = SessionLoop::new(ScriptedWindow::new(1), MockInputSink::new(), SessionSettings::default());
        assert_eq!(session.state(), SessionState::Starting);
    }

    #[tokio::test]
    async fn test_pointer_down_then_quit_forwards_once_and_stops_once() {
        // Arrange
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::PointerDown { x: 10, y: 20 },
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let backend = backend_expecting_stop(1);
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        // Act
        session.run(&backend).await.unwrap();

        // Assert
        assert_eq!(forwarded(&sink), vec![SinkCall::MouseDown(10, 20)]);
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.iterations(), 1);
    }

    #[tokio::test]
    async fn test_start_failure_stops_without_teardown() {
        // Arrange
        let mut backend = MockRenderBackend::new();
        backend
            .expect_initialize()
            .returning(|t, _, _| Err(RenderError::InitializeFailed { port: t.port() }));
        backend.expect_shutdown().times(0);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(ScriptedWindow::new(1), sink.clone(), SessionSettings::default());

        // Act
        let result = session.run(&backend).await;

        // Assert
        assert!(matches!(result, Err(SessionError::RenderStart(_))));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(sink.calls().is_empty(), "sink must not be touched before start succeeds");
    }

    #[tokio::test]
    async fn test_each_iteration_ticks_then_polls_and_exit_drains() {
        let window = ScriptedWindow::new(1)
            .with_batch(vec![])
            .with_batch(vec![WindowEvent::Quit]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        session.run(&backend_expecting_stop(1)).await.unwrap();

        let interval = SessionSettings::default().tick_interval;
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Wait(interval),
                SinkCall::Poll,
                SinkCall::Wait(interval),
                SinkCall::Poll,
                SinkCall::Poll,
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_pointer_events_are_suppressed() {
        // Arrange
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::PointerUp { x: 0, y: 0 },
            WindowEvent::PointerMotion { x: 1, y: 1 },
            WindowEvent::PointerDown { x: 2, y: 2 },
            WindowEvent::PointerDown { x: 3, y: 3 },
            WindowEvent::PointerMotion { x: 4, y: 4 },
            WindowEvent::PointerUp { x: 5, y: 5 },
            WindowEvent::PointerUp { x: 6, y: 6 },
            WindowEvent::PointerMotion { x: 7, y: 7 },
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        // Act
        session.run(&backend_expecting_stop(1)).await.unwrap();

        // Assert
        assert_eq!(
            forwarded(&sink),
            vec![
                SinkCall::MouseDown(2, 2),
                SinkCall::MouseMotion(4, 4),
                SinkCall::MouseUp(5, 5),
            ]
        );
    }

    #[tokio::test]
    async fn test_keys_are_translated_before_forwarding() {
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::KeyDown(KeyEvent::new(XK_ESCAPE)),
            WindowEvent::KeyUp(KeyEvent::new(XK_ESCAPE)),
            WindowEvent::KeyDown(KeyEvent::new(0x0061)),
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        session.run(&backend_expecting_stop(1)).await.unwrap();

        assert_eq!(
            forwarded(&sink),
            vec![
                SinkCall::KeyDown(LogicalKeyCode::BACK),
                SinkCall::KeyUp(LogicalKeyCode::BACK),
                SinkCall::KeyDown(LogicalKeyCode(0x0061)),
            ]
        );
    }

    #[tokio::test]
    async fn test_quit_accelerator_short_circuits_remaining_events() {
        // Arrange
        let accelerator = QuitAccelerator::new(XK_Q, Modifiers::META);
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::KeyDown(KeyEvent::new(XK_LEFT)),
            WindowEvent::KeyDown(KeyEvent::with_modifiers(XK_Q, Modifiers::META)),
            WindowEvent::KeyUp(KeyEvent::with_modifiers(XK_Q, Modifiers::META)),
            WindowEvent::KeyDown(KeyEvent::new(XK_LEFT)),
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default())
            .with_quit_accelerator(accelerator);

        // Act
        session.run(&backend_expecting_stop(1)).await.unwrap();

        // Assert – only the key before the accelerator went out
        assert_eq!(forwarded(&sink), vec![SinkCall::KeyDown(LogicalKeyCode::LEFT)]);
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_plain_q_is_forwarded() {
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::KeyDown(KeyEvent::new(XK_Q)),
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        session.run(&backend_expecting_stop(1)).await.unwrap();

        assert_eq!(forwarded(&sink), vec![SinkCall::KeyDown(LogicalKeyCode(XK_Q))]);
    }

    #[tokio::test]
    async fn test_events_after_quit_stay_queued() {
        // Arrange
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::Quit,
            WindowEvent::PointerDown { x: 1, y: 1 },
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        // Act
        session.run(&backend_expecting_stop(1)).await.unwrap();

        // Assert
        assert!(forwarded(&sink).is_empty());
    }

    #[tokio::test]
    async fn test_step_is_noop_when_not_running() {
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(ScriptedWindow::new(1), sink.clone(), SessionSettings::default());

        session.step().await;

        assert!(sink.calls().is_empty());
        assert_eq!(session.iterations(), 0);
    }

    #[tokio::test]
    async fn test_pointer_state_persists_across_iterations() {
        let window = ScriptedWindow::new(1)
            .with_batch(vec![WindowEvent::PointerDown { x: 1, y: 1 }])
            .with_batch(vec![WindowEvent::PointerMotion { x: 2, y: 2 }])
            .with_batch(vec![WindowEvent::PointerUp { x: 3, y: 3 }, WindowEvent::Quit]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        session.run(&backend_expecting_stop(1)).await.unwrap();

        assert_eq!(
            forwarded(&sink),
            vec![
                SinkCall::MouseDown(1, 1),
                SinkCall::MouseMotion(2, 2),
                SinkCall::MouseUp(3, 3),
            ]
        );
        assert_eq!(session.iterations(), 3);
    }

    #[tokio::test]
    async fn test_input_before_quit_is_drained_before_stop() {
        // Arrange
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::PointerDown { x: 10, y: 20 },
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        // Act
        session.run(&backend_expecting_stop(1)).await.unwrap();

        // Assert – a poll follows the last forwarded event
        let calls = sink.calls();
        let down = calls.iter().position(|c| *c == SinkCall::MouseDown(10, 20)).unwrap();
        assert!(calls[down..].contains(&SinkCall::Poll));
    }

    #[cfg(not(target_os = "macos"))]
    #[tokio::test]
    async fn test_ctrl_q_is_forwarded_without_native_accelerator() {
        let window = ScriptedWindow::new(1).with_batch(vec![
            WindowEvent::KeyDown(KeyEvent::with_modifiers(XK_Q, Modifiers::CTRL)),
            WindowEvent::Quit,
        ]);
        let sink = MockInputSink::new();
        let mut session = SessionLoop::new(window, sink.clone(), SessionSettings::default());

        session.run(&backend_expecting_stop(1)).await.unwrap();

        assert_eq!(forwarded(&sink), vec![SinkCall::KeyDown(LogicalKeyCode(XK_Q))]);
    }
}
