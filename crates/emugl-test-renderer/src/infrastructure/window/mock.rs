//! Scripted window for tests.
//!
//! Events are grouped into batches; each batch is what one loop iteration
//! finds in the window-system queue.  Once a batch is drained the next
//! `poll_event` returns `None` and the following iteration starts on the next
//! batch.  An exhausted script reports `Quit`, so a loop under test always
//! terminates.

use std::cell::Cell;
use std::collections::VecDeque;

use emugl_core::WindowHandle;

use crate::application::window_events::{NativeWindow, WindowEvent};

/// A [`NativeWindow`] replaying a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedWindow {
    handle: u64,
    batches: VecDeque<VecDeque<WindowEvent>>,
    handle_requests: Cell<u32>,
}

impl ScriptedWindow {
    /// Creates a window whose native handle is `handle`, with an empty script.
    pub fn new(handle: u64) -> Self {
        Self {
            handle,
            ..Self::default()
        }
    }

    /// Appends one iteration's worth of events.
    pub fn with_batch(mut self, events: Vec<WindowEvent>) -> Self {
        self.batches.push_back(events.into());
        self
    }

    /// How often the native handle was requested.
    pub fn handle_requests(&self) -> u32 {
        self.handle_requests.get()
    }

    /// Events not consumed by the loop.
    pub fn remaining(&self) -> usize {
        self.batches.iter().map(VecDeque::len).sum()
    }
}

impl NativeWindow for ScriptedWindow {
    fn acquire_native_handle(&self) -> WindowHandle {
        self.handle_requests.set(self.handle_requests.get() + 1);
        WindowHandle::from_raw(self.handle)
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        let Some(batch) = self.batches.front_mut() else {
            return Some(WindowEvent::Quit);
        };
        match batch.pop_front() {
            Some(event) => Some(event),
            None => {
                self.batches.pop_front();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_are_separated_by_none() {
        let mut window = ScriptedWindow::new(9)
            .with_batch(vec![WindowEvent::PointerDown { x: 1, y: 2 }])
            .with_batch(vec![]);

        assert_eq!(window.poll_event(), Some(WindowEvent::PointerDown { x: 1, y: 2 }));
        assert_eq!(window.poll_event(), None);
        assert_eq!(window.poll_event(), None);
        assert_eq!(window.poll_event(), Some(WindowEvent::Quit));
    }

    #[test]
    fn test_handle_requests_are_counted() {
        let window = ScriptedWindow::new(0x2a);

        assert_eq!(window.acquire_native_handle(), WindowHandle::from_raw(0x2a));
        assert_eq!(window.handle_requests(), 1);
    }
}
