//! Pointer button gate.
//!
//! The emulator console models a single touch contact, so the harness tracks
//! one "button is down" flag regardless of which mouse button the window
//! system reports.  A second press while already down and a release while
//! already up are suppressed; motion is only meaningful while the contact is
//! down.

/// Result of feeding a button event into [`PointerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTransition {
    /// The contact went from up to down; forward a pointer-down.
    Pressed,
    /// The contact went from down to up; forward a pointer-up.
    Released,
    /// The event did not change the state; forward nothing.
    Unchanged,
}

impl PointerTransition {
    /// `true` when the event must be forwarded to the input sink.
    pub fn is_change(self) -> bool {
        !matches!(self, PointerTransition::Unchanged)
    }
}

/// Single "button currently down" flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    down: bool,
}

impl PointerState {
    /// Creates a state with the button up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while the button is held.
    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Records a button press.
    pub fn press(&mut self) -> PointerTransition {
        if self.down {
            return PointerTransition::Unchanged;
        }
        self.down = true;
        PointerTransition::Pressed
    }

    /// Records a button release.
    pub fn release(&mut self) -> PointerTransition {
        if !self.down {
            return PointerTransition::Unchanged;
        }
        self.down = false;
        PointerTransition::Released
    }

    /// Motion is forwarded only while the button is down.
    pub fn forwards_motion(&self) -> bool {
        self.down
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pointer_state_is_up() {
        assert!(!PointerState::new().is_down());
    }

    #[test]
    fn test_press_from_up_transitions_to_down() {
        // Arrange
        let mut state = PointerState::new();

        // Act
        let transition = state.press();

        // Assert
        assert_eq!(transition, PointerTransition::Pressed);
        assert!(state.is_down());
    }

    #[test]
    fn test_repeated_press_is_suppressed() {
        // Arrange
        let mut state = PointerState::new();
        state.press();

        // Act
        let transitions: Vec<_> = (0..5).map(|_| state.press()).collect();

        // Assert – only the very first press counts
        assert!(transitions.iter().all(|t| *t == PointerTransition::Unchanged));
        assert!(state.is_down());
    }

    #[test]
    fn test_release_while_up_is_suppressed() {
        let mut state = PointerState::new();
        assert_eq!(state.release(), PointerTransition::Unchanged);
        assert!(!state.is_down());
    }

    #[test]
    fn test_press_then_release_round_trip() {
        let mut state = PointerState::new();
        assert_eq!(state.press(), PointerTransition::Pressed);
        assert_eq!(state.release(), PointerTransition::Released);
        assert_eq!(state.release(), PointerTransition::Unchanged);
        assert_eq!(state.press(), PointerTransition::Pressed);
    }

    #[test]
    fn test_motion_gated_by_most_recent_transition() {
        // Arrange
        let mut state = PointerState::new();

        // Act / Assert
        assert!(!state.forwards_motion(), "no motion before the first press");
        state.press();
        assert!(state.forwards_motion());
        state.press();
        assert!(state.forwards_motion(), "duplicate press keeps the contact down");
        state.release();
        assert!(!state.forwards_motion(), "motion after release is dropped");
    }

    #[test]
    fn test_transition_is_change() {
        assert!(PointerTransition::Pressed.is_change());
        assert!(PointerTransition::Released.is_change());
        assert!(!PointerTransition::Unchanged.is_change());
    }
}
