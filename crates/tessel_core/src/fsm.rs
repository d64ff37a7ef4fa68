//! Explicit state machines for widget interaction
//!
//! Widget interaction is modeled as tagged state advanced by typed events,
//! never as a set of independent boolean flags.
//!
//! ```ignore
//! use tessel_core::fsm::{InteractionEvent, InteractionState, StateTransitions};
//!
//! let mut state = InteractionState::Idle;
//! state.apply(InteractionEvent::PointerEnter);
//! state.apply(InteractionEvent::PointerDown);
//! assert_eq!(state, InteractionState::Pressed);
//! ```

use std::fmt::Debug;

/// A state type that reacts to events of type `Self::Event`
pub trait StateTransitions: Clone + PartialEq + Debug + 'static {
    type Event: Debug;

    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: &Self::Event) -> Option<Self>;

    /// Advance in place, returning whether a transition happened
    fn apply(&mut self, event: Self::Event) -> bool
    where
        Self: Sized,
    {
        match self.on_event(&event) {
            Some(next) => {
                tracing::trace!(from = ?self, to = ?next, ?event, "state transition");
                *self = next;
                true
            }
            None => false,
        }
    }
}

/// Pointer interaction events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    /// The pressed pointer moved far enough to start a drag
    DragStart,
    DragEnd,
    /// The host revoked the pointer capture
    CaptureLost,
}

/// Common interaction state shared by pressable and draggable controls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovered,
    Pressed,
    Dragging,
}

impl InteractionState {
    /// Pressed or dragging
    pub fn is_active(&self) -> bool {
        matches!(self, InteractionState::Pressed | InteractionState::Dragging)
    }
}

impl StateTransitions for InteractionState {
    type Event = InteractionEvent;

    fn on_event(&self, event: &InteractionEvent) -> Option<Self> {
        use InteractionEvent::*;
        use InteractionState::*;
        match (self, event) {
            (Idle, PointerEnter) => Some(Hovered),
            (Hovered, PointerLeave) => Some(Idle),

            // Touch input presses without hovering first
            (Idle | Hovered, PointerDown) => Some(Pressed),
            (Pressed, PointerUp) => Some(Hovered),

            (Pressed, DragStart) => Some(Dragging),
            (Dragging, DragEnd | PointerUp) => Some(Hovered),

            // Pressed state survives leaving the bounds while captured
            (Pressed | Dragging, CaptureLost) => Some(Idle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_cycle() {
        let mut state = InteractionState::default();
        assert!(state.apply(InteractionEvent::PointerEnter));
        assert!(state.apply(InteractionEvent::PointerDown));
        assert!(state.is_active());
        assert!(!state.apply(InteractionEvent::PointerLeave));
        assert!(state.apply(InteractionEvent::PointerUp));
        assert_eq!(state, InteractionState::Hovered);
    }

    #[test]
    fn test_drag_and_capture_loss() {
        let mut state = InteractionState::Idle;
        state.apply(InteractionEvent::PointerDown);
        assert!(state.apply(InteractionEvent::DragStart));
        assert_eq!(state, InteractionState::Dragging);
        assert!(state.apply(InteractionEvent::CaptureLost));
        assert_eq!(state, InteractionState::Idle);
        assert!(!state.apply(InteractionEvent::DragEnd));
    }
}
