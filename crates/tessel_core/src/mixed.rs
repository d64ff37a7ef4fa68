//! Mixed-value display overlay
//!
//! When a field edits several backing objects that disagree, it shows a
//! marker instead of its own value. The overlay only swaps what is displayed:
//! the stored value is never touched, and the display text present at entry
//! is snapshotted so leaving the overlay restores it exactly.
//!
//! While mixed, writes to the display text land in the snapshot instead, so
//! a value that changes underneath the overlay is shown once it is lifted.

use crate::fsm::StateTransitions;

/// Events driving [`MixedValueState`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MixedValueEvent {
    /// Enter the overlay, snapshotting the current display (if any)
    Show { current_display: Option<String> },
    /// Leave the overlay
    Hide,
}

/// Display overlay state of a field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MixedValueState {
    #[default]
    Normal,
    Mixed {
        /// Display text to restore on exit
        snapshot: Option<String>,
    },
}

impl MixedValueState {
    pub fn is_mixed(&self) -> bool {
        matches!(self, MixedValueState::Mixed { .. })
    }

    /// Enter the overlay; returns `false` if already mixed
    pub fn enter(&mut self, current_display: Option<String>) -> bool {
        self.apply(MixedValueEvent::Show { current_display })
    }

    /// Leave the overlay, returning the display text to restore
    ///
    /// `None` when the field was not mixed or no snapshot was taken, in which
    /// case the caller keeps its default display.
    pub fn exit(&mut self) -> Option<String> {
        let snapshot = match self {
            MixedValueState::Mixed { snapshot } => snapshot.take(),
            MixedValueState::Normal => return None,
        };
        self.apply(MixedValueEvent::Hide);
        snapshot
    }

    /// Replace the snapshot while mixed; returns `false` in `Normal`
    pub fn update_snapshot(&mut self, display: Option<String>) -> bool {
        match self {
            MixedValueState::Mixed { snapshot } => {
                *snapshot = display;
                true
            }
            MixedValueState::Normal => false,
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        match self {
            MixedValueState::Mixed { snapshot } => snapshot.as_deref(),
            MixedValueState::Normal => None,
        }
    }
}

impl StateTransitions for MixedValueState {
    type Event = MixedValueEvent;

    fn on_event(&self, event: &MixedValueEvent) -> Option<Self> {
        match (self, event) {
            (MixedValueState::Normal, MixedValueEvent::Show { current_display }) => {
                Some(MixedValueState::Mixed {
                    snapshot: current_display.clone(),
                })
            }
            (MixedValueState::Mixed { .. }, MixedValueEvent::Hide) => Some(MixedValueState::Normal),
            _ => None,
        }
    }
}
