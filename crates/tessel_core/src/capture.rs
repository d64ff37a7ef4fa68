//! Pointer capture registry
//!
//! While a pointer is captured, only the capturing widget receives its move
//! and up events. The host owns one registry and routes events accordingly;
//! widgets consult it to decide whether a move/up belongs to a gesture they
//! started. Events arriving without a matching capture are ignored.

use std::collections::HashMap;

use crate::events::{PointerId, WidgetId};

/// Tracks which widget holds each pointer
#[derive(Debug, Default)]
pub struct PointerCapture {
    owners: HashMap<PointerId, WidgetId>,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `pointer` for `owner`
    ///
    /// Returns `false` when another widget already holds the pointer; the
    /// caller must then ignore the gesture. Re-capturing a pointer the owner
    /// already holds succeeds.
    pub fn capture(&mut self, pointer: PointerId, owner: WidgetId) -> bool {
        match self.owners.get(&pointer) {
            Some(current) if *current != owner => {
                tracing::debug!(
                    pointer,
                    owner = owner.raw(),
                    holder = current.raw(),
                    "capture refused, pointer already captured"
                );
                false
            }
            _ => {
                self.owners.insert(pointer, owner);
                true
            }
        }
    }

    /// Release `pointer` if `owner` holds it
    pub fn release(&mut self, pointer: PointerId, owner: WidgetId) -> bool {
        if self.has_capture(pointer, owner) {
            self.owners.remove(&pointer);
            true
        } else {
            false
        }
    }

    /// Whether `owner` currently holds `pointer`
    pub fn has_capture(&self, pointer: PointerId, owner: WidgetId) -> bool {
        self.owners.get(&pointer) == Some(&owner)
    }

    /// The widget holding `pointer`, if any
    pub fn owner(&self, pointer: PointerId) -> Option<WidgetId> {
        self.owners.get(&pointer).copied()
    }

    /// Revoke the capture of `pointer` regardless of owner
    ///
    /// Returns the previous owner so the host can deliver
    /// `InputEvent::PointerCaptureLost` to it.
    pub fn force_release(&mut self, pointer: PointerId) -> Option<WidgetId> {
        let previous = self.owners.remove(&pointer);
        if let Some(owner) = previous {
            tracing::debug!(pointer, owner = owner.raw(), "capture force released");
        }
        previous
    }

    /// Release every pointer held by `owner`, returning the released ids
    pub fn release_all(&mut self, owner: WidgetId) -> Vec<PointerId> {
        let mut released: Vec<PointerId> = self
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(p, _)| *p)
            .collect();
        released.sort_unstable();
        for pointer in &released {
            self.owners.remove(pointer);
        }
        released
    }
}
