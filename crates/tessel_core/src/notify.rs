//! Change notification channel
//!
//! A field that changes value builds a [`ChangeEvent<T>`] and delivers it in
//! two stages:
//!
//! 1. **Own observers** run in registration order with `&mut ChangeEvent<T>`.
//!    Every observer of the changed field runs, even if an earlier one stops
//!    propagation.
//! 2. **Bubbling** walks explicit parent pointers ([`EventNode::parent`]),
//!    handing each ancestor's handlers a type-erased [`BubbledChange`]. The
//!    `stopped` flag is checked after every handler, and the walk ends as
//!    soon as it is set.
//!
//! Composite fields observe their children in stage 1 and stop propagation
//! there, so an ancestor never sees a child's raw event before the composite
//! has re-derived and announced its own value.
//!
//! ```text
//! Field<f32> (x) ──set──► ChangeEvent<f32>
//!     ├─► x observers (composite re-derives, stops propagation)
//!     └─✕ bubbling halted
//! Field<Vec3> ──set──► ChangeEvent<Vec3>
//!     ├─► vector observers
//!     └─► ancestors: BubbledChange { target, previous: &dyn Any, new: &dyn Any }
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Handle to a typed observer registered on a field
    pub struct ObserverId;
    /// Handle to a bubbling handler registered on an event node
    pub struct HandlerId;
}

/// Identity of a field (and of its event node)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

impl FieldId {
    fn next() -> Self {
        FieldId(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// CHANGE EVENTS
// =============================================================================

/// A value transition on a field
///
/// Only constructed when the previous and new values differ under the value
/// type's equality rule, or when a user commit resolves a mixed value.
#[derive(Debug, Clone)]
pub struct ChangeEvent<T> {
    previous_value: T,
    new_value: T,
    target: FieldId,
    propagation_stopped: bool,
}

impl<T> ChangeEvent<T> {
    pub fn new(previous_value: T, new_value: T, target: FieldId) -> Self {
        Self {
            previous_value,
            new_value,
            target,
            propagation_stopped: false,
        }
    }

    pub fn previous_value(&self) -> &T {
        &self.previous_value
    }

    pub fn new_value(&self) -> &T {
        &self.new_value
    }

    /// The field whose value changed
    pub fn target(&self) -> FieldId {
        self.target
    }

    /// Prevent the event from reaching ancestors
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Type-erased change event seen by ancestors while bubbling
pub struct BubbledChange<'a> {
    target: FieldId,
    previous: &'a dyn Any,
    new: &'a dyn Any,
    stopped: bool,
}

impl<'a> BubbledChange<'a> {
    pub fn new(target: FieldId, previous: &'a dyn Any, new: &'a dyn Any) -> Self {
        Self {
            target,
            previous,
            new,
            stopped: false,
        }
    }

    pub fn target(&self) -> FieldId {
        self.target
    }

    /// The `(previous, new)` pair if the changed field holds a `T`
    pub fn downcast<T: 'static>(&self) -> Option<(&T, &T)> {
        let previous = self.previous.downcast_ref::<T>()?;
        let new = self.new.downcast_ref::<T>()?;
        Some((previous, new))
    }

    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

// =============================================================================
// TYPED OBSERVERS
// =============================================================================

/// Callback receiving a field's own change events
pub type Observer<T> = Rc<dyn Fn(&mut ChangeEvent<T>)>;

/// Ordered set of observers on one field
pub struct ObserverList<T> {
    observers: SlotMap<ObserverId, Observer<T>>,
    order: SmallVec<[ObserverId; 4]>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            observers: SlotMap::with_key(),
            order: SmallVec::new(),
        }
    }
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Observer<T>) -> ObserverId {
        let id = self.observers.insert(observer);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: ObserverId) -> bool {
        if self.observers.remove(id).is_some() {
            self.order.retain(|o| *o != id);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Observers in registration order
    ///
    /// Returned as owned handles so callers can release their borrow of the
    /// list before invoking them; observers may subscribe or unsubscribe
    /// while running.
    pub fn snapshot(&self) -> SmallVec<[Observer<T>; 4]> {
        self.order
            .iter()
            .filter_map(|id| self.observers.get(*id).cloned())
            .collect()
    }
}

// =============================================================================
// EVENT NODES
// =============================================================================

/// Callback receiving bubbled change events from descendants
pub type BubbleHandler = Rc<dyn Fn(&mut BubbledChange<'_>)>;

/// A field's position in the bubbling chain
///
/// Parent links are weak: a node never keeps its ancestors alive.
pub struct EventNode {
    id: FieldId,
    parent: RefCell<Weak<EventNode>>,
    handlers: RefCell<SlotMap<HandlerId, BubbleHandler>>,
    order: RefCell<SmallVec<[HandlerId; 2]>>,
}

impl EventNode {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: FieldId::next(),
            parent: RefCell::new(Weak::new()),
            handlers: RefCell::new(SlotMap::with_key()),
            order: RefCell::new(SmallVec::new()),
        })
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn set_parent(&self, parent: &Rc<EventNode>) {
        *self.parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub fn clear_parent(&self) {
        *self.parent.borrow_mut() = Weak::new();
    }

    pub fn parent(&self) -> Option<Rc<EventNode>> {
        self.parent.borrow().upgrade()
    }

    /// Register a handler for changes bubbling up from descendants
    pub fn add_bubble_handler(&self, handler: impl Fn(&mut BubbledChange<'_>) + 'static) -> HandlerId {
        let id = self.handlers.borrow_mut().insert(Rc::new(handler));
        self.order.borrow_mut().push(id);
        id
    }

    pub fn remove_bubble_handler(&self, id: HandlerId) -> bool {
        if self.handlers.borrow_mut().remove(id).is_some() {
            self.order.borrow_mut().retain(|h| *h != id);
            true
        } else {
            false
        }
    }

    /// Deliver `change` to each ancestor in turn until one stops it
    pub fn bubble(&self, change: &mut BubbledChange<'_>) {
        let mut current = self.parent();
        while let Some(node) = current {
            for handler in node.handler_snapshot() {
                handler(change);
                if change.is_propagation_stopped() {
                    tracing::trace!(
                        target_field = change.target().raw(),
                        stopped_at = node.id().raw(),
                        "change propagation stopped"
                    );
                    return;
                }
            }
            current = node.parent();
        }
    }

    fn handler_snapshot(&self) -> SmallVec<[BubbleHandler; 2]> {
        let handlers = self.handlers.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|id| handlers.get(*id).cloned())
            .collect()
    }
}
