//! Value container with change notification
//!
//! [`Field<T>`] is the shared value cell behind every widget. It is a cheap
//! handle (`Rc`) so that observers, composite bindings and the owning widget
//! can all reach the same value.
//!
//! # Setting values
//!
//! - [`Field::set_value`] coerces (clamps) the input, compares it to the stored
//!   value with [`FieldValue::same_value`] and, on a real transition, stores
//!   it, refreshes the value-derived display text and raises one
//!   [`ChangeEvent`]. With the default [`NotifyPolicy::WhenAttached`] a
//!   detached field stores silently.
//! - [`Field::set_value_without_notify`] stores and refreshes the display but
//!   never notifies. Used when one field mirrors another programmatically.
//!
//! Observers run with no internal borrow held, so they may freely read or
//! write the field (or subscribe and unsubscribe) while being notified.
//!
//! ```ignore
//! let field = Field::new(false);
//! field.attach();
//! field.subscribe(|event| println!("{} -> {}", event.previous_value(), event.new_value()));
//! field.set_value(true);
//! ```

use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::geometry::{Bounds, Vec3};
use crate::math::{approximately_f32, approximately_f64};
use crate::mixed::MixedValueState;
use crate::notify::{BubbledChange, ChangeEvent, EventNode, FieldId, ObserverId, ObserverList};

/// Default marker shown while a field displays a mixed value
pub const MIXED_VALUE_MARKER: &str = "\u{2014}";

// =============================================================================
// VALUE TYPES
// =============================================================================

/// A type that can live in a [`Field`]
pub trait FieldValue: Clone + Debug + 'static {
    /// Equality rule used for change detection
    fn same_value(&self, other: &Self) -> bool;

    /// Default display text
    fn display(&self) -> String {
        format!("{:?}", self)
    }
}

macro_rules! impl_field_value_exact {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn same_value(&self, other: &Self) -> bool {
                    self == other
                }

                fn display(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_field_value_exact!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, String);

impl FieldValue for f32 {
    fn same_value(&self, other: &Self) -> bool {
        approximately_f32(*self, *other)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for f64 {
    fn same_value(&self, other: &Self) -> bool {
        approximately_f64(*self, *other)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for Option<usize> {
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }

    fn display(&self) -> String {
        match self {
            Some(index) => index.to_string(),
            None => String::new(),
        }
    }
}

impl FieldValue for Vec<usize> {
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }

    fn display(&self) -> String {
        self.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
    }
}

impl FieldValue for Vec3 {
    fn same_value(&self, other: &Self) -> bool {
        approximately_f32(self.x, other.x)
            && approximately_f32(self.y, other.y)
            && approximately_f32(self.z, other.z)
    }

    fn display(&self) -> String {
        format!("({}, {}, {})", self.x, self.y, self.z)
    }
}

impl FieldValue for Bounds {
    fn same_value(&self, other: &Self) -> bool {
        self.center.same_value(&other.center) && self.extents.same_value(&other.extents)
    }

    fn display(&self) -> String {
        format!(
            "Center: {}, Extents: {}",
            self.center.display(),
            self.extents.display()
        )
    }
}

// =============================================================================
// FIELD
// =============================================================================

/// When a field raises change notifications
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// Only while attached to a live display tree
    #[default]
    WhenAttached,
    /// Regardless of attachment
    Always,
}

type Coercion<T> = Rc<dyn Fn(T) -> T>;
type Formatter<T> = Rc<dyn Fn(&T) -> String>;
type StoredHook<T> = Rc<dyn Fn(&T, bool)>;

struct FieldInner<T: FieldValue> {
    node: Rc<EventNode>,
    value: RefCell<T>,
    attached: Cell<bool>,
    policy: Cell<NotifyPolicy>,
    coercion: RefCell<Option<Coercion<T>>>,
    formatter: RefCell<Option<Formatter<T>>>,
    /// Display text shown while not mixed
    display: RefCell<String>,
    mixed: RefCell<MixedValueState>,
    mixed_marker: RefCell<String>,
    observers: RefCell<ObserverList<T>>,
    stored_hooks: RefCell<SmallVec<[StoredHook<T>; 2]>>,
}

/// Shared typed value cell with change notification
pub struct Field<T: FieldValue> {
    inner: Rc<FieldInner<T>>,
}

impl<T: FieldValue> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: FieldValue> Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id())
            .field("value", &*self.inner.value.borrow())
            .field("attached", &self.inner.attached.get())
            .field("mixed", &self.inner.mixed.borrow().is_mixed())
            .finish()
    }
}

impl<T: FieldValue + Default> Default for Field<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: FieldValue> Field<T> {
    /// Create a detached field holding `initial`
    pub fn new(initial: T) -> Self {
        let display = initial.display();
        Self {
            inner: Rc::new(FieldInner {
                node: EventNode::new(),
                value: RefCell::new(initial),
                attached: Cell::new(false),
                policy: Cell::new(NotifyPolicy::default()),
                coercion: RefCell::new(None),
                formatter: RefCell::new(None),
                display: RefCell::new(display),
                mixed: RefCell::new(MixedValueState::Normal),
                mixed_marker: RefCell::new(MIXED_VALUE_MARKER.to_string()),
                observers: RefCell::new(ObserverList::new()),
                stored_hooks: RefCell::new(SmallVec::new()),
            }),
        }
    }

    pub fn id(&self) -> FieldId {
        self.inner.node.id()
    }

    /// The bubbling node of this field
    pub fn node(&self) -> &Rc<EventNode> {
        &self.inner.node
    }

    /// Make `parent` the next hop when this field's events bubble
    pub fn set_parent<P: FieldValue>(&self, parent: &Field<P>) {
        self.inner.node.set_parent(parent.node());
    }

    pub fn downgrade(&self) -> WeakField<T> {
        WeakField {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same field
    pub fn ptr_eq(&self, other: &Field<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Value
    // ─────────────────────────────────────────────────────────────────────────

    /// Current value
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value` and notify if it changed
    ///
    /// Returns whether the stored value changed.
    pub fn set_value(&self, value: T) -> bool {
        self.store(value, false, true)
    }

    /// Store `value` without raising a notification
    pub fn set_value_without_notify(&self, value: T) {
        self.store(value, true, false);
    }

    /// Commit a value entered by the user
    ///
    /// Leaves the mixed overlay first. A commit from the mixed state always
    /// notifies (when the policy allows), even if the value equals the stored
    /// one: the stored value was ambiguous and the user's value is now
    /// authoritative for every backing source.
    pub fn commit_user_value(&self, value: T) -> bool {
        let was_mixed = self.show_mixed_value();
        if was_mixed {
            self.set_show_mixed_value(false);
        }
        self.store(value, was_mixed, true)
    }

    /// Re-apply the coercion to the stored value, notifying on change
    pub fn recoerce(&self) -> bool {
        let value = self.value();
        self.set_value(value)
    }

    fn store(&self, value: T, force: bool, notify: bool) -> bool {
        let value = self.coerce(value);
        let previous = {
            let mut slot = self.inner.value.borrow_mut();
            if !force && slot.same_value(&value) {
                return false;
            }
            std::mem::replace(&mut *slot, value.clone())
        };

        self.refresh_display();
        self.run_stored_hooks(&value, notify);

        if notify && self.should_notify() {
            self.notify(previous, value);
        } else if notify {
            tracing::trace!(field = self.id().raw(), "detached field stored without notification");
        }
        true
    }

    fn coerce(&self, value: T) -> T {
        let coercion = self.inner.coercion.borrow().clone();
        match coercion {
            Some(coerce) => coerce(value),
            None => value,
        }
    }

    fn should_notify(&self) -> bool {
        match self.inner.policy.get() {
            NotifyPolicy::Always => true,
            NotifyPolicy::WhenAttached => self.inner.attached.get(),
        }
    }

    fn run_stored_hooks(&self, value: &T, notify: bool) {
        let hooks = self.inner.stored_hooks.borrow().clone();
        for hook in hooks {
            hook(value, notify);
        }
    }

    fn notify(&self, previous: T, new: T) {
        let mut event = ChangeEvent::new(previous, new, self.id());

        let observers = self.inner.observers.borrow().snapshot();
        for observer in observers {
            observer(&mut event);
        }

        if !event.is_propagation_stopped() {
            let mut bubbled =
                BubbledChange::new(event.target(), event.previous_value(), event.new_value());
            self.inner.node.bubble(&mut bubbled);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observers and hooks
    // ─────────────────────────────────────────────────────────────────────────

    /// Register an observer for this field's change events
    pub fn subscribe(&self, observer: impl Fn(&mut ChangeEvent<T>) + 'static) -> ObserverId {
        self.inner.observers.borrow_mut().add(Rc::new(observer))
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow_mut().remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Run `hook` after every store, notifying or not
    pub fn on_stored(&self, hook: impl Fn(&T) + 'static) {
        self.on_stored_with_notify(move |value, _| hook(value));
    }

    /// Like [`on_stored`](Self::on_stored); `hook` also learns whether the
    /// store asked to notify, before attachment is taken into account
    pub fn on_stored_with_notify(&self, hook: impl Fn(&T, bool) + 'static) {
        self.inner.stored_hooks.borrow_mut().push(Rc::new(hook));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attachment
    // ─────────────────────────────────────────────────────────────────────────

    pub fn attach(&self) {
        self.inner.attached.set(true);
    }

    pub fn detach(&self) {
        self.inner.attached.set(false);
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attached.get()
    }

    pub fn notify_policy(&self) -> NotifyPolicy {
        self.inner.policy.get()
    }

    pub fn set_notify_policy(&self, policy: NotifyPolicy) {
        self.inner.policy.set(policy);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategies
    // ─────────────────────────────────────────────────────────────────────────

    /// Install a coercion (typically a clamp) applied before every store
    ///
    /// The stored value is not re-coerced; call [`Field::recoerce`] for that.
    pub fn set_coercion(&self, coerce: impl Fn(T) -> T + 'static) {
        *self.inner.coercion.borrow_mut() = Some(Rc::new(coerce));
    }

    pub fn clear_coercion(&self) {
        *self.inner.coercion.borrow_mut() = None;
    }

    /// Replace the value-to-text formatter and refresh the display
    pub fn set_formatter(&self, format: impl Fn(&T) -> String + 'static) {
        *self.inner.formatter.borrow_mut() = Some(Rc::new(format));
        self.refresh_display();
    }

    /// Format a value the way this field displays it
    pub fn format(&self, value: &T) -> String {
        let formatter = self.inner.formatter.borrow().clone();
        match formatter {
            Some(format) => format(value),
            None => value.display(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Display and mixed overlay
    // ─────────────────────────────────────────────────────────────────────────

    /// Text currently displayed: the mixed marker while mixed
    pub fn display_text(&self) -> String {
        if self.inner.mixed.borrow().is_mixed() {
            self.inner.mixed_marker.borrow().clone()
        } else {
            self.inner.display.borrow().clone()
        }
    }

    /// Override the displayed text
    ///
    /// While mixed, the text becomes the snapshot restored on exit.
    pub fn set_display_text(&self, text: impl Into<String>) {
        let text = text.into();
        let mut mixed = self.inner.mixed.borrow_mut();
        if mixed.is_mixed() {
            mixed.update_snapshot(Some(text));
        } else {
            *self.inner.display.borrow_mut() = text;
        }
    }

    /// Recompute the displayed text from the stored value
    pub fn refresh_display(&self) {
        let text = self.with_value(|v| self.format(v));
        self.set_display_text(text);
    }

    pub fn show_mixed_value(&self) -> bool {
        self.inner.mixed.borrow().is_mixed()
    }

    /// Enter or leave the mixed overlay
    ///
    /// Never touches the stored value and never notifies.
    pub fn set_show_mixed_value(&self, mixed: bool) {
        let mut state = self.inner.mixed.borrow_mut();
        if mixed {
            let current = self.inner.display.borrow().clone();
            if state.enter(Some(current)) {
                tracing::trace!(field = self.id().raw(), "entered mixed value");
            }
        } else if state.is_mixed() {
            if let Some(snapshot) = state.exit() {
                *self.inner.display.borrow_mut() = snapshot;
            }
            tracing::trace!(field = self.id().raw(), "left mixed value");
        }
    }

    pub fn mixed_marker(&self) -> String {
        self.inner.mixed_marker.borrow().clone()
    }

    pub fn set_mixed_marker(&self, marker: impl Into<String>) {
        *self.inner.mixed_marker.borrow_mut() = marker.into();
    }
}

/// Non-owning handle to a [`Field`]
pub struct WeakField<T: FieldValue> {
    inner: Weak<FieldInner<T>>,
}

impl<T: FieldValue> Clone for WeakField<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: FieldValue> WeakField<T> {
    pub fn upgrade(&self) -> Option<Field<T>> {
        self.inner.upgrade().map(|inner| Field { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: FieldValue>(field: &Field<T>) -> Rc<RefCell<Vec<(T, T)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        field.subscribe(move |e| {
            l.borrow_mut()
                .push((e.previous_value().clone(), e.new_value().clone()))
        });
        log
    }

    #[test]
    fn test_set_same_value_notifies_once() {
        let field = Field::new(0i32);
        field.attach();
        let log = recorder(&field);

        assert!(field.set_value(5));
        assert!(!field.set_value(5));
        assert_eq!(*log.borrow(), vec![(0, 5)]);
    }

    #[test]
    fn test_set_without_notify_never_notifies() {
        let field = Field::new(String::from("a"));
        field.attach();
        let log = recorder(&field);

        field.set_value_without_notify("b".into());
        field.set_value_without_notify("b".into());
        assert_eq!(field.value(), "b");
        assert_eq!(field.display_text(), "b");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_detached_stores_silently() {
        let field = Field::new(false);
        let log = recorder(&field);

        assert!(field.set_value(true));
        assert!(field.value());
        assert!(log.borrow().is_empty());

        field.set_notify_policy(NotifyPolicy::Always);
        field.set_value(false);
        assert_eq!(*log.borrow(), vec![(true, false)]);
    }

    #[test]
    fn test_float_approximate_equality() {
        let field = Field::new(0.1f32 + 0.2f32);
        field.attach();
        let log = recorder(&field);
        assert!(!field.set_value(0.3));
        assert!(field.set_value(f32::NAN));
        assert!(!field.set_value(f32::NAN));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_coercion_clamps_before_compare() {
        let field = Field::new(5.0f64);
        field.attach();
        field.set_coercion(|v: f64| v.clamp(0.0, 10.0));
        let log = recorder(&field);

        assert!(field.set_value(42.0));
        assert_eq!(field.value(), 10.0);
        assert!(!field.set_value(11.0));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_observers_run_in_order_and_may_reenter() {
        let field = Field::new(0i32);
        field.attach();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let f = field.clone();
        field.subscribe(move |e| {
            o.borrow_mut().push(("first", *e.new_value()));
            // Reading and writing from inside an observer is allowed
            if *e.new_value() == 1 {
                f.set_value(2);
            }
        });
        let o = order.clone();
        field.subscribe(move |e| o.borrow_mut().push(("second", *e.new_value())));

        field.set_value(1);
        assert_eq!(field.value(), 2);
        assert_eq!(order.borrow()[0], ("first", 1));
        assert!(order.borrow().contains(&("second", 2)));
    }

    #[test]
    fn test_unsubscribe() {
        let field = Field::new(0u32);
        field.attach();
        let log = Rc::new(Cell::new(0));
        let l = log.clone();
        let id = field.subscribe(move |_| l.set(l.get() + 1));
        field.set_value(1);
        assert!(field.unsubscribe(id));
        field.set_value(2);
        assert_eq!(log.get(), 1);
        assert_eq!(field.observer_count(), 0);
    }

    #[test]
    fn test_mixed_overlay_restores_display() {
        for text in ["", "custom text"] {
            let field = Field::new(3i64);
            field.set_display_text(text);
            field.set_show_mixed_value(true);
            assert_eq!(field.display_text(), MIXED_VALUE_MARKER);
            assert_eq!(field.value(), 3);
            field.set_show_mixed_value(false);
            assert_eq!(field.display_text(), text);
        }
    }

    #[test]
    fn test_value_change_while_mixed_shows_after_exit() {
        let field = Field::new(1i32);
        field.set_show_mixed_value(true);
        field.set_value_without_notify(7);
        assert_eq!(field.display_text(), MIXED_VALUE_MARKER);
        field.set_show_mixed_value(false);
        assert_eq!(field.display_text(), "7");
    }

    #[test]
    fn test_commit_from_mixed_is_authoritative() {
        let field = Field::new(4i32);
        field.attach();
        let log = recorder(&field);
        field.set_show_mixed_value(true);

        assert!(field.commit_user_value(4));
        assert!(!field.show_mixed_value());
        assert_eq!(*log.borrow(), vec![(4, 4)]);

        assert!(!field.commit_user_value(4));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_bubbles_to_parent_unless_stopped() {
        let parent = Field::new(Vec3::ZERO);
        let child = Field::new(0.0f32);
        child.attach();
        child.set_parent(&parent);

        let seen = Rc::new(Cell::new(0.0f32));
        let s = seen.clone();
        parent.node().add_bubble_handler(move |change| {
            if let Some((_, new)) = change.downcast::<f32>() {
                s.set(*new);
            }
        });

        child.set_value(2.5);
        assert_eq!(seen.get(), 2.5);

        child.subscribe(|e| e.stop_propagation());
        child.set_value(9.0);
        assert_eq!(seen.get(), 2.5);
    }

    #[test]
    fn test_stored_hooks_and_formatter() {
        let field = Field::new(0.5f32);
        field.set_formatter(|v| format!("{:.0}%", v * 100.0));
        assert_eq!(field.display_text(), "50%");

        let last = Rc::new(Cell::new(0.0f32));
        let l = last.clone();
        field.on_stored(move |v| l.set(*v));
        field.set_value_without_notify(0.25);
        assert_eq!(last.get(), 0.25);
        assert_eq!(field.display_text(), "25%");
    }

    #[test]
    fn test_stored_hook_sees_notify_request() {
        let field = Field::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        field.on_stored_with_notify(move |v, notify| s.borrow_mut().push((*v, notify)));

        field.set_value(1);
        field.set_value_without_notify(2);
        field.set_value(2);
        assert_eq!(*seen.borrow(), vec![(1, true), (2, false)]);
    }

    #[test]
    fn test_weak_handle() {
        let field = Field::new(1u8);
        let weak = field.downgrade();
        assert!(weak.upgrade().map(|f| f.ptr_eq(&field)).unwrap_or(false));
        drop(field);
        assert!(weak.upgrade().is_none());
    }
}
