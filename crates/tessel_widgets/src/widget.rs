//! Widget traits shared by every control
//!
//! A widget receives typed input through [`Widget::handle_event`] and exposes
//! its bound value through [`ValueWidget`]. All value mutation goes through
//! the widget's [`Field`], so programmatic and interactive changes notify
//! observers the same way.
//!
//! Hosts deliver events through [`dispatch`], which makes each event one
//! turn: composite fields changed several times while handling it notify
//! once.

use tessel_core::{
    batch, ChangeEvent, EventContext, EventResponse, Field, FieldConfig, FieldValue, InputEvent,
    NotifyPolicy, ObserverId, WidgetId,
};

/// Anything that reacts to host input
pub trait Widget {
    /// Owner id used for pointer capture and timers
    fn id(&self) -> WidgetId;

    /// Handle one input event
    ///
    /// Calling this directly does not open a turn; changes to several
    /// sub-fields of a composite notify it once each unless the caller wraps
    /// them in [`batch`](tessel_core::batch). Hosts use [`dispatch`].
    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse;

    /// The widget joined or left a live display tree
    ///
    /// Fields of a detached widget store values without notifying.
    fn set_attached(&mut self, attached: bool);
}

/// Deliver one input event to `widget` as a single turn
pub fn dispatch(
    widget: &mut dyn Widget,
    event: &InputEvent,
    ctx: &mut EventContext<'_>,
) -> EventResponse {
    batch(|| widget.handle_event(event, ctx))
}

/// A widget bound to one typed value
pub trait ValueWidget: Widget {
    type Value: FieldValue;

    fn field(&self) -> &Field<Self::Value>;

    fn value(&self) -> Self::Value {
        self.field().value()
    }

    /// Set the value, notifying observers if it changed
    fn set_value(&self, value: Self::Value) -> bool {
        self.field().set_value(value)
    }

    fn set_value_without_notify(&self, value: Self::Value) {
        self.field().set_value_without_notify(value)
    }

    fn subscribe(&self, observer: impl Fn(&mut ChangeEvent<Self::Value>) + 'static) -> ObserverId
    where
        Self: Sized,
    {
        self.field().subscribe(observer)
    }

    fn unsubscribe(&self, id: ObserverId) -> bool {
        self.field().unsubscribe(id)
    }

    fn show_mixed_value(&self) -> bool {
        self.field().show_mixed_value()
    }

    fn set_show_mixed_value(&self, mixed: bool) {
        self.field().set_show_mixed_value(mixed)
    }
}

/// Apply the `[field]` configuration section to a field
pub fn apply_field_config<T: FieldValue>(field: &Field<T>, config: &FieldConfig) {
    field.set_mixed_marker(config.mixed_value_marker.clone());
    field.set_notify_policy(if config.notify_when_detached {
        NotifyPolicy::Always
    } else {
        NotifyPolicy::WhenAttached
    });
}

/// Attach or detach a field
pub(crate) fn set_field_attached<T: FieldValue>(field: &Field<T>, attached: bool) {
    if attached {
        field.attach();
    } else {
        field.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::Vector3Field;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tessel_core::{NavigationEvent, PointerCapture, TimerScheduler, Vec3};

    /// Moves a vector to the diagonal on submit, one component at a time
    struct Diagonal {
        id: WidgetId,
        vector: Vector3Field,
    }

    impl Widget for Diagonal {
        fn id(&self) -> WidgetId {
            self.id
        }

        fn handle_event(
            &mut self,
            event: &InputEvent,
            _ctx: &mut EventContext<'_>,
        ) -> EventResponse {
            if !matches!(event, InputEvent::Navigation(NavigationEvent::Submit)) {
                return EventResponse::Ignored;
            }
            self.vector.x().set_value(1.0);
            self.vector.y().set_value(1.0);
            self.vector.z().set_value(1.0);
            EventResponse::Handled
        }

        fn set_attached(&mut self, attached: bool) {
            self.vector.set_attached(attached);
        }
    }

    fn diagonal() -> (Diagonal, Rc<RefCell<Vec<Vec3>>>) {
        let mut widget = Diagonal {
            id: WidgetId::next(),
            vector: Vector3Field::new("Position"),
        };
        widget.set_attached(true);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        widget.vector.subscribe(move |e| l.borrow_mut().push(*e.new_value()));
        (widget, log)
    }

    #[test]
    fn test_dispatch_coalesces_one_event() {
        let (mut widget, log) = diagonal();
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);

        let submit = InputEvent::Navigation(NavigationEvent::Submit);
        let response = dispatch(&mut widget, &submit, &mut ctx);
        assert!(response.is_handled());
        assert_eq!(*log.borrow(), vec![Vec3::new(1.0, 1.0, 1.0)]);
    }

    #[test]
    fn test_direct_handle_event_notifies_per_component() {
        let (mut widget, log) = diagonal();
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);

        widget.handle_event(&InputEvent::Navigation(NavigationEvent::Submit), &mut ctx);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(widget.vector.value(), Vec3::new(1.0, 1.0, 1.0));
    }
}
