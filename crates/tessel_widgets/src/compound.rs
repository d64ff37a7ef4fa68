//! Composite fields built from sub-fields
//!
//! [`Vector3Field`] is three float fields; [`BoundsField`] is two vector
//! fields. Each composite derives its value from the *current* values of its
//! children through a [`CompositeBinding`], attached or not, and pushes values
//! set from outside down to the children without notifying them.
//!
//! ```ignore
//! let v = Vector3Field::new("Position");
//! batch(|| {
//!     v.x().set_value(1.0);
//!     v.z().set_value(3.0);
//! });
//! // one ChangeEvent<Vec3>: (0, 0, 0) -> (1, 0, 3)
//! ```

use tessel_core::{
    Bounds, CompositeBinding, EventContext, EventResponse, Field, InputEvent, Vec3, WidgetConfig,
    WidgetId,
};

use crate::numeric::FloatField;
use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

/// Send an event to the focused child, or offer pointer input to every child
fn route(
    children: &mut [&mut dyn Widget],
    focused: &mut Option<usize>,
    event: &InputEvent,
    ctx: &mut EventContext<'_>,
) -> EventResponse {
    let focus_bound = matches!(
        event,
        InputEvent::KeyDown(_)
            | InputEvent::TextInput(_)
            | InputEvent::Navigation(_)
            | InputEvent::FocusIn
            | InputEvent::FocusOut
    );
    if focus_bound {
        let response = match focused.and_then(|i| children.get_mut(i)) {
            Some(child) => child.handle_event(event, ctx),
            None => EventResponse::Ignored,
        };
        if matches!(event, InputEvent::FocusOut) {
            *focused = None;
        }
        return response;
    }
    for (i, child) in children.iter_mut().enumerate() {
        if child.handle_event(event, ctx).is_handled() {
            if matches!(event, InputEvent::PointerDown(_)) {
                *focused = Some(i);
            }
            return EventResponse::Handled;
        }
    }
    EventResponse::Ignored
}

// ============================================================================
// Vector3Field
// ============================================================================

pub struct Vector3Field {
    id: WidgetId,
    label: String,
    field: Field<Vec3>,
    x: FloatField,
    y: FloatField,
    z: FloatField,
    focused: Option<usize>,
    binding: CompositeBinding<Vec3>,
}

impl Default for Vector3Field {
    fn default() -> Self {
        Self::new("")
    }
}

impl Vector3Field {
    pub fn new(label: impl Into<String>) -> Self {
        let field = Field::new(Vec3::ZERO);
        let (x, y, z) = (FloatField::new("X"), FloatField::new("Y"), FloatField::new("Z"));

        let (wx, wy, wz) = (x.field().downgrade(), y.field().downgrade(), z.field().downgrade());
        let mut binding = CompositeBinding::new(&field, move || {
            Some(Vec3::new(
                wx.upgrade()?.value(),
                wy.upgrade()?.value(),
                wz.upgrade()?.value(),
            ))
        });
        binding.watch(x.field());
        binding.watch(y.field());
        binding.watch(z.field());

        let (wx, wy, wz) = (x.field().downgrade(), y.field().downgrade(), z.field().downgrade());
        binding.push_down(move |v: &Vec3| {
            for (child, component) in [(&wx, v.x), (&wy, v.y), (&wz, v.z)] {
                if let Some(child) = child.upgrade() {
                    child.set_value_without_notify(component);
                }
            }
        });

        Self {
            id: WidgetId::next(),
            label: label.into(),
            field,
            x,
            y,
            z,
            focused: None,
            binding,
        }
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self.x = self.x.with_config(config);
        self.y = self.y.with_config(config);
        self.z = self.z.with_config(config);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn x(&self) -> &FloatField {
        &self.x
    }

    pub fn y(&self) -> &FloatField {
        &self.y
    }

    pub fn z(&self) -> &FloatField {
        &self.z
    }

    /// Mutable access to a component by index (0 = x)
    pub fn component_mut(&mut self, index: usize) -> Option<&mut FloatField> {
        match index {
            0 => Some(&mut self.x),
            1 => Some(&mut self.y),
            2 => Some(&mut self.z),
            _ => None,
        }
    }

    /// Route keyboard and text input to a component
    pub fn focus_component(&mut self, index: usize) {
        self.focused = (index < 3).then_some(index);
    }

    /// Number of sub-fields feeding this composite
    pub fn watched_count(&self) -> usize {
        self.binding.watched().len()
    }
}

impl Widget for Vector3Field {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        let mut children: [&mut dyn Widget; 3] = [&mut self.x, &mut self.y, &mut self.z];
        route(&mut children, &mut self.focused, event, ctx)
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
        self.x.set_attached(attached);
        self.y.set_attached(attached);
        self.z.set_attached(attached);
    }
}

impl ValueWidget for Vector3Field {
    type Value = Vec3;

    fn field(&self) -> &Field<Vec3> {
        &self.field
    }

    fn set_show_mixed_value(&self, mixed: bool) {
        self.field.set_show_mixed_value(mixed);
        for child in [&self.x, &self.y, &self.z] {
            child.set_show_mixed_value(mixed);
        }
    }
}

// ============================================================================
// BoundsField
// ============================================================================

pub struct BoundsField {
    id: WidgetId,
    label: String,
    field: Field<Bounds>,
    center: Vector3Field,
    extents: Vector3Field,
    focused: Option<usize>,
    binding: CompositeBinding<Bounds>,
}

impl Default for BoundsField {
    fn default() -> Self {
        Self::new("")
    }
}

impl BoundsField {
    pub fn new(label: impl Into<String>) -> Self {
        let field = Field::new(Bounds::new(Vec3::ZERO, Vec3::ZERO));
        let center = Vector3Field::new("Center");
        let extents = Vector3Field::new("Extents");

        let (wc, we) = (center.field().downgrade(), extents.field().downgrade());
        let mut binding = CompositeBinding::new(&field, move || {
            Some(Bounds::new(wc.upgrade()?.value(), we.upgrade()?.value()))
        });
        binding.watch(center.field());
        binding.watch(extents.field());

        let (wc, we) = (center.field().downgrade(), extents.field().downgrade());
        binding.push_down(move |b: &Bounds| {
            if let Some(center) = wc.upgrade() {
                center.set_value_without_notify(b.center);
            }
            if let Some(extents) = we.upgrade() {
                extents.set_value_without_notify(b.extents);
            }
        });

        Self {
            id: WidgetId::next(),
            label: label.into(),
            field,
            center,
            extents,
            focused: None,
            binding,
        }
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self.center = self.center.with_config(config);
        self.extents = self.extents.with_config(config);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn center(&self) -> &Vector3Field {
        &self.center
    }

    pub fn extents(&self) -> &Vector3Field {
        &self.extents
    }

    pub fn center_mut(&mut self) -> &mut Vector3Field {
        &mut self.center
    }

    pub fn extents_mut(&mut self) -> &mut Vector3Field {
        &mut self.extents
    }

    /// Route keyboard input to the center (0) or extents (1) vector
    pub fn focus_part(&mut self, index: usize) {
        self.focused = (index < 2).then_some(index);
    }

    pub fn watched_count(&self) -> usize {
        self.binding.watched().len()
    }
}

impl Widget for BoundsField {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        let mut children: [&mut dyn Widget; 2] = [&mut self.center, &mut self.extents];
        route(&mut children, &mut self.focused, event, ctx)
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
        self.center.set_attached(attached);
        self.extents.set_attached(attached);
    }
}

impl ValueWidget for BoundsField {
    type Value = Bounds;

    fn field(&self) -> &Field<Bounds> {
        &self.field
    }

    fn set_show_mixed_value(&self, mixed: bool) {
        self.field.set_show_mixed_value(mixed);
        self.center.set_show_mixed_value(mixed);
        self.extents.set_show_mixed_value(mixed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tessel_core::{batch, PointerCapture, TimerScheduler};

    fn recorder<T: Clone + 'static>(
        log: &Rc<RefCell<Vec<(T, T)>>>,
    ) -> impl Fn(&mut tessel_core::ChangeEvent<T>) + 'static {
        let log = log.clone();
        move |e| {
            log.borrow_mut()
                .push((e.previous_value().clone(), e.new_value().clone()))
        }
    }

    #[test]
    fn test_child_change_derives_parent() {
        let mut v = Vector3Field::new("Position");
        v.set_attached(true);
        let log = Rc::new(RefCell::new(Vec::new()));
        v.subscribe(recorder(&log));

        v.y().set_value(2.0);
        assert_eq!(v.value(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(v.watched_count(), 3);
    }

    #[test]
    fn test_detached_child_change_derives_parent() {
        let v = Vector3Field::new("Position");
        v.x().set_value(1.0);
        assert_eq!(v.value(), Vec3::new(1.0, 0.0, 0.0));

        let b = BoundsField::new("Bounds");
        b.extents().z().set_value(4.0);
        assert_eq!(b.value().extents, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(b.extents().value(), Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_bounds_value_pushes_through_nested_vectors() {
        let mut b = BoundsField::new("Bounds");
        b.set_attached(true);
        let log = Rc::new(RefCell::new(Vec::new()));
        b.subscribe(recorder(&log));

        let value = Bounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        b.set_value(value);
        assert_eq!(b.center().y().value(), 2.0);
        assert_eq!(b.extents().z().value(), 6.0);
        assert_eq!(b.value(), value);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_batched_children_notify_once() {
        let mut v = Vector3Field::new("Position");
        v.set_attached(true);
        let log = Rc::new(RefCell::new(Vec::new()));
        v.subscribe(recorder(&log));

        batch(|| {
            v.x().set_value(1.0);
            v.z().set_value(3.0);
        });
        assert_eq!(
            *log.borrow(),
            vec![(Vec3::ZERO, Vec3::new(1.0, 0.0, 3.0))]
        );
    }

    #[test]
    fn test_parent_value_pushes_down_silently() {
        let mut v = Vector3Field::new("Scale");
        v.set_attached(true);
        let child_log = Rc::new(RefCell::new(Vec::new()));
        v.x().subscribe(recorder(&child_log));

        v.set_value(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(v.x().value(), 4.0);
        assert_eq!(v.z().text(), "6");
        assert!(child_log.borrow().is_empty());
    }

    #[test]
    fn test_bounds_coalesces_nested_composites() {
        let mut b = BoundsField::new("Bounds");
        b.set_attached(true);
        let log = Rc::new(RefCell::new(Vec::new()));
        b.subscribe(recorder(&log));

        batch(|| {
            b.center().x().set_value(1.0);
            b.extents().y().set_value(2.0);
        });
        let expected = Bounds::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(b.value(), expected);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(b.watched_count(), 2);
    }

    #[test]
    fn test_focused_component_receives_text() {
        let mut v = Vector3Field::new("Position");
        v.set_attached(true);
        v.focus_component(1);
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        v.handle_event(&InputEvent::FocusIn, &mut ctx);
        v.handle_event(&InputEvent::TextInput("7".into()), &mut ctx);
        v.handle_event(&InputEvent::FocusOut, &mut ctx);
        assert_eq!(v.value(), Vec3::new(0.0, 7.0, 0.0));
    }

    #[test]
    fn test_mixed_reaches_children() {
        let v = Vector3Field::new("Position");
        v.set_show_mixed_value(true);
        assert!(v.x().show_mixed_value());
        assert_eq!(v.y().text(), "\u{2014}");
    }
}
