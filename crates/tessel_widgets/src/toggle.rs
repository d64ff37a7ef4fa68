//! Toggle for boolean values
//!
//! A labeled checkbox with optional inline text. The value flips when the
//! primary button is released over the input region after being pressed
//! there, or on navigation submit.
//!
//! # Example
//!
//! ```ignore
//! let mut enabled = Toggle::new("Enabled");
//! enabled.set_input_rect(Rect::new(0.0, 0.0, 16.0, 16.0));
//! enabled.set_attached(true);
//! enabled.subscribe(|e| println!("{} -> {}", e.previous_value(), e.new_value()));
//! ```

use tessel_core::{
    EventContext, EventResponse, Field, InputEvent, InteractionEvent, InteractionState,
    NavigationEvent, PointerId, Rect, StateTransitions, WidgetConfig, WidgetId,
};

use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

/// What the checkmark shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckmarkVisual {
    Unchecked,
    Checked,
    /// Mixed value indicator; the stored value is hidden
    Mixed,
}

/// Boolean toggle widget
pub struct Toggle {
    id: WidgetId,
    label: String,
    text: Option<String>,
    field: Field<bool>,
    input_rect: Rect,
    interaction: InteractionState,
    /// Pointer that pressed the toggle, while captured
    pressed_pointer: Option<PointerId>,
}

impl Toggle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: WidgetId::next(),
            label: label.into(),
            text: None,
            field: Field::new(false),
            input_rect: Rect::ZERO,
            interaction: InteractionState::Idle,
            pressed_pointer: None,
        }
    }

    pub fn with_config(self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Inline text shown next to the checkmark
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// Region that reacts to clicks, in local coordinates
    pub fn set_input_rect(&mut self, rect: Rect) {
        self.input_rect = rect;
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn checkmark(&self) -> CheckmarkVisual {
        if self.field.show_mixed_value() {
            CheckmarkVisual::Mixed
        } else if self.field.value() {
            CheckmarkVisual::Checked
        } else {
            CheckmarkVisual::Unchecked
        }
    }

    /// Flip the value as a user action
    ///
    /// A mixed toggle resolves to `true`.
    pub fn toggle(&mut self) {
        let next = if self.field.show_mixed_value() {
            true
        } else {
            !self.field.value()
        };
        tracing::debug!(widget = self.id.raw(), value = next, "toggle clicked");
        self.field.commit_user_value(next);
    }

    fn end_press(&mut self, ctx: &mut EventContext<'_>) {
        if let Some(pointer) = self.pressed_pointer.take() {
            ctx.capture.release(pointer, self.id);
        }
    }
}

impl Widget for Toggle {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.input_rect.contains(e.position) => {
                if self.pressed_pointer.is_some() || !ctx.capture.capture(e.pointer_id, self.id) {
                    return EventResponse::Ignored;
                }
                self.pressed_pointer = Some(e.pointer_id);
                self.interaction.apply(InteractionEvent::PointerDown);
                EventResponse::Handled
            }
            InputEvent::PointerMove(e) if self.pressed_pointer == Some(e.pointer_id) => {
                let over = self.input_rect.contains(e.position);
                self.interaction.apply(if over {
                    InteractionEvent::PointerEnter
                } else {
                    InteractionEvent::PointerLeave
                });
                EventResponse::Handled
            }
            InputEvent::PointerUp(e) if self.pressed_pointer == Some(e.pointer_id) => {
                if !e.is_primary() {
                    return EventResponse::Ignored;
                }
                let captured = ctx.capture.has_capture(e.pointer_id, self.id);
                self.end_press(ctx);
                self.interaction.apply(InteractionEvent::PointerUp);
                if captured && self.input_rect.contains(e.position) {
                    self.toggle();
                }
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer) if self.pressed_pointer == Some(*pointer) => {
                self.pressed_pointer = None;
                self.interaction.apply(InteractionEvent::CaptureLost);
                EventResponse::Handled
            }
            InputEvent::Navigation(NavigationEvent::Submit) => {
                self.toggle();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl ValueWidget for Toggle {
    type Value = bool;

    fn field(&self) -> &Field<bool> {
        &self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tessel_core::{MouseButton, Point, PointerCapture, PointerEvent, TimerScheduler};

    fn toggle() -> Toggle {
        let mut t = Toggle::new("Enabled");
        t.set_input_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        t.set_attached(true);
        t
    }

    fn click(t: &mut Toggle, capture: &mut PointerCapture, at: Point, release_at: Point) {
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(capture, &mut scheduler);
        t.handle_event(&InputEvent::PointerDown(PointerEvent::primary(at)), &mut ctx);
        t.handle_event(&InputEvent::PointerUp(PointerEvent::primary(release_at)), &mut ctx);
    }

    #[test]
    fn test_release_outside_does_not_toggle() {
        let mut t = toggle();
        let mut capture = PointerCapture::new();
        click(&mut t, &mut capture, Point::new(5.0, 5.0), Point::new(50.0, 5.0));
        assert!(!t.value());
        assert_eq!(capture.owner(0), None);
    }

    #[test]
    fn test_right_button_is_ignored() {
        let mut t = toggle();
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        let down = PointerEvent::primary(Point::new(5.0, 5.0)).with_button(MouseButton::Right);
        let response = t.handle_event(&InputEvent::PointerDown(down), &mut ctx);
        assert_eq!(response, EventResponse::Ignored);
    }

    #[test]
    fn test_capture_lost_cancels_click() {
        let mut t = toggle();
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let at = Point::new(5.0, 5.0);
        {
            let mut ctx = EventContext::new(&mut capture, &mut scheduler);
            t.handle_event(&InputEvent::PointerDown(PointerEvent::primary(at)), &mut ctx);
        }
        capture.force_release(0);
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        t.handle_event(&InputEvent::PointerCaptureLost(0), &mut ctx);
        t.handle_event(&InputEvent::PointerUp(PointerEvent::primary(at)), &mut ctx);
        assert!(!t.value());
    }

    #[test]
    fn test_submit_and_mixed() {
        let mut t = toggle();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        t.subscribe(move |e| l.borrow_mut().push(*e.new_value()));

        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        t.handle_event(&InputEvent::Navigation(NavigationEvent::Submit), &mut ctx);
        assert_eq!(t.checkmark(), CheckmarkVisual::Checked);

        t.set_show_mixed_value(true);
        assert_eq!(t.checkmark(), CheckmarkVisual::Mixed);
        assert!(t.value());
        t.toggle();
        assert_eq!(t.checkmark(), CheckmarkVisual::Checked);
        assert_eq!(*log.borrow(), vec![true, true]);
    }
}
