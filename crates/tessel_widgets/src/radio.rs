//! Radio buttons and exclusive groups
//!
//! A [`RadioButton`] only ever turns itself on; turning the others off is the
//! job of the [`RadioButtonGroup`] that owns it. The group's value is the index
//! of the selected option, or `None`.

use std::cell::RefCell;
use std::rc::Rc;

use tessel_core::{
    EventContext, EventResponse, Field, InputEvent, InteractionEvent, InteractionState,
    NavigationDirection, NavigationEvent, PointerId, Rect, StateTransitions, WidgetConfig,
    WidgetId,
};

use crate::factory::AnyWidget;
use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

// ============================================================================
// RadioButton
// ============================================================================

pub struct RadioButton {
    id: WidgetId,
    label: String,
    text: Option<String>,
    field: Field<bool>,
    input_rect: Rect,
    interaction: InteractionState,
    pressed_pointer: Option<PointerId>,
}

impl RadioButton {
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

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn set_input_rect(&mut self, rect: Rect) {
        self.input_rect = rect;
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    /// Turn on as a user action
    pub fn select(&mut self) {
        self.field.commit_user_value(true);
    }
}

impl Widget for RadioButton {
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
            InputEvent::PointerUp(e) if self.pressed_pointer == Some(e.pointer_id) => {
                let captured = ctx.capture.has_capture(e.pointer_id, self.id);
                ctx.capture.release(e.pointer_id, self.id);
                self.pressed_pointer = None;
                self.interaction.apply(InteractionEvent::PointerUp);
                if captured && self.input_rect.contains(e.position) {
                    self.select();
                }
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer) if self.pressed_pointer == Some(*pointer) => {
                self.pressed_pointer = None;
                self.interaction.apply(InteractionEvent::CaptureLost);
                EventResponse::Handled
            }
            InputEvent::Navigation(NavigationEvent::Submit) => {
                self.select();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl ValueWidget for RadioButton {
    type Value = bool;

    fn field(&self) -> &Field<bool> {
        &self.field
    }
}

// ============================================================================
// RadioButtonGroup
// ============================================================================

type OptionFields = Rc<RefCell<Vec<Field<bool>>>>;

pub struct RadioButtonGroup {
    id: WidgetId,
    label: String,
    field: Field<Option<usize>>,
    options: Vec<RadioButton>,
    /// Shared with the field hooks that keep options in sync
    option_fields: OptionFields,
    /// Options were added one by one rather than generated from choices
    explicit_options: bool,
    attached: bool,
}

impl Default for RadioButtonGroup {
    fn default() -> Self {
        Self::new("")
    }
}

impl RadioButtonGroup {
    pub fn new(label: impl Into<String>) -> Self {
        let field = Field::new(None);
        let option_fields: OptionFields = Rc::default();

        let fields = option_fields.clone();
        field.set_coercion(move |index: Option<usize>| {
            index.filter(|&i| i < fields.borrow().len())
        });
        let fields = option_fields.clone();
        field.on_stored(move |index: &Option<usize>| {
            for (i, option) in fields.borrow().iter().enumerate() {
                option.set_value_without_notify(*index == Some(i));
            }
        });

        Self {
            id: WidgetId::next(),
            label: label.into(),
            field,
            options: Vec::new(),
            option_fields,
            explicit_options: false,
            attached: false,
        }
    }

    pub fn with_config(self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self
    }

    /// Group of buttons labeled by `choices`
    pub fn with_choices(label: impl Into<String>, choices: &[&str]) -> Self {
        let mut group = Self::new(label);
        group.set_choices(choices.iter().map(|c| c.to_string()));
        group
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Replace every option with one button per choice
    pub fn set_choices(&mut self, choices: impl IntoIterator<Item = String>) {
        self.options.clear();
        self.option_fields.borrow_mut().clear();
        for choice in choices {
            let mut option = RadioButton::new("");
            option.set_text(Some(choice));
            self.push_option(option);
        }
        self.explicit_options = false;
        self.field.recoerce();
    }

    /// Choice texts, in order
    pub fn choices(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.text().unwrap_or_default()).collect()
    }

    pub fn options(&self) -> &[RadioButton] {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut [RadioButton] {
        &mut self.options
    }

    /// Append a caller-built option
    pub fn add_option(&mut self, option: RadioButton) {
        self.explicit_options = true;
        self.push_option(option);
    }

    /// Whether options were added individually rather than from choices
    pub fn has_explicit_options(&self) -> bool {
        self.explicit_options
    }

    fn push_option(&mut self, mut option: RadioButton) {
        let index = self.options.len();
        let group = self.field.downgrade();
        // Stored rather than observed, so detached groups stay exclusive
        option.field.on_stored(move |on| {
            let Some(group) = group.upgrade() else {
                return;
            };
            if *on && (group.value() != Some(index) || group.show_mixed_value()) {
                group.commit_user_value(Some(index));
            }
        });
        option
            .field
            .set_value_without_notify(self.field.value() == Some(index));
        option.set_attached(self.attached);
        self.option_fields.borrow_mut().push(option.field.clone());
        self.options.push(option);
    }

    /// Register a child widget as an option
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a [`RadioButton`].
    pub fn register_option(&mut self, child: AnyWidget) {
        match child {
            AnyWidget::RadioButton(option) => self.add_option(option),
            other => panic!(
                "RadioButtonGroup only accepts RadioButton options, got {}",
                other.tag()
            ),
        }
    }

    fn select_relative(&mut self, forward: bool) {
        let count = self.options.len();
        if count == 0 {
            return;
        }
        let next = match (self.field.value(), forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        };
        self.field.commit_user_value(Some(next));
    }
}

impl Widget for RadioButtonGroup {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        if let InputEvent::Navigation(NavigationEvent::Move { direction, .. }) = event {
            let forward = match direction {
                NavigationDirection::Down | NavigationDirection::Right => true,
                NavigationDirection::Up | NavigationDirection::Left => false,
                _ => return EventResponse::Ignored,
            };
            self.select_relative(forward);
            return EventResponse::Handled;
        }
        if let InputEvent::Navigation(NavigationEvent::Submit) = event {
            return EventResponse::Ignored;
        }
        for option in &mut self.options {
            if option.handle_event(event, ctx).is_handled() {
                return EventResponse::Handled;
            }
        }
        EventResponse::Ignored
    }

    fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
        set_field_attached(&self.field, attached);
        for option in &mut self.options {
            option.set_attached(attached);
        }
    }
}

impl ValueWidget for RadioButtonGroup {
    type Value = Option<usize>;

    fn field(&self) -> &Field<Option<usize>> {
        &self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::Toggle;
    use tessel_core::{Modifiers, Point, PointerCapture, PointerEvent, TimerScheduler};

    fn group() -> RadioButtonGroup {
        let mut g = RadioButtonGroup::with_choices("Shape", &["Circle", "Square", "Triangle"]);
        for (i, option) in g.options_mut().iter_mut().enumerate() {
            option.set_input_rect(Rect::new(0.0, i as f32 * 20.0, 100.0, 20.0));
        }
        g.set_attached(true);
        g
    }

    fn send(g: &mut RadioButtonGroup, event: InputEvent) -> EventResponse {
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        g.handle_event(&event, &mut ctx)
    }

    fn click(g: &mut RadioButtonGroup, y: f32) {
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        let at = Point::new(10.0, y);
        g.handle_event(&InputEvent::PointerDown(PointerEvent::primary(at)), &mut ctx);
        g.handle_event(&InputEvent::PointerUp(PointerEvent::primary(at)), &mut ctx);
    }

    fn selected(g: &RadioButtonGroup) -> Vec<bool> {
        g.options().iter().map(|o| o.value()).collect()
    }

    #[test]
    fn test_click_selects_exclusively() {
        let mut g = group();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        g.subscribe(move |e| l.borrow_mut().push(*e.new_value()));

        click(&mut g, 25.0);
        assert_eq!(g.value(), Some(1));
        assert_eq!(selected(&g), vec![false, true, false]);
        click(&mut g, 45.0);
        assert_eq!(selected(&g), vec![false, false, true]);
        // Clicking the selected option again changes nothing
        click(&mut g, 45.0);
        assert_eq!(*log.borrow(), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_detached_group_stays_exclusive() {
        let mut g = RadioButtonGroup::with_choices("Shape", &["A", "B", "C"]);
        g.options_mut()[0].select();
        assert_eq!(g.value(), Some(0));
        g.options_mut()[1].select();
        assert_eq!(g.value(), Some(1));
        assert_eq!(selected(&g), vec![false, true, false]);
    }

    #[test]
    fn test_option_select_notifies_attached_group_once() {
        let mut g = group();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        g.subscribe(move |e| l.borrow_mut().push(*e.new_value()));

        g.options_mut()[2].select();
        g.options_mut()[2].select();
        assert_eq!(*log.borrow(), vec![Some(2)]);
        assert_eq!(selected(&g), vec![false, false, true]);
    }

    #[test]
    fn test_programmatic_value_updates_options() {
        let g = group();
        g.set_value(Some(0));
        assert_eq!(selected(&g), vec![true, false, false]);
        g.set_value(None);
        assert_eq!(selected(&g), vec![false, false, false]);
        g.set_value(Some(10));
        assert_eq!(g.value(), None);
    }

    #[test]
    fn test_arrow_navigation_wraps() {
        let mut g = group();
        let down = InputEvent::Navigation(NavigationEvent::Move {
            direction: NavigationDirection::Down,
            modifiers: Modifiers::NONE,
        });
        let up = InputEvent::Navigation(NavigationEvent::Move {
            direction: NavigationDirection::Up,
            modifiers: Modifiers::NONE,
        });
        send(&mut g, down.clone());
        assert_eq!(g.value(), Some(0));
        send(&mut g, up.clone());
        assert_eq!(g.value(), Some(2));
        send(&mut g, down);
        assert_eq!(g.value(), Some(0));
    }

    #[test]
    fn test_shrinking_choices_clears_selection() {
        let mut g = group();
        g.set_value(Some(2));
        g.set_choices(["A".to_string()]);
        assert_eq!(g.value(), None);
        assert_eq!(g.choices(), vec!["A"]);
    }

    #[test]
    #[should_panic(expected = "only accepts RadioButton")]
    fn test_registering_foreign_option_panics() {
        let mut g = group();
        g.register_option(AnyWidget::Toggle(Toggle::new("Nope")));
    }
}
