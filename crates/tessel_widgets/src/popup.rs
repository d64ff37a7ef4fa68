//! Popup fields: pick one value from a list of choices
//!
//! Pressing the input schedules the menu after
//! [`TimingConfig::popup_open_delay_ms`](tessel_core::TimingConfig), so a
//! press that turns into a drag can be told apart from a click. Releasing the
//! pointer before the delay elapses opens the menu at once. The host menu
//! reports the pick through [`PopupField::select_menu_item`].
//!
//! ```text
//!            pointer down              timer / pointer up
//!  Closed ─────────────────▶ Pending ─────────────────────▶ Open
//!    ▲  │                                                    │
//!    │  └───────────────── submit ───────────────────────────┤
//!    └──────────────── select_menu_item / close_menu ◀────────┘
//! ```

use std::rc::Rc;

use tessel_core::{
    EventContext, EventResponse, Field, FieldValue, InputEvent, MenuItem, NavigationEvent,
    PointerId, Rect, TimerId, TimingConfig, WidgetConfig, WidgetId,
};

use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

type Formatter<T> = Rc<dyn Fn(&T) -> String>;

/// Menu lifecycle of a popup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    /// Pointer pressed; the menu opens when the timer fires
    Pending { pointer: PointerId, timer: TimerId },
    Open,
}

/// Popup over a list of `T`
pub struct PopupField<T: FieldValue + Default> {
    id: WidgetId,
    label: String,
    field: Field<T>,
    choices: Vec<T>,
    format_list_item: Option<Formatter<T>>,
    input_rect: Rect,
    state: PopupState,
    timing: TimingConfig,
}

/// Popup over strings
pub type DropdownField = PopupField<String>;

impl<T: FieldValue + Default> PopupField<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: WidgetId::next(),
            label: label.into(),
            field: Field::new(T::default()),
            choices: Vec::new(),
            format_list_item: None,
            input_rect: Rect::ZERO,
            state: PopupState::Closed,
            timing: TimingConfig::default(),
        }
    }

    /// Popup over `choices`, selecting `default_index` if it is in range
    pub fn with_choices(label: impl Into<String>, choices: Vec<T>, default_index: usize) -> Self {
        let mut popup = Self::new(label);
        popup.choices = choices;
        if let Some(initial) = popup.choices.get(default_index) {
            popup.field.set_value_without_notify(initial.clone());
        }
        popup
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self.timing = config.timing.clone();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn choices(&self) -> &[T] {
        &self.choices
    }

    pub fn set_choices(&mut self, choices: Vec<T>) {
        self.choices = choices;
        self.field.refresh_display();
    }

    /// Position of the current value in the choices
    pub fn index(&self) -> Option<usize> {
        self.field
            .with_value(|value| self.choices.iter().position(|c| c.same_value(value)))
    }

    /// Select by position; `None` or an out-of-range index selects the default value
    pub fn set_index(&self, index: Option<usize>) -> bool {
        if index == self.index() {
            return false;
        }
        let value = index
            .and_then(|i| self.choices.get(i).cloned())
            .unwrap_or_default();
        self.field.set_value(value)
    }

    /// Formatter for the text shown in the input
    pub fn set_format_selected_value(&self, format: impl Fn(&T) -> String + 'static) {
        self.field.set_formatter(format);
    }

    /// Formatter for menu entries
    pub fn set_format_list_item(&mut self, format: impl Fn(&T) -> String + 'static) {
        self.format_list_item = Some(Rc::new(format));
    }

    /// Text shown in the input, or the mixed marker
    pub fn text(&self) -> String {
        self.field.display_text()
    }

    pub fn set_input_rect(&mut self, rect: Rect) {
        self.input_rect = rect;
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PopupState::Open
    }

    fn list_label(&self, choice: &T) -> String {
        match &self.format_list_item {
            Some(format) => format(choice),
            None => choice.display(),
        }
    }

    /// Describe the choices to the host menu and drop it down
    fn open(&mut self, ctx: &mut EventContext<'_>) {
        let Some(menu) = ctx.menu.as_mut() else {
            tracing::warn!(widget = self.id.raw(), "no menu host; popup stays closed");
            self.state = PopupState::Closed;
            return;
        };
        let mixed = self.field.show_mixed_value();
        let current = self.field.value();
        menu.clear();
        for (index, choice) in self.choices.iter().enumerate() {
            menu.add_item(MenuItem::Item {
                label: self.list_label(choice),
                checked: !mixed && choice.same_value(&current),
                index,
            });
        }
        menu.drop_down(self.input_rect, self.id);
        self.state = PopupState::Open;
        tracing::debug!(widget = self.id.raw(), choices = self.choices.len(), "popup opened");
    }

    /// Menu pick reported by the host
    ///
    /// Returns `true` if the value changed.
    pub fn select_menu_item(&mut self, index: usize) -> bool {
        self.state = PopupState::Closed;
        match self.choices.get(index) {
            Some(choice) => self.field.commit_user_value(choice.clone()),
            None => {
                tracing::warn!(widget = self.id.raw(), index, "menu pick out of range");
                false
            }
        }
    }

    /// Menu dismissed without a pick
    pub fn close_menu(&mut self) {
        self.state = PopupState::Closed;
    }
}

impl<T: FieldValue + Default> Widget for PopupField<T> {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match (event, self.state) {
            (InputEvent::PointerDown(e), PopupState::Closed)
                if e.is_primary() && self.input_rect.contains(e.position) =>
            {
                let timer = ctx
                    .scheduler
                    .schedule_once(self.id, self.timing.popup_open_delay_ms);
                self.state = PopupState::Pending {
                    pointer: e.pointer_id,
                    timer,
                };
                EventResponse::Handled
            }
            (InputEvent::PointerUp(e), PopupState::Pending { pointer, timer })
                if e.pointer_id == pointer =>
            {
                ctx.scheduler.cancel(timer);
                self.open(ctx);
                EventResponse::Handled
            }
            (InputEvent::Timer(id), PopupState::Pending { timer, .. }) if *id == timer => {
                self.open(ctx);
                EventResponse::Handled
            }
            (InputEvent::PointerCaptureLost(p), PopupState::Pending { pointer, timer })
                if *p == pointer =>
            {
                ctx.scheduler.cancel(timer);
                self.state = PopupState::Closed;
                EventResponse::Handled
            }
            (InputEvent::Navigation(NavigationEvent::Submit), PopupState::Closed) => {
                self.open(ctx);
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl<T: FieldValue + Default> ValueWidget for PopupField<T> {
    type Value = T;

    fn field(&self) -> &Field<T> {
        &self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tessel_core::{Point, PointerCapture, PointerEvent, RecordingMenu, TimerScheduler};

    fn dropdown() -> DropdownField {
        let mut d = DropdownField::with_choices(
            "Quality",
            vec!["Low".to_string(), "Medium".to_string(), "High".to_string()],
            1,
        );
        d.set_input_rect(Rect::new(0.0, 0.0, 100.0, 20.0));
        d.set_attached(true);
        d
    }

    struct Host {
        capture: PointerCapture,
        scheduler: TimerScheduler,
        menu: RecordingMenu,
    }

    impl Host {
        fn new() -> Self {
            Self {
                capture: PointerCapture::new(),
                scheduler: TimerScheduler::new(),
                menu: RecordingMenu::new(),
            }
        }

        fn send(&mut self, d: &mut DropdownField, event: InputEvent) -> EventResponse {
            let mut ctx =
                EventContext::new(&mut self.capture, &mut self.scheduler).with_menu(&mut self.menu);
            d.handle_event(&event, &mut ctx)
        }

        fn advance(&mut self, d: &mut DropdownField, ms: u64) {
            for fired in self.scheduler.advance(ms) {
                self.send(d, InputEvent::Timer(fired.timer));
            }
        }
    }

    fn down() -> InputEvent {
        InputEvent::PointerDown(PointerEvent::primary(Point::new(10.0, 10.0)))
    }

    fn up() -> InputEvent {
        InputEvent::PointerUp(PointerEvent::primary(Point::new(10.0, 10.0)))
    }

    #[test]
    fn test_default_index_and_text() {
        let d = dropdown();
        assert_eq!(d.index(), Some(1));
        assert_eq!(d.text(), "Medium");
    }

    #[test]
    fn test_opens_after_delay() {
        let mut host = Host::new();
        let mut d = dropdown();
        host.send(&mut d, down());
        assert!(matches!(d.state(), PopupState::Pending { .. }));
        host.advance(&mut d, 99);
        assert_eq!(host.menu.drop_down_count, 0);
        host.advance(&mut d, 1);
        assert!(d.is_open());
        assert_eq!(host.menu.labels(), vec!["Low", "Medium", "High"]);
        assert_eq!(host.menu.checked_index(), Some(1));

        // The release after the menu opened does nothing more
        host.send(&mut d, up());
        assert_eq!(host.menu.drop_down_count, 1);
    }

    #[test]
    fn test_pointer_up_opens_immediately() {
        let mut host = Host::new();
        let mut d = dropdown();
        host.send(&mut d, down());
        host.send(&mut d, up());
        assert!(d.is_open());
        assert!(host.scheduler.is_empty());
        host.advance(&mut d, 500);
        assert_eq!(host.menu.drop_down_count, 1);
    }

    #[test]
    fn test_selection_goes_through_setter() {
        let mut host = Host::new();
        let mut d = dropdown();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        d.subscribe(move |e| l.borrow_mut().push((e.previous_value().clone(), e.new_value().clone())));

        host.send(&mut d, InputEvent::Navigation(NavigationEvent::Submit));
        assert!(d.is_open());
        assert!(d.select_menu_item(2));
        assert_eq!(d.state(), PopupState::Closed);
        assert_eq!(d.value(), "High");
        assert_eq!(*log.borrow(), vec![("Medium".to_string(), "High".to_string())]);
        assert!(!d.select_menu_item(9));
    }

    #[test]
    fn test_formatters_and_mixed() {
        let mut host = Host::new();
        let mut d = dropdown();
        d.set_format_selected_value(|v: &String| v.to_uppercase());
        d.set_format_list_item(|v: &String| format!("{v} quality"));
        assert_eq!(d.text(), "MEDIUM");

        d.set_show_mixed_value(true);
        assert_eq!(d.text(), "\u{2014}");
        host.send(&mut d, InputEvent::Navigation(NavigationEvent::Submit));
        assert_eq!(host.menu.labels()[0], "Low quality");
        assert_eq!(host.menu.checked_index(), None);

        d.select_menu_item(1);
        assert!(!d.show_mixed_value());
        assert_eq!(d.text(), "MEDIUM");
    }

    #[test]
    fn test_set_index_out_of_range_selects_default() {
        let d = dropdown();
        assert!(d.set_index(Some(0)));
        assert_eq!(d.value(), "Low");
        d.set_index(Some(7));
        assert_eq!(d.value(), "");
        assert_eq!(d.index(), None);
    }

    #[test]
    fn test_without_menu_host_stays_closed() {
        let mut d = dropdown();
        let mut capture = PointerCapture::new();
        let mut scheduler = TimerScheduler::new();
        let mut ctx = EventContext::new(&mut capture, &mut scheduler);
        d.handle_event(&InputEvent::Navigation(NavigationEvent::Submit), &mut ctx);
        assert_eq!(d.state(), PopupState::Closed);
    }
}
