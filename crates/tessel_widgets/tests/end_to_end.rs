//! Scenarios exercising widgets the way a host drives them

use std::cell::RefCell;
use std::rc::Rc;

use tessel_core::{
    batch, ChangeEvent, EventContext, Field, FieldValue, InputEvent, KeyCode, KeyEvent, Orientation,
    NavigationEvent, Point, PointerCapture, PointerEvent, Rect, RecordingMenu, Size, TimerScheduler,
    Vec3, WidgetConfig,
};
use tessel_widgets::prelude::*;
use tessel_widgets::{parse_markup, write_markup, RepeatButton, Vector3Field};

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
            menu: RecordingMenu::default(),
        }
    }

    fn send(&mut self, widget: &mut dyn Widget, event: InputEvent) {
        let mut ctx =
            EventContext::new(&mut self.capture, &mut self.scheduler).with_menu(&mut self.menu);
        dispatch(widget, &event, &mut ctx);
    }

    fn advance(&mut self, widget: &mut dyn Widget, ms: u64) {
        for fired in self.scheduler.advance(ms) {
            self.send(widget, InputEvent::Timer(fired.timer));
        }
    }
}

type Log<T> = Rc<RefCell<Vec<(T, T)>>>;

fn record<T: FieldValue>(field: &Field<T>) -> Log<T> {
    let log: Log<T> = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    field.subscribe(move |e: &mut ChangeEvent<T>| {
        sink.borrow_mut()
            .push((e.previous_value().clone(), e.new_value().clone()))
    });
    log
}

#[test]
fn set_without_notify_is_silent_for_every_value_type() {
    for attached in [false, true] {
        let mut toggle = Toggle::new("Enabled");
        let mut float = FloatField::new("Scale");
        let mut dropdown =
            DropdownField::with_choices("Quality", vec!["Low".into(), "High".into()], 0);
        toggle.set_attached(attached);
        float.set_attached(attached);
        dropdown.set_attached(attached);
        let logs = (record(toggle.field()), record(float.field()), record(dropdown.field()));

        toggle.set_value_without_notify(true);
        toggle.set_value_without_notify(false);
        float.set_value_without_notify(2.5);
        dropdown.set_value_without_notify("High".into());

        assert!(logs.0.borrow().is_empty());
        assert!(logs.1.borrow().is_empty());
        assert!(logs.2.borrow().is_empty());
        assert_eq!(dropdown.index(), Some(1));
    }
}

#[test]
fn setting_the_same_value_twice_notifies_once() {
    let mut field = IntegerField::new("Count");
    field.set_attached(true);
    let log = record(field.field());
    assert!(field.set_value(7));
    assert!(!field.set_value(7));
    assert_eq!(*log.borrow(), vec![(0, 7)]);

    let mut float = FloatField::new("Scale");
    float.set_attached(true);
    let log = record(float.field());
    float.set_value(0.1 + 0.2);
    float.set_value(0.3);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn clicking_enabled_toggle_fires_one_change() {
    let mut toggle = Toggle::new("Enabled");
    toggle.set_input_rect(Rect::new(0.0, 0.0, 16.0, 16.0));
    toggle.set_attached(true);
    let log = record(toggle.field());

    let mut host = Host::new();
    let at = Point::new(8.0, 8.0);
    host.send(&mut toggle, InputEvent::PointerDown(PointerEvent::primary(at)));
    host.send(&mut toggle, InputEvent::PointerUp(PointerEvent::primary(at)));

    assert!(toggle.value());
    assert_eq!(*log.borrow(), vec![(false, true)]);
    assert_eq!(host.capture.owner(0), None);
}

#[test]
fn page_up_near_high_value_clamps() {
    let mut slider = Slider::new("Opacity", 0.0, 10.0);
    slider.set_page_size(1.0);
    slider.set_attached(true);
    slider.set_value(9.6);

    let mut host = Host::new();
    host.send(&mut slider, InputEvent::KeyDown(KeyEvent::new(KeyCode::PageUp)));
    assert_eq!(slider.value(), 10.0);
    host.send(&mut slider, InputEvent::KeyDown(KeyEvent::new(KeyCode::PageUp)));
    assert_eq!(slider.value(), 10.0);
}

#[test]
fn slider_increments_never_skip_or_overshoot() {
    let mut slider = Slider::new("Volume", 0.0, 100.0);
    slider.set_attached(true);
    let mut host = Host::new();
    let mut previous = slider.value();
    for _ in 0..150 {
        host.send(&mut slider, InputEvent::KeyDown(KeyEvent::new(KeyCode::ArrowRight)));
        let value = slider.value();
        assert!(value <= slider.high_value());
        if previous < slider.high_value() {
            assert_eq!(value, previous + 1.0);
        }
        previous = value;
    }
    assert_eq!(slider.value(), 100.0);
    for _ in 0..150 {
        host.send(&mut slider, InputEvent::KeyDown(KeyEvent::new(KeyCode::ArrowLeft)));
        assert!(slider.value() >= slider.low_value());
    }
    assert_eq!(slider.value(), 0.0);
}

#[test]
fn splitter_clamps_large_negative_delta() {
    let mut split = TwoPaneSplitView::new(0, 200.0, Orientation::Horizontal);
    split.set_min_dimensions(50.0, 100.0);
    split.set_container_size(Size::new(500.0, 300.0));
    split.apply_delta(-1000.0);
    assert_eq!(split.fixed_dimension(), 50.0);

    split.apply_delta(1000.0);
    assert_eq!(split.fixed_dimension(), 400.0);
}

#[test]
fn mixed_value_round_trip_restores_display_text() {
    let mut field = FloatField::new("Weight");
    field.set_attached(true);
    for text in ["", "1.5", "not a number"] {
        field.field().set_display_text(text);
        field.set_show_mixed_value(true);
        assert_ne!(field.field().display_text(), text);
        field.set_show_mixed_value(false);
        assert_eq!(field.field().display_text(), text);
    }
}

#[test]
fn composite_edits_in_one_turn_notify_once() {
    let mut position = Vector3Field::new("Position");
    position.set_attached(true);
    let log = record(position.field());

    batch(|| {
        position.x().set_value(1.0);
        position.y().set_value(-2.0);
    });

    assert_eq!(*log.borrow(), vec![(Vec3::ZERO, Vec3::new(1.0, -2.0, 0.0))]);
}

#[test]
fn detached_composite_reads_current_components() {
    let position = Vector3Field::new("Position");
    position.x().set_value(1.0);
    position.z().set_value_without_notify(3.0);
    assert_eq!(position.value(), Vec3::new(1.0, 0.0, 3.0));
}

#[test]
fn detached_radio_group_keeps_one_option_on() {
    let mut group = RadioButtonGroup::with_choices("Shape", &["Circle", "Square", "Triangle"]);
    let mut host = Host::new();
    for index in [0, 2] {
        host.send(
            &mut group.options_mut()[index],
            InputEvent::Navigation(NavigationEvent::Submit),
        );
    }
    assert_eq!(group.value(), Some(2));
    let on: Vec<bool> = group.options().iter().map(|o| o.value()).collect();
    assert_eq!(on, vec![false, false, true]);
}

#[test]
fn splitter_shrink_respects_margins() {
    let mut split = TwoPaneSplitView::new(0, 200.0, Orientation::Horizontal);
    split.set_min_dimensions(50.0, 100.0);
    split.set_margins(20.0);
    split.set_container_size(Size::new(500.0, 300.0));
    split.apply_delta(-1000.0);
    assert_eq!(split.fixed_dimension(), 70.0);
    split.apply_delta(1000.0);
    assert_eq!(split.fixed_dimension(), 380.0);
}

#[test]
fn dropdown_opens_menu_and_commits_choice() {
    let mut dropdown = DropdownField::with_choices(
        "Quality",
        vec!["Low".into(), "Medium".into(), "High".into()],
        0,
    );
    dropdown.set_input_rect(Rect::new(0.0, 0.0, 120.0, 20.0));
    dropdown.set_attached(true);
    let log = record(dropdown.field());

    let mut host = Host::new();
    host.send(&mut dropdown, InputEvent::Navigation(NavigationEvent::Submit));
    assert!(dropdown.is_open());
    assert_eq!(host.menu.labels(), vec!["Low", "Medium", "High"]);

    assert!(dropdown.select_menu_item(2));
    assert_eq!(dropdown.text(), "High");
    assert_eq!(*log.borrow(), vec![("Low".to_string(), "High".to_string())]);
    assert!(!dropdown.is_open());
}

#[test]
fn markup_round_trip_preserves_widgets() {
    let source = r#"<?xml version="1.0"?>
<!-- settings -->
<Toggle label="Enabled" value="true"/>
<Slider label="Volume" high-value="100" page-size="5" value="40"/>
<RadioButtonGroup label="Shape" value="1">
    <RadioButton text="Circle"/>
    <RadioButton text="Square"/>
</RadioButtonGroup>
<TwoPaneSplitView fixed-pane-index="1" orientation="vertical"/>
"#;
    let factory = WidgetFactory::with_config(WidgetConfig::default());
    let widgets = factory.build_markup(source).unwrap();
    assert_eq!(widgets.len(), 4);

    let elements: Vec<_> = widgets.iter().map(AnyWidget::to_element).collect();
    let written = write_markup(&elements);
    assert_eq!(parse_markup(&written).unwrap(), elements);

    let rebuilt = factory.build_markup(&written).unwrap();
    let summaries: Vec<String> = rebuilt.iter().map(AnyWidget::summary).collect();
    assert_eq!(
        summaries,
        vec![
            "Toggle \"Enabled\" = true",
            "Slider \"Volume\" = 40",
            "RadioButtonGroup \"Shape\" = Square",
            "TwoPaneSplitView = 100px",
        ]
    );
}

#[test]
fn repeat_button_driven_by_host_timers() {
    let count = Rc::new(RefCell::new(0));
    let mut button = RepeatButton::new("+");
    button.set_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    let counter = count.clone();
    button.set_action(move || *counter.borrow_mut() += 1);

    let mut host = Host::new();
    let at = Point::new(4.0, 4.0);
    host.send(&mut button, InputEvent::PointerDown(PointerEvent::primary(at)));
    // Press, then 250 ms delay and three 30 ms intervals
    host.advance(&mut button, 250 + 30 * 3);
    host.send(&mut button, InputEvent::PointerUp(PointerEvent::primary(at)));
    host.advance(&mut button, 1000);
    assert_eq!(*count.borrow(), 5);
    assert!(host.scheduler.is_empty());
}
