//! Sliders over a numeric range
//!
//! A slider maps its value onto a track. Positions along the track are
//! expressed as a *visual fraction* `s` in `0..=1` that always grows in the
//! direction a user reads as "more": left to right for horizontal sliders,
//! bottom to top for vertical ones. The value's normalized position `t`
//! (0 at `low_value`, 1 at `high_value`) maps onto it as:
//!
//! ```text
//!               s = t          (normal)
//!               s = 1 - t      (inverted)
//! value sign  = sign(high_value - low_value)
//! screen main = s · travel     (horizontal)
//!             = (1 - s) · travel (vertical, screen y grows downward)
//! ```
//!
//! Every interaction first decides a direction in `s`, then converts it to a
//! value delta through the inversion and the range sign. Keys:
//!
//! | Key                    | Effect                          |
//! |------------------------|---------------------------------|
//! | Right / Up             | `s` up by one step (×10 shift)  |
//! | Left / Down            | `s` down by one step (×10 shift)|
//! | PageUp / PageDown      | `s` up / down by one page       |
//! | Home / End             | jump to `s = 0` / `s = 1`       |
//!
//! Clicking the track outside the handle pages toward the pointer and keeps
//! paging on a repeat timer until the handle reaches it. With a page size of
//! zero the handle jumps to the pointer and a drag starts instead.

use tessel_core::math::{closest_power_of_ten, round_based_on_min_difference, round_to_multiple_of};
use tessel_core::{
    DragSession, EventContext, EventResponse, Field, InputEvent, InteractionEvent,
    InteractionState, KeyCode, Modifiers, NavigationDirection, NavigationEvent, Orientation,
    Point, PointerId, Rect, StateTransitions, TimerId, TimingConfig, WidgetConfig, WidgetId,
};

use crate::numeric::NumericValue;
use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

/// Size of a keyboard step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSize {
    /// Power of ten near 1% of the range
    Small,
    /// Ten small steps
    Large,
    /// `page_size`, or a large step when no page size is set
    Page,
}

#[derive(Debug)]
enum SliderGesture {
    /// Dragging the handle; the session's grab offset is the pointer
    /// distance from the handle start
    Drag(DragSession),
    /// Paging toward a held pointer
    Page {
        pointer: PointerId,
        target: Point,
        timer: Option<TimerId>,
    },
}

/// Slider over a range of `T`
pub struct BaseSlider<T: NumericValue> {
    id: WidgetId,
    label: String,
    field: Field<T>,
    low: T,
    high: T,
    page_size: f64,
    orientation: Orientation,
    inverted: bool,
    track_rect: Rect,
    handle_length: f32,
    interaction: InteractionState,
    gesture: Option<SliderGesture>,
    timing: TimingConfig,
}

pub type Slider = BaseSlider<f32>;
pub type SliderInt = BaseSlider<i32>;

impl<T: NumericValue> BaseSlider<T> {
    /// Slider over `[low, high]`; the bounds may be given in either order
    pub fn new(label: impl Into<String>, low: T, high: T) -> Self {
        let slider = Self {
            id: WidgetId::next(),
            label: label.into(),
            field: Field::new(low),
            low,
            high,
            page_size: 0.0,
            orientation: Orientation::Horizontal,
            inverted: false,
            track_rect: Rect::ZERO,
            handle_length: 0.0,
            interaction: InteractionState::Idle,
            gesture: None,
            timing: TimingConfig::default(),
        };
        slider.update_clamp();
        slider
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

    // ─────────────────────────────────────────────────────────────────────────
    // Range
    // ─────────────────────────────────────────────────────────────────────────

    pub fn low_value(&self) -> T {
        self.low
    }

    pub fn high_value(&self) -> T {
        self.high
    }

    pub fn set_low_value(&mut self, low: T) {
        self.adjust(low, self.high);
    }

    pub fn set_high_value(&mut self, high: T) {
        self.adjust(self.low, high);
    }

    /// Change both bounds, clamping the current value into the new range
    pub fn adjust(&mut self, low: T, high: T) {
        self.low = low;
        self.high = high;
        self.update_clamp();
        self.field.recoerce();
    }

    /// Signed extent of the range, `high - low`
    pub fn range(&self) -> f64 {
        self.high.to_f64() - self.low.to_f64()
    }

    fn update_clamp(&self) {
        let (lo, hi) = if self.high < self.low {
            (self.high, self.low)
        } else {
            (self.low, self.high)
        };
        self.field.set_coercion(move |v: T| {
            if v < lo {
                lo
            } else if v > hi {
                hi
            } else {
                v
            }
        });
    }

    pub fn page_size(&self) -> f64 {
        self.page_size
    }

    /// Value change per track click; `0` makes clicks jump to the pointer
    pub fn set_page_size(&mut self, page_size: f64) {
        self.page_size = page_size.max(0.0);
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Geometry
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolved track rectangle, in local coordinates
    pub fn set_track_rect(&mut self, rect: Rect) {
        self.track_rect = rect;
    }

    /// Handle extent along the main axis
    pub fn set_handle_length(&mut self, length: f32) {
        self.handle_length = length.max(0.0);
    }

    /// Distance the handle can move
    fn travel(&self) -> f32 {
        (self.orientation.main_size(self.track_rect.size) - self.handle_length).max(0.0)
    }

    /// Position of the value in `0..=1`, from low to high
    pub fn normalized_value(&self) -> f64 {
        let range = self.range();
        if range == 0.0 {
            return 0.0;
        }
        ((self.field.value().to_f64() - self.low.to_f64()) / range).clamp(0.0, 1.0)
    }

    /// Normalized value to visual fraction and back (the map is its own inverse)
    fn flip(&self, fraction: f64) -> f64 {
        if self.inverted {
            1.0 - fraction
        } else {
            fraction
        }
    }

    /// Visual fraction of the current value
    fn current_s(&self) -> f64 {
        self.flip(self.normalized_value())
    }

    /// Handle start offset from the track start for visual fraction `s`
    fn s_to_offset(&self, s: f64) -> f32 {
        let travel = self.travel() as f64;
        let offset = match self.orientation {
            Orientation::Horizontal => s * travel,
            Orientation::Vertical => (1.0 - s) * travel,
        };
        offset as f32
    }

    /// Visual fraction for a handle start offset
    fn offset_to_s(&self, offset: f32) -> f64 {
        let travel = self.travel();
        if travel <= 0.0 {
            return self.current_s();
        }
        let along = (offset / travel).clamp(0.0, 1.0) as f64;
        match self.orientation {
            Orientation::Horizontal => along,
            Orientation::Vertical => 1.0 - along,
        }
    }

    /// Handle rectangle for the current value
    pub fn handle_rect(&self) -> Rect {
        let offset = self.s_to_offset(self.current_s());
        let t = self.track_rect;
        match self.orientation {
            Orientation::Horizontal => Rect::new(t.x() + offset, t.y(), self.handle_length, t.height()),
            Orientation::Vertical => Rect::new(t.x(), t.y() + offset, t.width(), self.handle_length),
        }
    }

    /// Offset of `point` from the track start along the main axis
    fn main_offset(&self, point: Point) -> f32 {
        self.orientation.main(point) - self.orientation.main_origin(self.track_rect)
    }

    /// Visual fraction that would center the handle on `point`
    fn pointer_s(&self, point: Point) -> f64 {
        self.offset_to_s(self.main_offset(point) - self.handle_length / 2.0)
    }

    /// Value shown at visual fraction `s`, rounded to pixel precision
    fn value_at_s(&self, s: f64) -> T {
        let t = self.flip(s);
        let range = self.range();
        let raw = self.low.to_f64() + t * range;
        let travel = self.travel() as f64;
        let min_difference = if travel > 0.0 { range.abs() / travel } else { 0.0 };
        T::from_f64(round_based_on_min_difference(raw, min_difference))
    }

    /// Sign of the value change for a move of `s_direction` along the track
    fn value_direction(&self, s_direction: f64) -> f64 {
        let t_direction = if self.inverted { -s_direction } else { s_direction };
        if self.range() < 0.0 {
            -t_direction
        } else {
            t_direction
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard stepping
    // ─────────────────────────────────────────────────────────────────────────

    fn step_magnitude(&self, size: StepSize) -> f64 {
        let mut step = closest_power_of_ten(self.range().abs() * 0.01);
        if T::INTEGRAL {
            step = step.max(1.0);
        }
        match size {
            StepSize::Small => step,
            StepSize::Large => step * 10.0,
            StepSize::Page if self.page_size > 0.0 => self.page_size,
            StepSize::Page => step * 10.0,
        }
    }

    /// Step the value along the track
    ///
    /// The result is snapped to a multiple of the step, aiming half a step
    /// past the current value, so a value already on a multiple advances by
    /// exactly one step and an off-grid value lands on the next multiple.
    pub fn step(&mut self, s_direction: f64, size: StepSize) {
        let magnitude = self.step_magnitude(size);
        let delta = self.value_direction(s_direction) * magnitude;
        let current = self.field.value().to_f64();
        let next = round_to_multiple_of(current + delta * 0.5001, magnitude);
        tracing::trace!(widget = self.id.raw(), current, next, "slider step");
        self.field.commit_user_value(T::from_f64(next));
    }

    /// Jump to the end of the track at visual fraction `s` (0 or 1)
    pub fn jump_to_end(&mut self, s: f64) {
        let value = if self.flip(s) < 0.5 { self.low } else { self.high };
        self.field.commit_user_value(value);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: Modifiers) -> EventResponse {
        let small = if modifiers.shift {
            StepSize::Large
        } else {
            StepSize::Small
        };
        match key {
            KeyCode::ArrowRight | KeyCode::ArrowUp => self.step(1.0, small),
            KeyCode::ArrowLeft | KeyCode::ArrowDown => self.step(-1.0, small),
            KeyCode::PageUp => self.step(1.0, StepSize::Page),
            KeyCode::PageDown => self.step(-1.0, StepSize::Page),
            KeyCode::Home => self.jump_to_end(0.0),
            KeyCode::End => self.jump_to_end(1.0),
            _ => return EventResponse::Ignored,
        }
        EventResponse::Handled
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer
    // ─────────────────────────────────────────────────────────────────────────

    fn drag_to(&mut self, point: Point, grab_offset: f32) {
        let s = self.offset_to_s(self.main_offset(point) - grab_offset);
        let value = self.value_at_s(s);
        self.field.commit_user_value(value);
    }

    /// Page once toward `target`; returns `false` once the handle is there
    fn page_toward(&mut self, target: Point) -> bool {
        if self.handle_rect().contains(target) {
            return false;
        }
        let direction = self.pointer_s(target) - self.current_s();
        if direction == 0.0 {
            return false;
        }
        let delta = self.value_direction(direction.signum()) * self.page_size;
        let next = T::from_f64(self.field.value().to_f64() + delta);
        self.field.commit_user_value(next)
    }

    fn start_drag(&mut self, pointer: PointerId, position: Point, grab_offset: f32) {
        let session = DragSession::new(pointer, position).with_grab_offset(grab_offset);
        self.gesture = Some(SliderGesture::Drag(session));
        self.interaction.apply(InteractionEvent::PointerDown);
        self.interaction.apply(InteractionEvent::DragStart);
    }

    fn end_gesture(&mut self, ctx: &mut EventContext<'_>) {
        match self.gesture.take() {
            Some(SliderGesture::Drag(session)) => {
                ctx.capture.release(session.pointer_id(), self.id);
            }
            Some(SliderGesture::Page { pointer, timer, .. }) => {
                if let Some(timer) = timer {
                    ctx.scheduler.cancel(timer);
                }
                ctx.capture.release(pointer, self.id);
            }
            None => {}
        }
    }

    fn gesture_pointer(&self) -> Option<PointerId> {
        match &self.gesture {
            Some(SliderGesture::Drag(session)) => Some(session.pointer_id()),
            Some(SliderGesture::Page { pointer, .. }) => Some(*pointer),
            None => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(SliderGesture::Drag(_)))
    }

    pub fn is_paging(&self) -> bool {
        matches!(self.gesture, Some(SliderGesture::Page { .. }))
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }
}

impl<T: NumericValue> Widget for BaseSlider<T> {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.track_rect.contains(e.position) => {
                if self.gesture.is_some() || !ctx.capture.capture(e.pointer_id, self.id) {
                    return EventResponse::Ignored;
                }
                let handle = self.handle_rect();
                if handle.contains(e.position) {
                    let grab = self.main_offset(e.position)
                        - self.orientation.main_origin(handle)
                        + self.orientation.main_origin(self.track_rect);
                    self.start_drag(e.pointer_id, e.position, grab);
                } else if self.page_size <= 0.0 {
                    let grab = self.handle_length / 2.0;
                    self.drag_to(e.position, grab);
                    self.start_drag(e.pointer_id, e.position, grab);
                } else {
                    self.interaction.apply(InteractionEvent::PointerDown);
                    let timer = if self.page_toward(e.position) {
                        Some(ctx.scheduler.schedule_repeating(
                            self.id,
                            self.timing.repeat_delay_ms,
                            self.timing.repeat_interval_ms,
                        ))
                    } else {
                        None
                    };
                    self.gesture = Some(SliderGesture::Page {
                        pointer: e.pointer_id,
                        target: e.position,
                        timer,
                    });
                }
                EventResponse::Handled
            }
            InputEvent::PointerMove(e) if self.gesture_pointer() == Some(e.pointer_id) => {
                if !ctx.capture.has_capture(e.pointer_id, self.id) {
                    tracing::warn!(widget = self.id.raw(), pointer = e.pointer_id, "move without capture ignored");
                    return EventResponse::Ignored;
                }
                match &mut self.gesture {
                    Some(SliderGesture::Drag(session)) => {
                        session.update(e.position);
                        let grab = session.grab_offset();
                        self.drag_to(e.position, grab);
                    }
                    Some(SliderGesture::Page { target, .. }) => *target = e.position,
                    None => {}
                }
                EventResponse::Handled
            }
            InputEvent::PointerUp(e) if self.gesture_pointer() == Some(e.pointer_id) => {
                self.end_gesture(ctx);
                self.interaction.apply(InteractionEvent::PointerUp);
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer) if self.gesture_pointer() == Some(*pointer) => {
                self.end_gesture(ctx);
                self.interaction.apply(InteractionEvent::CaptureLost);
                EventResponse::Handled
            }
            InputEvent::Timer(id) => {
                let target = match &self.gesture {
                    Some(SliderGesture::Page {
                        target,
                        timer: Some(timer),
                        ..
                    }) if timer == id => *target,
                    _ => return EventResponse::Ignored,
                };
                if !self.page_toward(target) {
                    ctx.scheduler.cancel(*id);
                    if let Some(SliderGesture::Page { timer, .. }) = &mut self.gesture {
                        *timer = None;
                    }
                }
                EventResponse::Handled
            }
            InputEvent::KeyDown(key) => self.handle_key(key.key, key.modifiers),
            InputEvent::Navigation(NavigationEvent::Move {
                direction,
                modifiers,
            }) => {
                let key = match direction {
                    NavigationDirection::Right => KeyCode::ArrowRight,
                    NavigationDirection::Up => KeyCode::ArrowUp,
                    NavigationDirection::Left => KeyCode::ArrowLeft,
                    NavigationDirection::Down => KeyCode::ArrowDown,
                    _ => return EventResponse::Ignored,
                };
                self.handle_key(key, *modifiers)
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl<T: NumericValue> ValueWidget for BaseSlider<T> {
    type Value = T;

    fn field(&self) -> &Field<T> {
        &self.field
    }
}
