//! Numeric text fields with drag-scrub
//!
//! [`NumericField<T>`] edits one number as text. Typed text may be an
//! arithmetic expression; text that fails to evaluate leaves the value
//! unchanged. Dragging horizontally or vertically over the label region
//! scrubs the value:
//!
//! ```text
//! pointer delta ──► nice delta (dominant axis, y up, × speed tier)
//!               ──► × sensitivity(start value)
//!               ──► rounded to what one sensitivity step can express
//! ```
//!
//! In delayed mode, edits and drags only change the displayed text; the
//! value is committed on Enter or focus loss, and Escape reverts.
//!
//! # Example
//!
//! ```ignore
//! let mut field = FloatField::new("Scale");
//! field.set_label_rect(Rect::new(0.0, 0.0, 60.0, 18.0));
//! field.set_range(Some((0.0, 100.0)));
//! field.set_delayed(true);
//! ```

use tessel_core::math::round_based_on_min_difference;
use tessel_core::{
    CommitMode, DeltaSpeed, DragConfig, DragSession, EditOutcome, EventContext, EventResponse,
    Field, FieldValue, InputEvent, InteractionEvent, InteractionState, KeyCode, PointerId, Rect,
    StateTransitions, Vec2, WidgetConfig, WidgetId,
};

use crate::expression::{evaluate_f64, evaluate_i128};
use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

// =============================================================================
// NUMERIC VALUE TYPES
// =============================================================================

/// Number types a [`NumericField`] can edit
pub trait NumericValue: FieldValue + Copy + PartialOrd + Default {
    const MIN: Self;
    const MAX: Self;
    /// Whole numbers only
    const INTEGRAL: bool;

    /// Evaluate typed text, `None` if it is not a valid expression
    fn parse_input(text: &str) -> Option<Self>;

    fn to_f64(self) -> f64;

    /// Nearest representable value, saturating at the type's bounds
    fn from_f64(value: f64) -> Self;

    /// Value change per unit of nice delta for a drag starting at `start`
    fn drag_sensitivity(start: Self, base: f64) -> f64;

    /// Apply one drag step to `self`
    fn apply_drag(self, nice_delta: f64, sensitivity: f64) -> Self;
}

macro_rules! impl_float_numeric {
    ($($ty:ty),*) => {
        $(
            impl NumericValue for $ty {
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;
                const INTEGRAL: bool = false;

                fn parse_input(text: &str) -> Option<Self> {
                    evaluate_f64(text).map(|v| v as $ty)
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn drag_sensitivity(start: Self, base: f64) -> f64 {
                    (start as f64).abs().sqrt().max(1.0) * base
                }

                fn apply_drag(self, nice_delta: f64, sensitivity: f64) -> Self {
                    let value = self as f64 + nice_delta * sensitivity;
                    round_based_on_min_difference(value, sensitivity) as $ty
                }
            }
        )*
    };
}

macro_rules! impl_integer_numeric {
    ($($ty:ty),*) => {
        $(
            impl NumericValue for $ty {
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;
                const INTEGRAL: bool = true;

                fn parse_input(text: &str) -> Option<Self> {
                    evaluate_i128(text)
                        .map(|v| v.clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty)
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }

                fn from_f64(value: f64) -> Self {
                    // Float-to-int `as` saturates and maps NaN to zero
                    value.round() as $ty
                }

                fn drag_sensitivity(start: Self, base: f64) -> f64 {
                    ((start as f64).abs().sqrt() * base).trunc().max(1.0)
                }

                fn apply_drag(self, nice_delta: f64, sensitivity: f64) -> Self {
                    let step = (nice_delta * sensitivity).round() as i128;
                    (self as i128)
                        .saturating_add(step)
                        .clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty
                }
            }
        )*
    };
}

impl_float_numeric!(f32, f64);
impl_integer_numeric!(i32, i64, u32, u64);

// =============================================================================
// DRAG DELTA
// =============================================================================

/// Converts raw pointer deltas into a signed scalar along the dominant axis
///
/// Screen y grows downward; dragging up increases the value. The axis only
/// switches when one component clearly dominates (by more than 10%), so
/// diagonal jitter does not flip the sign back and forth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaAxis {
    use_y_sign: bool,
}

impl DeltaAxis {
    pub fn nice_delta(&mut self, delta: Vec2, acceleration: f32) -> f64 {
        let (dx, dy) = (delta.x, -delta.y);
        let largest = dx.abs().max(dy.abs());
        if largest > 0.0 && (dx.abs() - dy.abs()).abs() / largest > 0.1 {
            self.use_y_sign = dx.abs() <= dy.abs();
        }
        let component = if self.use_y_sign { dy } else { dx };
        let sign = if component < 0.0 { -1.0 } else { 1.0 };
        (sign * delta.length() * acceleration) as f64
    }
}

/// Multiplier for a speed tier
pub fn acceleration(speed: DeltaSpeed, config: &DragConfig) -> f32 {
    match speed {
        DeltaSpeed::Fast => config.fast_multiplier,
        DeltaSpeed::Normal => 1.0,
        DeltaSpeed::Slow => config.slow_multiplier,
    }
}

#[derive(Debug)]
struct Scrub<T> {
    session: DragSession,
    start_value: T,
    axis: DeltaAxis,
}

// =============================================================================
// NUMERIC FIELD
// =============================================================================

/// Text field bound to a number
pub struct NumericField<T: NumericValue> {
    id: WidgetId,
    label: String,
    field: Field<T>,
    commit: CommitMode,
    range: Option<(T, T)>,
    label_rect: Rect,
    interaction: InteractionState,
    scrub: Option<Scrub<T>>,
    /// Text being edited while focused
    editing: Option<String>,
    /// Focus selected the whole text; the next input replaces it
    replace_on_input: bool,
    drag_config: DragConfig,
}

pub type IntegerField = NumericField<i32>;
pub type LongField = NumericField<i64>;
pub type UnsignedIntegerField = NumericField<u32>;
pub type UnsignedLongField = NumericField<u64>;
pub type FloatField = NumericField<f32>;
pub type DoubleField = NumericField<f64>;

impl<T: NumericValue> NumericField<T> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: WidgetId::next(),
            label: label.into(),
            field: Field::new(T::default()),
            commit: CommitMode::Live,
            range: None,
            label_rect: Rect::ZERO,
            interaction: InteractionState::Idle,
            scrub: None,
            editing: None,
            replace_on_input: false,
            drag_config: DragConfig::default(),
        }
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self.drag_config = config.drag.clone();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Region that starts a drag-scrub, in local coordinates
    pub fn set_label_rect(&mut self, rect: Rect) {
        self.label_rect = rect;
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn is_dragging(&self) -> bool {
        self.scrub.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_delayed(&self) -> bool {
        self.commit.is_delayed()
    }

    pub fn set_delayed(&mut self, delayed: bool) {
        self.commit.set_delayed(delayed);
    }

    pub fn range(&self) -> Option<(T, T)> {
        self.range
    }

    /// Clamp every stored value to `[min, max]`; either order is accepted
    ///
    /// The current value is clamped immediately.
    pub fn set_range(&mut self, range: Option<(T, T)>) {
        self.range = range;
        match range {
            Some((a, b)) => {
                let (lo, hi) = if b < a { (b, a) } else { (a, b) };
                self.field.set_coercion(move |v: T| {
                    if v < lo {
                        lo
                    } else if v > hi {
                        hi
                    } else {
                        v
                    }
                });
                self.field.recoerce();
            }
            None => self.field.clear_coercion(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text
    // ─────────────────────────────────────────────────────────────────────────

    /// Text currently displayed
    pub fn text(&self) -> String {
        match &self.editing {
            Some(text) => text.clone(),
            None => self.field.display_text(),
        }
    }

    /// Replace the edited text, as if typed by the user
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.begin_edit();
        self.apply_edit(text.into());
    }

    /// Commit the edited text (Enter or focus loss)
    pub fn submit(&mut self) {
        let text = match self.commit.take_pending() {
            Some(pending) => Some(pending),
            None if self.commit.is_delayed() => None,
            None => self.editing.clone(),
        };
        if let Some(text) = text {
            match T::parse_input(&text) {
                Some(value) => {
                    self.field.commit_user_value(value);
                }
                None => {
                    tracing::debug!(widget = self.id.raw(), text = %text, "rejected numeric input");
                }
            }
        }
        self.end_edit();
    }

    /// Discard the edited text
    ///
    /// A field that was mixed when editing started stays mixed.
    pub fn revert(&mut self) {
        self.commit.revert();
        self.end_edit();
    }

    fn begin_edit(&mut self) {
        if self.editing.is_some() {
            return;
        }
        let initial = if self.field.show_mixed_value() {
            String::new()
        } else {
            self.field.display_text()
        };
        self.editing = Some(initial);
    }

    fn end_edit(&mut self) {
        self.editing = None;
        self.replace_on_input = false;
        self.field.refresh_display();
    }

    /// Edited text with `input` typed at the end
    fn typed(&mut self, input: &str) -> String {
        self.begin_edit();
        let mut text = if std::mem::take(&mut self.replace_on_input) {
            String::new()
        } else {
            self.editing.clone().unwrap_or_default()
        };
        text.push_str(input);
        text
    }

    /// Leaving the mixed overlay is left to `commit_user_value`, so an
    /// edit that is reverted or fails to parse keeps the field mixed.
    fn apply_edit(&mut self, text: String) {
        self.editing = Some(text.clone());
        match self.commit.edit(text) {
            EditOutcome::Commit(text) => match T::parse_input(&text) {
                Some(value) => {
                    self.field.commit_user_value(value);
                }
                None => {
                    tracing::debug!(widget = self.id.raw(), text = %text, "rejected numeric input");
                }
            },
            EditOutcome::Buffered => {}
        }
    }

    /// Value the next drag step starts from
    fn current_value(&self) -> T {
        self.commit
            .pending()
            .and_then(T::parse_input)
            .unwrap_or_else(|| self.field.value())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drag-scrub
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one pointer delta to the value
    fn scrub_step(&mut self, delta: Vec2, speed: DeltaSpeed) {
        let Some(scrub) = self.scrub.as_mut() else {
            return;
        };
        let accel = acceleration(speed, &self.drag_config);
        let nice = scrub.axis.nice_delta(delta, accel);
        let sensitivity = T::drag_sensitivity(scrub.start_value, self.drag_config.sensitivity);

        let next = self.current_value().apply_drag(nice, sensitivity);
        if self.commit.is_delayed() {
            let text = self.field.format(&next);
            self.commit.edit(text.clone());
            self.editing = Some(text);
        } else {
            self.field.commit_user_value(next);
        }
    }

    fn scrub_owns(&self, pointer: PointerId) -> bool {
        self.scrub
            .as_ref()
            .map(|s| s.session.owns(pointer))
            .unwrap_or(false)
    }

    fn end_scrub(&mut self, ctx: &mut EventContext<'_>) {
        if let Some(scrub) = self.scrub.take() {
            ctx.capture.release(scrub.session.pointer_id(), self.id);
            self.interaction.apply(InteractionEvent::DragEnd);
        }
    }
}

impl<T: NumericValue> Widget for NumericField<T> {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.label_rect.contains(e.position) => {
                if self.scrub.is_some() || !ctx.capture.capture(e.pointer_id, self.id) {
                    return EventResponse::Ignored;
                }
                self.scrub = Some(Scrub {
                    session: DragSession::new(e.pointer_id, e.position),
                    start_value: self.current_value(),
                    axis: DeltaAxis::default(),
                });
                self.interaction.apply(InteractionEvent::PointerDown);
                EventResponse::Handled
            }
            InputEvent::PointerMove(e) => {
                let Some(scrub) = self.scrub.as_mut() else {
                    return EventResponse::Ignored;
                };
                if !scrub.session.owns(e.pointer_id) || !ctx.capture.has_capture(e.pointer_id, self.id) {
                    tracing::warn!(widget = self.id.raw(), pointer = e.pointer_id, "move without capture ignored");
                    return EventResponse::Ignored;
                }
                let step = scrub.session.update(e.position);
                self.interaction.apply(InteractionEvent::DragStart);
                self.scrub_step(step, DeltaSpeed::from(e.modifiers));
                EventResponse::Handled
            }
            InputEvent::PointerUp(e) if self.scrub_owns(e.pointer_id) => {
                self.end_scrub(ctx);
                self.interaction.apply(InteractionEvent::PointerUp);
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer) if self.scrub_owns(*pointer) => {
                self.scrub = None;
                self.interaction.apply(InteractionEvent::CaptureLost);
                if self.commit.is_delayed() {
                    self.revert();
                }
                EventResponse::Handled
            }
            InputEvent::KeyDown(key) => match key.key {
                KeyCode::Escape => {
                    if let Some(start) = self.scrub.as_ref().map(|s| s.start_value) {
                        self.end_scrub(ctx);
                        if self.commit.is_delayed() {
                            self.revert();
                        } else {
                            self.field.commit_user_value(start);
                        }
                        EventResponse::Handled
                    } else if self.editing.is_some() || self.commit.pending().is_some() {
                        self.revert();
                        EventResponse::Handled
                    } else {
                        EventResponse::Ignored
                    }
                }
                KeyCode::Enter => {
                    self.submit();
                    EventResponse::Handled
                }
                KeyCode::Backspace => {
                    let mut text = self.typed("");
                    text.pop();
                    self.apply_edit(text);
                    EventResponse::Handled
                }
                _ => EventResponse::Ignored,
            },
            InputEvent::TextInput(input) => {
                let text = self.typed(input);
                self.apply_edit(text);
                EventResponse::Handled
            }
            InputEvent::FocusIn => {
                self.begin_edit();
                self.replace_on_input = true;
                EventResponse::Handled
            }
            InputEvent::FocusOut => {
                if self.editing.is_some() || self.commit.pending().is_some() {
                    self.submit();
                }
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl<T: NumericValue> ValueWidget for NumericField<T> {
    type Value = T;

    fn field(&self) -> &Field<T> {
        &self.field
    }
}
