//! Two-pane split view
//!
//! One pane keeps a fixed dimension along the main axis and the other takes
//! the rest. Dragging the handle between them resizes the fixed pane.
//!
//! # Resize Rule
//!
//! For a drag delta `d` (already signed toward growing the fixed pane):
//!
//! ```text
//! new = old + d
//! min = fixed_min + margins
//! if new < old and new < min                → new = min
//! max = container - flexed_min - margins
//! if new > old and new > max                → new = max
//! ```
//!
//! The handle sits at `new` when pane 0 is fixed and at `container - new`
//! otherwise. A drag stops when the handle falls more than
//! [`SplitterConfig::decouple_tolerance`] behind the pointer, which happens
//! once a clamp pins it.

use tessel_core::{
    DragSession, EventContext, EventResponse, InputEvent, InteractionEvent, InteractionState,
    Orientation, Rect, Size, SplitterConfig, StateTransitions, WidgetConfig, WidgetId,
};

use crate::widget::Widget;

pub struct TwoPaneSplitView {
    id: WidgetId,
    fixed_pane_index: usize,
    fixed_pane_initial_dimension: f32,
    fixed_dimension: f32,
    orientation: Orientation,
    container: Size,
    fixed_min: f32,
    flexed_min: f32,
    margins: f32,
    handle_thickness: f32,
    /// Child hidden by `collapse_child`
    collapsed: Option<usize>,
    drag: Option<DragSession>,
    interaction: InteractionState,
    config: SplitterConfig,
}

impl Default for TwoPaneSplitView {
    fn default() -> Self {
        Self::new(0, 100.0, Orientation::Horizontal)
    }
}

impl TwoPaneSplitView {
    /// # Panics
    ///
    /// Panics if `fixed_pane_index` is not 0 or 1.
    pub fn new(fixed_pane_index: usize, initial_dimension: f32, orientation: Orientation) -> Self {
        assert!(
            fixed_pane_index < 2,
            "fixed pane index must be 0 or 1, got {fixed_pane_index}"
        );
        Self {
            id: WidgetId::next(),
            fixed_pane_index,
            fixed_pane_initial_dimension: initial_dimension,
            fixed_dimension: initial_dimension,
            orientation,
            container: Size::ZERO,
            fixed_min: 0.0,
            flexed_min: 0.0,
            margins: 0.0,
            handle_thickness: 8.0,
            collapsed: None,
            drag: None,
            interaction: InteractionState::Idle,
            config: SplitterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        self.config = config.splitter.clone();
        self
    }

    pub fn fixed_pane_index(&self) -> usize {
        self.fixed_pane_index
    }

    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    pub fn set_fixed_pane_index(&mut self, index: usize) {
        assert!(index < 2, "fixed pane index must be 0 or 1, got {index}");
        self.fixed_pane_index = index;
    }

    pub fn fixed_pane_initial_dimension(&self) -> f32 {
        self.fixed_pane_initial_dimension
    }

    /// Reset the fixed pane to `dimension`
    pub fn set_fixed_pane_initial_dimension(&mut self, dimension: f32) {
        self.fixed_pane_initial_dimension = dimension;
        self.fixed_dimension = dimension;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Current main-axis dimension of the fixed pane
    pub fn fixed_dimension(&self) -> f32 {
        self.fixed_dimension
    }

    pub fn set_min_dimensions(&mut self, fixed_min: f32, flexed_min: f32) {
        self.fixed_min = fixed_min.max(0.0);
        self.flexed_min = flexed_min.max(0.0);
    }

    /// Main-axis margins of the fixed pane, subtracted from its maximum
    pub fn set_margins(&mut self, margins: f32) {
        self.margins = margins.max(0.0);
    }

    pub fn set_handle_thickness(&mut self, thickness: f32) {
        self.handle_thickness = thickness.max(0.0);
    }

    fn container_main(&self) -> f32 {
        self.orientation.main_size(self.container)
    }

    /// Smallest dimension the fixed pane may shrink to
    pub fn min_fixed_dimension(&self) -> f32 {
        self.fixed_min + self.margins
    }

    /// Largest dimension the fixed pane may take
    pub fn max_fixed_dimension(&self) -> f32 {
        self.container_main() - self.flexed_min - self.margins
    }

    /// Resolved size of the split view; shrinks the fixed pane if it no longer fits
    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
        let clamped = self
            .fixed_dimension
            .min(self.max_fixed_dimension())
            .max(self.min_fixed_dimension());
        if clamped != self.fixed_dimension {
            tracing::debug!(
                widget = self.id.raw(),
                from = self.fixed_dimension,
                to = clamped,
                "fixed pane re-clamped to container"
            );
            self.fixed_dimension = clamped;
        }
    }

    /// Resize the fixed pane by `delta`, clamped to its limits
    pub fn apply_delta(&mut self, delta: f32) {
        let old = self.fixed_dimension;
        let mut new = old + delta;
        let min = self.min_fixed_dimension();
        if new < old && new < min {
            new = min;
        }
        let max = self.max_fixed_dimension();
        if new > old && new > max {
            new = max;
        }
        tracing::trace!(widget = self.id.raw(), old, new, "split resize");
        self.fixed_dimension = new;
    }

    /// Handle position along the main axis
    pub fn handle_offset(&self) -> f32 {
        match self.collapsed {
            Some(0) => 0.0,
            Some(_) => self.container_main(),
            None if self.fixed_pane_index == 0 => self.fixed_dimension,
            None => self.container_main() - self.fixed_dimension,
        }
    }

    /// Grab area of the handle, centered on the split line
    pub fn handle_rect(&self) -> Rect {
        let start = self.handle_offset() - self.handle_thickness / 2.0;
        match self.orientation {
            Orientation::Horizontal => Rect::new(start, 0.0, self.handle_thickness, self.container.height),
            Orientation::Vertical => Rect::new(0.0, start, self.container.width, self.handle_thickness),
        }
    }

    /// Rectangles of both panes
    pub fn pane_rects(&self) -> [Rect; 2] {
        let split = self.handle_offset();
        let total = self.container_main();
        let (w, h) = (self.container.width, self.container.height);
        match self.orientation {
            Orientation::Horizontal => [Rect::new(0.0, 0.0, split, h), Rect::new(split, 0.0, total - split, h)],
            Orientation::Vertical => [Rect::new(0.0, 0.0, w, split), Rect::new(0.0, split, w, total - split)],
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collapse
    // ─────────────────────────────────────────────────────────────────────────

    /// Hide one child; the other fills the view and the handle is disabled
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    pub fn collapse_child(&mut self, index: usize) {
        assert!(index < 2, "child index must be 0 or 1, got {index}");
        self.collapsed = Some(index);
    }

    /// Show both children again at the previous split
    pub fn uncollapse(&mut self) {
        self.collapsed = None;
    }

    pub fn collapsed_child(&self) -> Option<usize> {
        self.collapsed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dragging
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    fn end_drag(&mut self, ctx: &mut EventContext<'_>) {
        if let Some(session) = self.drag.take() {
            ctx.capture.release(session.pointer_id(), self.id);
        }
        self.interaction.apply(InteractionEvent::DragEnd);
        self.interaction.apply(InteractionEvent::PointerUp);
    }
}

impl Widget for TwoPaneSplitView {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.collapsed.is_none() => {
                if self.drag.is_some() || !self.handle_rect().contains(e.position) {
                    return EventResponse::Ignored;
                }
                if !ctx.capture.capture(e.pointer_id, self.id) {
                    return EventResponse::Ignored;
                }
                let direction = if self.fixed_pane_index == 0 { 1.0 } else { -1.0 };
                let grab = self.orientation.main(e.position) - self.handle_offset();
                self.drag = Some(
                    DragSession::new(e.pointer_id, e.position)
                        .with_direction(direction)
                        .with_grab_offset(grab),
                );
                self.interaction.apply(InteractionEvent::PointerDown);
                self.interaction.apply(InteractionEvent::DragStart);
                EventResponse::Handled
            }
            InputEvent::PointerMove(e) => {
                let Some(session) = self.drag.as_mut().filter(|s| s.owns(e.pointer_id)) else {
                    return EventResponse::Ignored;
                };
                if !ctx.capture.has_capture(e.pointer_id, self.id) {
                    tracing::warn!(widget = self.id.raw(), pointer = e.pointer_id, "move without capture ignored");
                    return EventResponse::Ignored;
                }
                let step = session.update(e.position);
                let direction = session.direction();
                let grab = session.grab_offset();
                self.apply_delta(self.orientation.main_delta(step) * direction);

                let drift = self.orientation.main(e.position) - grab - self.handle_offset();
                if drift.abs() > self.config.decouple_tolerance {
                    tracing::debug!(widget = self.id.raw(), drift, "handle decoupled from pointer; drag ended");
                    self.end_drag(ctx);
                }
                EventResponse::Handled
            }
            InputEvent::PointerUp(e) if self.drag.is_some_and(|s| s.owns(e.pointer_id)) => {
                self.end_drag(ctx);
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer) if self.drag.is_some_and(|s| s.owns(*pointer)) => {
                self.drag = None;
                self.interaction.apply(InteractionEvent::CaptureLost);
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, _attached: bool) {}
}
