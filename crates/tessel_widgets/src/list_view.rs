//! Virtualized list with selection
//!
//! Items have a fixed height, so the visible range follows directly from the
//! scroll offset and viewport height. Only selection state lives here; the host
//! binds and draws rows for [`ListView::visible_range`].

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;

use tessel_core::{
    EventContext, EventResponse, Field, InputEvent, KeyCode, Modifiers, NavigationDirection,
    NavigationEvent, Rect, WidgetConfig, WidgetId,
};

use crate::widget::{apply_field_config, set_field_attached, ValueWidget, Widget};

/// How many items can be selected at once
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionType {
    None,
    #[default]
    Single,
    Multiple,
}

impl SelectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionType::None => "none",
            SelectionType::Single => "single",
            SelectionType::Multiple => "multiple",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(SelectionType::None),
            "single" => Some(SelectionType::Single),
            "multiple" => Some(SelectionType::Multiple),
            _ => None,
        }
    }
}

type ChosenCallback = Box<dyn Fn(&[usize])>;

pub struct ListView {
    id: WidgetId,
    field: Field<Vec<usize>>,
    item_count: Rc<Cell<usize>>,
    selection_type: Rc<Cell<SelectionType>>,
    item_height: f32,
    viewport: Rect,
    scroll_offset: f32,
    /// Start of a shift-extended range
    anchor: Option<usize>,
    on_items_chosen: Vec<ChosenCallback>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new(0, 22.0)
    }
}

impl ListView {
    pub fn new(item_count: usize, item_height: f32) -> Self {
        let count = Rc::new(Cell::new(item_count));
        let selection_type = Rc::new(Cell::new(SelectionType::Single));
        let field = Field::new(Vec::new());

        let (c, s) = (count.clone(), selection_type.clone());
        field.set_coercion(move |indices: Vec<usize>| normalize_selection(indices, c.get(), s.get()));

        Self {
            id: WidgetId::next(),
            field,
            item_count: count,
            selection_type,
            item_height: item_height.max(1.0),
            viewport: Rect::ZERO,
            scroll_offset: 0.0,
            anchor: None,
            on_items_chosen: Vec::new(),
        }
    }

    pub fn with_config(self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self
    }

    pub fn item_count(&self) -> usize {
        self.item_count.get()
    }

    /// Change the number of items, dropping selections past the end
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count.set(count);
        self.field.recoerce();
        self.set_scroll_offset(self.scroll_offset);
    }

    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    pub fn set_item_height(&mut self, height: f32) {
        self.item_height = height.max(1.0);
        self.set_scroll_offset(self.scroll_offset);
    }

    pub fn selection_type(&self) -> SelectionType {
        self.selection_type.get()
    }

    pub fn set_selection_type(&mut self, selection_type: SelectionType) {
        self.selection_type.set(selection_type);
        self.field.recoerce();
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.field.value()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.field.with_value(|v| v.first().copied())
    }

    pub fn set_selection(&mut self, indices: Vec<usize>) {
        self.anchor = indices.last().copied();
        self.field.set_value(indices);
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.field.set_value(Vec::new());
    }

    /// Called with the selection when items are chosen (double click or submit)
    pub fn on_items_chosen(&mut self, callback: impl Fn(&[usize]) + 'static) {
        self.on_items_chosen.push(Box::new(callback));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.set_scroll_offset(self.scroll_offset);
    }

    fn content_height(&self) -> f32 {
        self.item_count() as f32 * self.item_height
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        let max = (self.content_height() - self.viewport.height()).max(0.0);
        self.scroll_offset = offset.clamp(0.0, max);
    }

    /// Scroll the minimum amount that makes `index` fully visible
    pub fn scroll_to_item(&mut self, index: usize) {
        let top = index as f32 * self.item_height;
        let bottom = top + self.item_height;
        if top < self.scroll_offset {
            self.set_scroll_offset(top);
        } else if bottom > self.scroll_offset + self.viewport.height() {
            self.set_scroll_offset(bottom - self.viewport.height());
        }
    }

    /// Indices of rows that intersect the viewport
    pub fn visible_range(&self) -> Range<usize> {
        let count = self.item_count();
        let first = (self.scroll_offset / self.item_height).floor() as usize;
        let last = ((self.scroll_offset + self.viewport.height()) / self.item_height).ceil() as usize;
        first.min(count)..last.min(count)
    }

    /// Item under a point in viewport coordinates
    pub fn index_at(&self, y: f32) -> Option<usize> {
        let local = y - self.viewport.y() + self.scroll_offset;
        if local < 0.0 {
            return None;
        }
        let index = (local / self.item_height) as usize;
        (index < self.item_count()).then_some(index)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection gestures
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a click on `index` with the given modifiers
    pub fn click_item(&mut self, index: usize, modifiers: Modifiers) {
        let current = self.field.value();
        let next = match self.selection_type() {
            SelectionType::None => return,
            SelectionType::Single => vec![index],
            SelectionType::Multiple if modifiers.shift => match self.anchor {
                Some(anchor) if anchor <= index => (anchor..=index).collect(),
                Some(anchor) => (index..=anchor).rev().collect(),
                None => vec![index],
            },
            SelectionType::Multiple if modifiers.action() => {
                let mut next = current.clone();
                match next.iter().position(|&i| i == index) {
                    Some(pos) => {
                        next.remove(pos);
                    }
                    None => next.push(index),
                }
                next
            }
            SelectionType::Multiple => vec![index],
        };
        if !modifiers.shift {
            self.anchor = Some(index);
        }
        tracing::trace!(widget = self.id.raw(), index, ?next, "list selection");
        self.field.commit_user_value(next);
    }

    fn move_selection(&mut self, delta: isize, extend: bool) {
        let count = self.item_count();
        if count == 0 || self.selection_type() == SelectionType::None {
            return;
        }
        let current = self.field.with_value(|v| v.last().copied());
        let target = match current {
            Some(i) => (i as isize + delta).clamp(0, count as isize - 1) as usize,
            None if delta < 0 => count - 1,
            None => 0,
        };
        let modifiers = if extend && self.selection_type() == SelectionType::Multiple {
            Modifiers::SHIFT
        } else {
            Modifiers::NONE
        };
        self.click_item(target, modifiers);
        self.scroll_to_item(target);
    }

    fn rows_per_page(&self) -> isize {
        ((self.viewport.height() / self.item_height).floor() as isize).max(1)
    }

    fn choose(&self) {
        let selection = self.field.value();
        if selection.is_empty() {
            return;
        }
        tracing::debug!(widget = self.id.raw(), ?selection, "items chosen");
        for callback in &self.on_items_chosen {
            callback(&selection);
        }
    }
}

/// Drop out-of-range and duplicate indices, then apply the selection type
fn normalize_selection(indices: Vec<usize>, count: usize, selection_type: SelectionType) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(indices.len());
    for i in indices {
        if i < count && !out.contains(&i) {
            out.push(i);
        }
    }
    match selection_type {
        SelectionType::None => Vec::new(),
        SelectionType::Single => out.pop().into_iter().collect(),
        SelectionType::Multiple => out,
    }
}

impl Widget for ListView {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, _ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.viewport.contains(e.position) => {
                let Some(index) = self.index_at(e.position.y) else {
                    return EventResponse::Ignored;
                };
                if e.click_count >= 2 {
                    self.choose();
                } else {
                    self.click_item(index, e.modifiers);
                }
                EventResponse::Handled
            }
            InputEvent::KeyDown(key) => {
                let extend = key.modifiers.shift;
                match key.key {
                    KeyCode::ArrowUp => self.move_selection(-1, extend),
                    KeyCode::ArrowDown => self.move_selection(1, extend),
                    KeyCode::PageUp => self.move_selection(-self.rows_per_page(), extend),
                    KeyCode::PageDown => self.move_selection(self.rows_per_page(), extend),
                    KeyCode::Home => self.move_selection(isize::MIN / 2, extend),
                    KeyCode::End => self.move_selection(isize::MAX / 2, extend),
                    KeyCode::Enter => self.choose(),
                    _ => return EventResponse::Ignored,
                }
                EventResponse::Handled
            }
            InputEvent::Navigation(NavigationEvent::Move {
                direction,
                modifiers,
            }) => {
                match direction {
                    NavigationDirection::Up => self.move_selection(-1, modifiers.shift),
                    NavigationDirection::Down => self.move_selection(1, modifiers.shift),
                    _ => return EventResponse::Ignored,
                }
                EventResponse::Handled
            }
            InputEvent::Navigation(NavigationEvent::Submit) => {
                self.choose();
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }
}

impl ValueWidget for ListView {
    type Value = Vec<usize>;

    fn field(&self) -> &Field<Vec<usize>> {
        &self.field
    }
}
