//! Generic menu abstraction provided by the host
//!
//! Popup widgets describe their choices to a [`GenericMenu`] and ask it to
//! drop down at an anchor rectangle. The host reports the user's pick back by
//! calling the popup's `select_menu_item(index)`, which goes through the
//! normal value setter.

use crate::events::WidgetId;
use crate::geometry::Rect;

/// Menu entry as described by a popup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Item {
        label: String,
        checked: bool,
        /// Index into the owner's choices
        index: usize,
    },
    Disabled {
        label: String,
    },
    Separator,
}

/// Host menu surface
pub trait GenericMenu {
    /// Discard any previously described items
    fn clear(&mut self);

    /// Append an entry
    fn add_item(&mut self, item: MenuItem);

    /// Show the menu below `anchor` on behalf of `owner`
    fn drop_down(&mut self, anchor: Rect, owner: WidgetId);
}

/// Menu that records what it was asked to show
///
/// Useful for headless hosts and tests: the host inspects `items` and then
/// feeds a selection back to the owning popup.
#[derive(Debug, Default)]
pub struct RecordingMenu {
    pub items: Vec<MenuItem>,
    pub shown_at: Option<(Rect, WidgetId)>,
    pub drop_down_count: usize,
}

impl RecordingMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the checked item, if any
    pub fn checked_index(&self) -> Option<usize> {
        self.items.iter().find_map(|item| match item {
            MenuItem::Item {
                checked: true,
                index,
                ..
            } => Some(*index),
            _ => None,
        })
    }

    /// Labels of every selectable item, in order
    pub fn labels(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Item { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl GenericMenu for RecordingMenu {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn add_item(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    fn drop_down(&mut self, anchor: Rect, owner: WidgetId) {
        self.shown_at = Some((anchor, owner));
        self.drop_down_count += 1;
    }
}
