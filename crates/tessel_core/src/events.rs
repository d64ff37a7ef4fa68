//! Input events delivered by the host runtime
//!
//! The host performs hit testing and focus tracking, then hands each widget a
//! typed [`InputEvent`] along with an [`EventContext`] that exposes the
//! shared services a widget may need while handling it: the pointer capture
//! registry, the timer scheduler and, for popups, the generic menu host.
//!
//! ```text
//! Platform input
//!     ↓
//! Host (hit testing, focus, capture routing)
//!     ↓
//! widget.handle_event(&InputEvent, &mut EventContext)
//!     ↓
//! Field<T>::set_value → ChangeEvent<T> → observers → ancestors
//! ```
//!
//! Positions are always in the receiving widget's local coordinate space.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::capture::PointerCapture;
use crate::geometry::{Point, Vec2};
use crate::menu::GenericMenu;
use crate::scheduler::{Scheduler, TimerId};

/// Identity of a widget, used as the owner of captures and timers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

impl WidgetId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Identifier of a pointer (mouse, touch contact, pen)
pub type PointerId = u32;

/// Pointer id the host uses for the mouse
pub const MOUSE_POINTER_ID: PointerId = 0;

/// Mouse button identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard modifier state at the time of an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, Win on Windows
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
        meta: false,
    };

    /// Platform "action" modifier (ctrl, or cmd on macOS)
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Speed tier selected by modifiers during drag-scrub
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaSpeed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl From<Modifiers> for DeltaSpeed {
    fn from(m: Modifiers) -> Self {
        if m.shift {
            DeltaSpeed::Fast
        } else if m.alt {
            DeltaSpeed::Slow
        } else {
            DeltaSpeed::Normal
        }
    }
}

/// Keys the widgets react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Home,
    End,
    PageUp,
    PageDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,
    Other(u32),
}

/// Pointer down/move/up payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    /// Button that changed state; `None` for moves
    pub button: Option<MouseButton>,
    /// Position in the widget's local space
    pub position: Point,
    /// Movement since the previous event for this pointer
    pub delta: Vec2,
    pub modifiers: Modifiers,
    /// 1 for single click, 2 for double click
    pub click_count: u32,
}

impl PointerEvent {
    /// Primary-button mouse event at `position`
    pub fn primary(position: Point) -> Self {
        Self {
            pointer_id: MOUSE_POINTER_ID,
            button: Some(MouseButton::Left),
            position,
            delta: Vec2::ZERO,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    /// Pointer move to `position` with `delta` since the last event
    pub fn moved(position: Point, delta: Vec2) -> Self {
        Self {
            pointer_id: MOUSE_POINTER_ID,
            button: None,
            position,
            delta,
            modifiers: Modifiers::NONE,
            click_count: 0,
        }
    }

    pub fn with_pointer(mut self, pointer_id: PointerId) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.button == Some(MouseButton::Left)
    }
}

/// Key press payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Direction of a navigation move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationDirection {
    Left,
    Right,
    Up,
    Down,
    Next,
    Previous,
}

/// Device-independent navigation (gamepad, keyboard focus navigation)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    Submit,
    Cancel,
    Move {
        direction: NavigationDirection,
        modifiers: Modifiers,
    },
}

/// Every event a widget can receive
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// The host revoked this widget's capture of a pointer
    PointerCaptureLost(PointerId),
    KeyDown(KeyEvent),
    /// Committed text input (one or more characters)
    TextInput(String),
    Navigation(NavigationEvent),
    FocusIn,
    FocusOut,
    /// A timer scheduled by this widget fired
    Timer(TimerId),
}

/// Whether a widget consumed an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventResponse {
    #[default]
    Ignored,
    Handled,
}

impl EventResponse {
    pub fn is_handled(&self) -> bool {
        matches!(self, EventResponse::Handled)
    }
}

/// Services available to a widget while it handles an event
pub struct EventContext<'a> {
    pub capture: &'a mut PointerCapture,
    pub scheduler: &'a mut dyn Scheduler,
    pub menu: Option<&'a mut dyn GenericMenu>,
}

impl<'a> EventContext<'a> {
    pub fn new(capture: &'a mut PointerCapture, scheduler: &'a mut dyn Scheduler) -> Self {
        Self {
            capture,
            scheduler,
            menu: None,
        }
    }

    /// Attach the host's generic menu for popup widgets
    pub fn with_menu(mut self, menu: &'a mut dyn GenericMenu) -> Self {
        self.menu = Some(menu);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_ids_are_unique() {
        let a = WidgetId::next();
        let b = WidgetId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_delta_speed_from_modifiers() {
        assert_eq!(DeltaSpeed::from(Modifiers::SHIFT), DeltaSpeed::Fast);
        assert_eq!(DeltaSpeed::from(Modifiers::ALT), DeltaSpeed::Slow);
        assert_eq!(DeltaSpeed::from(Modifiers::NONE), DeltaSpeed::Normal);
    }

    #[test]
    fn test_pointer_event_builders() {
        let e = PointerEvent::primary(Point::new(1.0, 2.0))
            .with_pointer(3)
            .with_modifiers(Modifiers::CTRL);
        assert!(e.is_primary());
        assert_eq!(e.pointer_id, 3);
        assert!(e.modifiers.action());

        let right = PointerEvent::primary(Point::ZERO).with_button(MouseButton::Right);
        assert!(!right.is_primary());
    }
}
