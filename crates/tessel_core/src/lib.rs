//! Tessel Core Runtime
//!
//! This crate provides the foundational primitives for Tessel widgets:
//!
//! - **Fields**: Typed value cells with change detection and notification
//! - **Notification**: Ordered observers plus parent-pointer bubbling with an
//!   explicit stop flag
//! - **Batching**: Coalesced composite re-derivation
//! - **State Machines**: Mixed-value overlay, live/delayed commit, pointer
//!   interaction
//! - **Host Services**: Pointer capture registry, timer scheduler, generic menu
//!
//! # Example
//!
//! ```rust
//! use tessel_core::Field;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let enabled = Field::new(false);
//! enabled.attach();
//!
//! let changes = Rc::new(Cell::new(0));
//! let counter = changes.clone();
//! enabled.subscribe(move |_| counter.set(counter.get() + 1));
//!
//! enabled.set_value(true);
//! enabled.set_value(true);
//! enabled.set_value_without_notify(false);
//! assert_eq!(changes.get(), 1);
//! ```

pub mod batch;
pub mod capture;
pub mod commit;
pub mod composite;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod field;
pub mod fsm;
pub mod geometry;
pub mod math;
pub mod menu;
pub mod mixed;
pub mod notify;
pub mod scheduler;

pub use batch::batch;
pub use capture::PointerCapture;
pub use commit::{CommitMode, EditOutcome};
pub use composite::CompositeBinding;
pub use config::{DragConfig, FieldConfig, SplitterConfig, TimingConfig, WidgetConfig};
pub use drag::DragSession;
pub use error::{Result, TesselError};
pub use events::{
    DeltaSpeed, EventContext, EventResponse, InputEvent, KeyCode, KeyEvent, Modifiers,
    MouseButton, NavigationDirection, NavigationEvent, PointerEvent, PointerId, WidgetId,
    MOUSE_POINTER_ID,
};
pub use field::{Field, FieldValue, NotifyPolicy, WeakField, MIXED_VALUE_MARKER};
pub use fsm::{InteractionEvent, InteractionState, StateTransitions};
pub use geometry::{Bounds, Orientation, Point, Rect, Size, Vec2, Vec3};
pub use menu::{GenericMenu, MenuItem, RecordingMenu};
pub use mixed::{MixedValueEvent, MixedValueState};
pub use notify::{BubbledChange, ChangeEvent, EventNode, FieldId, HandlerId, ObserverId};
pub use scheduler::{FiredTimer, Scheduler, TimerId, TimerScheduler};
