//! Tessel Widget Library
//!
//! Value-bound controls built on [`tessel_core`] fields.
//!
//! # Architecture
//!
//! 1. **Fields**: Every control owns a [`tessel_core::Field`] holding its value.
//!    Observers subscribe through [`ValueWidget`]; programmatic updates can skip
//!    notification with `set_value_without_notify`.
//!
//! 2. **Interaction Machines**: Pointer, keyboard and navigation input flows
//!    through [`Widget::handle_event`]. Drags hold pointer capture; repeats and
//!    delayed popups run on the host's timer scheduler.
//!
//! 3. **Markup**: Widgets are built from and written back to a small XML
//!    dialect through [`WidgetFactory`].
//!
//! # Example
//!
//! ```rust
//! use tessel_widgets::prelude::*;
//!
//! let factory = WidgetFactory::new();
//! let widgets = factory
//!     .build_markup(r#"<Slider label="Volume" high-value="100" value="40"/>"#)
//!     .unwrap();
//!
//! if let AnyWidget::Slider(slider) = &widgets[0] {
//!     assert_eq!(slider.value(), 40.0);
//! }
//! assert_eq!(widgets[0].summary(), "Slider \"Volume\" = 40");
//! ```

pub mod compound;
pub mod expression;
pub mod factory;
pub mod list_view;
pub mod markup;
pub mod numeric;
pub mod popup;
pub mod progress;
pub mod radio;
pub mod repeat;
pub mod slider;
pub mod splitter;
pub mod toggle;
pub mod widget;

pub use compound::{BoundsField, Vector3Field};
pub use factory::{AnyWidget, MarkupWidget, NumericTag, WidgetFactory, WIDGET_TAGS};
pub use list_view::{ListView, SelectionType};
pub use markup::{parse_markup, write_markup, MarkupElement};
pub use numeric::{
    DoubleField, FloatField, IntegerField, LongField, NumericField, NumericValue,
    UnsignedIntegerField, UnsignedLongField,
};
pub use popup::{DropdownField, PopupField, PopupState};
pub use progress::ProgressBar;
pub use radio::{RadioButton, RadioButtonGroup};
pub use repeat::RepeatButton;
pub use slider::{BaseSlider, Slider, SliderInt, StepSize};
pub use splitter::TwoPaneSplitView;
pub use toggle::{CheckmarkVisual, Toggle};
pub use widget::{dispatch, ValueWidget, Widget};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::factory::{AnyWidget, MarkupWidget, WidgetFactory};
    pub use crate::numeric::{FloatField, IntegerField};
    pub use crate::popup::DropdownField;
    pub use crate::radio::{RadioButton, RadioButtonGroup};
    pub use crate::slider::{Slider, SliderInt};
    pub use crate::splitter::TwoPaneSplitView;
    pub use crate::toggle::Toggle;
    pub use crate::widget::{dispatch, ValueWidget, Widget};
}
