//! Building widgets from markup
//!
//! Every widget implements [`MarkupWidget`]: it can be constructed with
//! defaults, configured attribute by attribute, and turned back into an
//! element carrying its non-default attributes. [`WidgetFactory`] maps tags
//! to widgets and returns them as [`AnyWidget`].
//!
//! | Tag                 | Attributes |
//! |---------------------|------------|
//! | `Toggle`            | `label` `text` `value` |
//! | `IntegerField` …    | `label` `value` `is-delayed` `range="lo,hi"` |
//! | `Slider` `SliderInt`| `label` `value` `low-value` `high-value` `page-size` `direction` `inverted` |
//! | `ProgressBar`       | `title` `value` `low-value` `high-value` |
//! | `DropdownField`     | `label` `choices="a,b,c"` `index` |
//! | `RadioButton`       | `label` `text` `value` |
//! | `RadioButtonGroup`  | `label` `choices` `value`, `RadioButton` children |
//! | `ListView`          | `item-count` `item-height` `selection-type` |
//! | `TwoPaneSplitView`  | `fixed-pane-index` `fixed-pane-initial-dimension` `orientation` |
//! | `Vector3Field`      | `label` `x` `y` `z` |
//! | `BoundsField`       | `label` `cx` `cy` `cz` `ex` `ey` `ez` |
//! | `RepeatButton`      | `text` `delay` `interval` |
//!
//! `value` and `index` are applied after the other attributes so that ranges
//! and choices are in place before the value is clamped against them.

use std::str::FromStr;

use tessel_core::{
    Bounds, FieldValue, Orientation, Result, TesselError, TimingConfig, WidgetConfig,
};

use crate::compound::{BoundsField, Vector3Field};
use crate::list_view::{ListView, SelectionType};
use crate::markup::{parse_markup, MarkupElement};
use crate::numeric::{NumericField, NumericValue};
use crate::popup::DropdownField;
use crate::progress::ProgressBar;
use crate::radio::{RadioButton, RadioButtonGroup};
use crate::repeat::RepeatButton;
use crate::slider::BaseSlider;
use crate::splitter::TwoPaneSplitView;
use crate::toggle::Toggle;
use crate::widget::{ValueWidget, Widget};

/// Attributes applied after all others
const DEFERRED_ATTRIBUTES: [&str; 2] = ["value", "index"];

/// A widget that can be described by a markup element
pub trait MarkupWidget: Sized {
    const TAG: &'static str;

    /// Widget with every attribute at its default
    fn create(config: &WidgetConfig) -> Self;

    /// Apply one attribute by name
    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()>;

    /// Element carrying the widget's non-default attributes
    fn to_element(&self) -> MarkupElement;

    /// Build from an element; children are rejected unless the widget overrides this
    fn from_element(element: &MarkupElement, config: &WidgetConfig) -> Result<Self> {
        if let Some(child) = element.children.first() {
            return Err(TesselError::UnexpectedChild {
                parent: element.tag.clone(),
                child: child.tag.clone(),
            });
        }
        let mut widget = Self::create(config);
        apply_attributes(&mut widget, element, false)?;
        apply_attributes(&mut widget, element, true)?;
        Ok(widget)
    }
}

/// Apply either the deferred or the regular attributes of `element`
fn apply_attributes<W: MarkupWidget>(widget: &mut W, element: &MarkupElement, deferred: bool) -> Result<()> {
    for (name, value) in &element.attributes {
        if DEFERRED_ATTRIBUTES.contains(&name.as_str()) == deferred {
            widget.set_attribute(name, value)?;
        }
    }
    Ok(())
}

// ============================================================================
// Attribute conversion
// ============================================================================

fn parse_attr<T: FromStr>(tag: &str, name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TesselError::invalid_attribute(tag, name, value))
}

fn parse_bool(tag: &str, name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(TesselError::invalid_attribute(tag, name, value)),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_orientation(tag: &str, name: &str, value: &str) -> Result<Orientation> {
    Orientation::parse(value).ok_or_else(|| TesselError::invalid_attribute(tag, name, value))
}

/// `None` for an empty value or `-1`
fn parse_index(tag: &str, name: &str, value: &str) -> Result<Option<usize>> {
    match value.trim() {
        "" | "-1" => Ok(None),
        other => parse_attr(tag, name, other).map(Some),
    }
}

fn put(element: &mut MarkupElement, name: &str, value: impl ToString, include: bool) {
    if include {
        element.set_attribute(name, value.to_string());
    }
}

// ============================================================================
// Widget implementations
// ============================================================================

impl MarkupWidget for Toggle {
    const TAG: &'static str = "Toggle";

    fn create(config: &WidgetConfig) -> Self {
        Toggle::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "label" => self.set_label(value),
            "text" => self.set_text(Some(value.to_string())),
            "value" => self.set_value_without_notify(parse_bool(Self::TAG, name, value)?),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        if let Some(text) = self.text() {
            e.set_attribute("text", text);
        }
        put(&mut e, "value", self.value(), self.value());
        e
    }
}

/// Markup tag of each numeric field type
pub trait NumericTag: NumericValue + FromStr {
    const FIELD_TAG: &'static str;
}

macro_rules! impl_numeric_tag {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(impl NumericTag for $ty {
            const FIELD_TAG: &'static str = $tag;
        })*
    };
}

impl_numeric_tag!(
    i32 => "IntegerField",
    i64 => "LongField",
    u32 => "UnsignedIntegerField",
    u64 => "UnsignedLongField",
    f32 => "FloatField",
    f64 => "DoubleField",
);

impl<T: NumericTag> MarkupWidget for NumericField<T> {
    const TAG: &'static str = T::FIELD_TAG;

    fn create(config: &WidgetConfig) -> Self {
        NumericField::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "label" => self.set_label(value),
            "value" => self.set_value_without_notify(parse_attr(Self::TAG, name, value)?),
            "is-delayed" => self.set_delayed(parse_bool(Self::TAG, name, value)?),
            "range" => {
                let bounds: Vec<&str> = value.split(',').collect();
                let [lo, hi] = bounds.as_slice() else {
                    return Err(TesselError::invalid_attribute(Self::TAG, name, value));
                };
                let lo = parse_attr(Self::TAG, name, lo)?;
                let hi = parse_attr(Self::TAG, name, hi)?;
                self.set_range(Some((lo, hi)));
            }
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        if let Some((lo, hi)) = self.range() {
            e.set_attribute("range", format!("{},{}", lo.display(), hi.display()));
        }
        put(&mut e, "is-delayed", true, self.is_delayed());
        let value = self.value();
        put(&mut e, "value", value.display(), !value.same_value(&T::default()));
        e
    }
}

macro_rules! impl_slider_markup {
    ($($ty:ty => $tag:literal, $high:expr);* $(;)?) => {
        $(impl MarkupWidget for BaseSlider<$ty> {
            const TAG: &'static str = $tag;

            fn create(config: &WidgetConfig) -> Self {
                BaseSlider::new("", <$ty>::default(), $high).with_config(config)
            }

            fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
                match name {
                    "label" => self.set_label(value),
                    "value" => self.set_value_without_notify(parse_attr(Self::TAG, name, value)?),
                    "low-value" => self.set_low_value(parse_attr(Self::TAG, name, value)?),
                    "high-value" => self.set_high_value(parse_attr(Self::TAG, name, value)?),
                    "page-size" => self.set_page_size(parse_attr(Self::TAG, name, value)?),
                    "direction" => self.set_orientation(parse_orientation(Self::TAG, name, value)?),
                    "inverted" => self.set_inverted(parse_bool(Self::TAG, name, value)?),
                    _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
                }
                Ok(())
            }

            fn to_element(&self) -> MarkupElement {
                let mut e = MarkupElement::new(Self::TAG);
                put(&mut e, "label", self.label(), !self.label().is_empty());
                put(&mut e, "low-value", self.low_value(), self.low_value() != <$ty>::default());
                put(&mut e, "high-value", self.high_value(), self.high_value() != $high);
                put(&mut e, "page-size", self.page_size(), self.page_size() != 0.0);
                put(
                    &mut e,
                    "direction",
                    self.orientation().as_str(),
                    self.orientation() != Orientation::Horizontal,
                );
                put(&mut e, "inverted", true, self.inverted());
                let value = self.value();
                put(&mut e, "value", value.display(), !value.same_value(&self.low_value()));
                e
            }
        })*
    };
}

impl_slider_markup!(
    f32 => "Slider", 10.0;
    i32 => "SliderInt", 10;
);

impl MarkupWidget for ProgressBar {
    const TAG: &'static str = "ProgressBar";

    fn create(config: &WidgetConfig) -> Self {
        ProgressBar::new().with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "title" => self.set_title(value),
            "value" => self.field().set_value_without_notify(parse_attr(Self::TAG, name, value)?),
            "low-value" => self.set_low_value(parse_attr(Self::TAG, name, value)?),
            "high-value" => self.set_high_value(parse_attr(Self::TAG, name, value)?),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "title", self.title(), !self.title().is_empty());
        put(&mut e, "low-value", self.low_value(), self.low_value() != 0.0);
        put(&mut e, "high-value", self.high_value(), self.high_value() != 100.0);
        put(&mut e, "value", self.value(), self.value() != 0.0);
        e
    }
}

impl MarkupWidget for DropdownField {
    const TAG: &'static str = "DropdownField";

    fn create(config: &WidgetConfig) -> Self {
        DropdownField::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "label" => self.set_label(value),
            "choices" => self.set_choices(parse_list(value)),
            "index" => {
                let index = parse_index(Self::TAG, name, value)?;
                if index.is_some_and(|i| i >= self.choices().len()) {
                    return Err(TesselError::invalid_attribute(Self::TAG, name, value));
                }
                let choice = index.and_then(|i| self.choices().get(i).cloned());
                self.set_value_without_notify(choice.unwrap_or_default());
            }
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        put(&mut e, "choices", self.choices().join(","), !self.choices().is_empty());
        if let Some(index) = self.index() {
            e.set_attribute("index", index.to_string());
        }
        e
    }
}

impl MarkupWidget for RadioButton {
    const TAG: &'static str = "RadioButton";

    fn create(config: &WidgetConfig) -> Self {
        RadioButton::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "label" => self.set_label(value),
            "text" => self.set_text(Some(value.to_string())),
            "value" => self.set_value_without_notify(parse_bool(Self::TAG, name, value)?),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        if let Some(text) = self.text() {
            e.set_attribute("text", text);
        }
        put(&mut e, "value", true, self.value());
        e
    }
}

impl MarkupWidget for RadioButtonGroup {
    const TAG: &'static str = "RadioButtonGroup";

    fn create(config: &WidgetConfig) -> Self {
        RadioButtonGroup::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "label" => self.set_label(value),
            "choices" => self.set_choices(parse_list(value)),
            "value" => {
                let index = parse_index(Self::TAG, name, value)?;
                if index.is_some_and(|i| i >= self.options().len()) {
                    return Err(TesselError::invalid_attribute(Self::TAG, name, value));
                }
                self.set_value_without_notify(index);
            }
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        if self.has_explicit_options() {
            e.children = self.options().iter().map(RadioButton::to_element).collect();
        } else {
            put(&mut e, "choices", self.choices().join(","), !self.options().is_empty());
        }
        if let Some(index) = self.value() {
            e.set_attribute("value", index.to_string());
        }
        e
    }

    fn from_element(element: &MarkupElement, config: &WidgetConfig) -> Result<Self> {
        let mut group = Self::create(config);
        apply_attributes(&mut group, element, false)?;
        for child in &element.children {
            if child.tag != RadioButton::TAG {
                return Err(TesselError::UnexpectedChild {
                    parent: element.tag.clone(),
                    child: child.tag.clone(),
                });
            }
            group.register_option(AnyWidget::RadioButton(RadioButton::from_element(child, config)?));
        }
        apply_attributes(&mut group, element, true)?;
        Ok(group)
    }
}

impl MarkupWidget for ListView {
    const TAG: &'static str = "ListView";

    fn create(config: &WidgetConfig) -> Self {
        ListView::default().with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "item-count" => self.set_item_count(parse_attr(Self::TAG, name, value)?),
            "item-height" => self.set_item_height(parse_attr(Self::TAG, name, value)?),
            "selection-type" => self.set_selection_type(
                SelectionType::parse(value)
                    .ok_or_else(|| TesselError::invalid_attribute(Self::TAG, name, value))?,
            ),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let defaults = ListView::default();
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "item-count", self.item_count(), self.item_count() != 0);
        put(
            &mut e,
            "item-height",
            self.item_height(),
            self.item_height() != defaults.item_height(),
        );
        put(
            &mut e,
            "selection-type",
            self.selection_type().as_str(),
            self.selection_type() != SelectionType::default(),
        );
        e
    }
}

impl MarkupWidget for TwoPaneSplitView {
    const TAG: &'static str = "TwoPaneSplitView";

    fn create(config: &WidgetConfig) -> Self {
        TwoPaneSplitView::default().with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "fixed-pane-index" => {
                let index: usize = parse_attr(Self::TAG, name, value)?;
                if index > 1 {
                    return Err(TesselError::invalid_attribute(Self::TAG, name, value));
                }
                self.set_fixed_pane_index(index);
            }
            "fixed-pane-initial-dimension" => {
                self.set_fixed_pane_initial_dimension(parse_attr(Self::TAG, name, value)?)
            }
            "orientation" => self.set_orientation(parse_orientation(Self::TAG, name, value)?),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let defaults = TwoPaneSplitView::default();
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "fixed-pane-index", self.fixed_pane_index(), self.fixed_pane_index() != 0);
        put(
            &mut e,
            "fixed-pane-initial-dimension",
            self.fixed_pane_initial_dimension(),
            self.fixed_pane_initial_dimension() != defaults.fixed_pane_initial_dimension(),
        );
        put(
            &mut e,
            "orientation",
            self.orientation().as_str(),
            self.orientation() != defaults.orientation(),
        );
        e
    }
}

impl MarkupWidget for Vector3Field {
    const TAG: &'static str = "Vector3Field";

    fn create(config: &WidgetConfig) -> Self {
        Vector3Field::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        let mut v = self.value();
        match name {
            "label" => {
                self.set_label(value);
                return Ok(());
            }
            "x" => v.x = parse_attr(Self::TAG, name, value)?,
            "y" => v.y = parse_attr(Self::TAG, name, value)?,
            "z" => v.z = parse_attr(Self::TAG, name, value)?,
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        self.set_value_without_notify(v);
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        let v = self.value();
        for (name, component) in [("x", v.x), ("y", v.y), ("z", v.z)] {
            put(&mut e, name, component, component != 0.0);
        }
        e
    }
}

impl MarkupWidget for BoundsField {
    const TAG: &'static str = "BoundsField";

    fn create(config: &WidgetConfig) -> Self {
        BoundsField::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        if name == "label" {
            self.set_label(value);
            return Ok(());
        }
        let Bounds {
            mut center,
            mut extents,
        } = self.value();
        let slot = match name {
            "cx" => &mut center.x,
            "cy" => &mut center.y,
            "cz" => &mut center.z,
            "ex" => &mut extents.x,
            "ey" => &mut extents.y,
            "ez" => &mut extents.z,
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        };
        *slot = parse_attr(Self::TAG, name, value)?;
        self.set_value_without_notify(Bounds::new(center, extents));
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "label", self.label(), !self.label().is_empty());
        let b = self.value();
        let parts = [
            ("cx", b.center.x),
            ("cy", b.center.y),
            ("cz", b.center.z),
            ("ex", b.extents.x),
            ("ey", b.extents.y),
            ("ez", b.extents.z),
        ];
        for (name, component) in parts {
            put(&mut e, name, component, component != 0.0);
        }
        e
    }
}

impl MarkupWidget for RepeatButton {
    const TAG: &'static str = "RepeatButton";

    fn create(config: &WidgetConfig) -> Self {
        RepeatButton::new("").with_config(config)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "text" => self.set_text(value),
            "delay" => self.set_timing(parse_attr(Self::TAG, name, value)?, self.interval_ms()),
            "interval" => self.set_timing(self.delay_ms(), parse_attr(Self::TAG, name, value)?),
            _ => return Err(TesselError::unknown_attribute(Self::TAG, name)),
        }
        Ok(())
    }

    fn to_element(&self) -> MarkupElement {
        let timing = TimingConfig::default();
        let mut e = MarkupElement::new(Self::TAG);
        put(&mut e, "text", self.text(), !self.text().is_empty());
        put(&mut e, "delay", self.delay_ms(), self.delay_ms() != timing.repeat_delay_ms);
        put(
            &mut e,
            "interval",
            self.interval_ms(),
            self.interval_ms() != timing.repeat_interval_ms,
        );
        e
    }
}

// ============================================================================
// AnyWidget
// ============================================================================

macro_rules! any_widget {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Any widget the factory can build
        pub enum AnyWidget {
            $($variant($ty),)*
        }

        impl AnyWidget {
            /// Markup tag of the widget
            pub fn tag(&self) -> &'static str {
                match self {
                    $(AnyWidget::$variant(_) => <$ty as MarkupWidget>::TAG,)*
                }
            }

            pub fn to_element(&self) -> MarkupElement {
                match self {
                    $(AnyWidget::$variant(w) => w.to_element(),)*
                }
            }
        }

        fn build_element(element: &MarkupElement, config: &WidgetConfig) -> Result<AnyWidget> {
            match element.tag.as_str() {
                $(tag if tag == <$ty as MarkupWidget>::TAG => {
                    Ok(AnyWidget::$variant(<$ty as MarkupWidget>::from_element(element, config)?))
                })*
                other => Err(TesselError::UnknownTag(other.to_string())),
            }
        }

        /// Every tag the factory knows
        pub const WIDGET_TAGS: &[&str] = &[$(<$ty as MarkupWidget>::TAG),*];
    };
}

any_widget!(
    Toggle(Toggle),
    IntegerField(NumericField<i32>),
    LongField(NumericField<i64>),
    UnsignedIntegerField(NumericField<u32>),
    UnsignedLongField(NumericField<u64>),
    FloatField(NumericField<f32>),
    DoubleField(NumericField<f64>),
    Slider(BaseSlider<f32>),
    SliderInt(BaseSlider<i32>),
    ProgressBar(ProgressBar),
    DropdownField(DropdownField),
    RadioButton(RadioButton),
    RadioButtonGroup(RadioButtonGroup),
    ListView(ListView),
    TwoPaneSplitView(TwoPaneSplitView),
    Vector3Field(Vector3Field),
    BoundsField(BoundsField),
    RepeatButton(RepeatButton),
);

impl AnyWidget {
    /// The widget as an input handler; progress bars take no input
    pub fn as_widget_mut(&mut self) -> Option<&mut dyn Widget> {
        let widget: &mut dyn Widget = match self {
            AnyWidget::Toggle(w) => w,
            AnyWidget::IntegerField(w) => w,
            AnyWidget::LongField(w) => w,
            AnyWidget::UnsignedIntegerField(w) => w,
            AnyWidget::UnsignedLongField(w) => w,
            AnyWidget::FloatField(w) => w,
            AnyWidget::DoubleField(w) => w,
            AnyWidget::Slider(w) => w,
            AnyWidget::SliderInt(w) => w,
            AnyWidget::DropdownField(w) => w,
            AnyWidget::RadioButton(w) => w,
            AnyWidget::RadioButtonGroup(w) => w,
            AnyWidget::ListView(w) => w,
            AnyWidget::TwoPaneSplitView(w) => w,
            AnyWidget::Vector3Field(w) => w,
            AnyWidget::BoundsField(w) => w,
            AnyWidget::RepeatButton(w) => w,
            AnyWidget::ProgressBar(_) => return None,
        };
        Some(widget)
    }

    /// One-line description: tag, label and displayed value
    pub fn summary(&self) -> String {
        let (label, value) = match self {
            AnyWidget::Toggle(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::IntegerField(w) => (w.label().to_string(), w.text()),
            AnyWidget::LongField(w) => (w.label().to_string(), w.text()),
            AnyWidget::UnsignedIntegerField(w) => (w.label().to_string(), w.text()),
            AnyWidget::UnsignedLongField(w) => (w.label().to_string(), w.text()),
            AnyWidget::FloatField(w) => (w.label().to_string(), w.text()),
            AnyWidget::DoubleField(w) => (w.label().to_string(), w.text()),
            AnyWidget::Slider(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::SliderInt(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::ProgressBar(w) => (w.title().to_string(), w.field().display_text()),
            AnyWidget::DropdownField(w) => (w.label().to_string(), w.text()),
            AnyWidget::RadioButton(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::RadioButtonGroup(w) => {
                let selected = w.value().and_then(|i| w.choices().get(i).map(|c| c.to_string()));
                (w.label().to_string(), selected.unwrap_or_default())
            }
            AnyWidget::ListView(w) => (String::new(), format!("{} items", w.item_count())),
            AnyWidget::TwoPaneSplitView(w) => (String::new(), format!("{}px", w.fixed_dimension())),
            AnyWidget::Vector3Field(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::BoundsField(w) => (w.label().to_string(), w.field().display_text()),
            AnyWidget::RepeatButton(w) => (w.text().to_string(), String::new()),
        };
        match (label.is_empty(), value.is_empty()) {
            (true, true) => self.tag().to_string(),
            (true, false) => format!("{} = {value}", self.tag()),
            (false, true) => format!("{} \"{label}\"", self.tag()),
            (false, false) => format!("{} \"{label}\" = {value}", self.tag()),
        }
    }
}

// ============================================================================
// WidgetFactory
// ============================================================================

/// Builds widgets from markup with a shared configuration
#[derive(Debug, Default)]
pub struct WidgetFactory {
    config: WidgetConfig,
}

impl WidgetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WidgetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn tags(&self) -> &'static [&'static str] {
        WIDGET_TAGS
    }

    pub fn build(&self, element: &MarkupElement) -> Result<AnyWidget> {
        let widget = build_element(element, &self.config)?;
        tracing::debug!(tag = widget.tag(), "widget built from markup");
        Ok(widget)
    }

    pub fn build_all(&self, elements: &[MarkupElement]) -> Result<Vec<AnyWidget>> {
        elements.iter().map(|e| self.build(e)).collect()
    }

    /// Parse markup text and build every top-level element
    pub fn build_markup(&self, text: &str) -> Result<Vec<AnyWidget>> {
        self.build_all(&parse_markup(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_one(text: &str) -> Result<AnyWidget> {
        let mut widgets = WidgetFactory::new().build_markup(text)?;
        assert_eq!(widgets.len(), 1);
        Ok(widgets.remove(0))
    }

    #[test]
    fn test_round_trip_keeps_non_default_attributes() {
        let cases = [
            r#"<Toggle label="Enabled" text="On" value="true"/>"#,
            r#"<FloatField label="Scale" range="0,100" is-delayed="true" value="2.5"/>"#,
            r#"<UnsignedLongField value="18446744073709551615"/>"#,
            r#"<Slider label="Volume" low-value="-5" high-value="5" page-size="1" direction="vertical" inverted="true" value="2"/>"#,
            r#"<SliderInt high-value="3" value="2"/>"#,
            r#"<ProgressBar title="Loading" high-value="10" value="4"/>"#,
            r#"<DropdownField label="Quality" choices="Low,High" index="1"/>"#,
            r#"<RadioButtonGroup label="Shape" choices="Circle,Square" value="0"/>"#,
            r#"<ListView item-count="40" item-height="18" selection-type="multiple"/>"#,
            r#"<TwoPaneSplitView fixed-pane-index="1" fixed-pane-initial-dimension="250" orientation="vertical"/>"#,
            r#"<Vector3Field label="Position" x="1" z="-2.5"/>"#,
            r#"<BoundsField cx="1" ey="4"/>"#,
            r#"<RepeatButton text="+" delay="400" interval="60"/>"#,
        ];
        for text in cases {
            let parsed = parse_markup(text).unwrap();
            let source = &parsed[0];
            let widget = build_one(text).unwrap();
            let element = widget.to_element();
            assert_eq!(element.tag, source.tag);
            assert_eq!(element.attributes.len(), source.attributes.len(), "{text}");
            for (name, value) in &source.attributes {
                assert_eq!(element.attribute(name), Some(value.as_str()), "{text}: {name}");
            }
        }
    }

    #[test]
    fn test_default_widget_has_no_attributes() {
        for tag in WIDGET_TAGS {
            let widget = build_one(&format!("<{tag}/>")).unwrap();
            assert!(widget.to_element().attributes.is_empty(), "{tag}");
        }
    }

    #[test]
    fn test_value_applies_after_range() {
        let widget = build_one(r#"<Slider value="50" high-value="100"/>"#).unwrap();
        let AnyWidget::Slider(slider) = widget else {
            panic!("expected a slider");
        };
        assert_eq!(slider.value(), 50.0);
    }

    #[test]
    fn test_radio_children() {
        let text = r#"<RadioButtonGroup value="1">
            <RadioButton text="A"/>
            <RadioButton text="B"/>
        </RadioButtonGroup>"#;
        let widget = build_one(text).unwrap();
        let element = widget.to_element();
        assert_eq!(element.children.len(), 2);
        assert_eq!(element.children[1].attribute("value"), Some("true"));
        assert_eq!(widget.summary(), "RadioButtonGroup = B");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(build_one("<Canvas/>"), Err(TesselError::UnknownTag(t)) if t == "Canvas"));
        assert!(matches!(
            build_one(r#"<Toggle colour="red"/>"#),
            Err(TesselError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            build_one(r#"<IntegerField value="many"/>"#),
            Err(TesselError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            build_one(r#"<TwoPaneSplitView fixed-pane-index="2"/>"#),
            Err(TesselError::InvalidAttribute { .. })
        ));
        assert!(matches!(
            build_one("<RadioButtonGroup><Toggle/></RadioButtonGroup>"),
            Err(TesselError::UnexpectedChild { .. })
        ));
        assert!(matches!(
            build_one("<Toggle><Toggle/></Toggle>"),
            Err(TesselError::UnexpectedChild { .. })
        ));
    }

    #[test]
    fn test_summary() {
        let widget = build_one(r#"<Slider label="Volume" value="2.5"/>"#).unwrap();
        assert_eq!(widget.summary(), "Slider \"Volume\" = 2.5");
        let widget = build_one(r#"<ListView item-count="3"/>"#).unwrap();
        assert_eq!(widget.summary(), "ListView = 3 items");
    }
}
