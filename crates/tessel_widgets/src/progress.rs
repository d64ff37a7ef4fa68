//! Progress bar
//!
//! Displays a value between `low_value` and `high_value` as a fill. The value
//! itself is not clamped; only the fill is.

use tessel_core::{Field, Rect, WidgetConfig};

use crate::widget::{apply_field_config, set_field_attached};

pub struct ProgressBar {
    title: String,
    field: Field<f32>,
    low: f32,
    high: f32,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            field: Field::new(0.0),
            low: 0.0,
            high: 100.0,
        }
    }

    pub fn with_config(self, config: &WidgetConfig) -> Self {
        apply_field_config(&self.field, &config.field);
        self
    }

    /// Text drawn over the bar
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn low_value(&self) -> f32 {
        self.low
    }

    pub fn set_low_value(&mut self, low: f32) {
        self.low = low;
    }

    pub fn high_value(&self) -> f32 {
        self.high
    }

    pub fn set_high_value(&mut self, high: f32) {
        self.high = high;
    }

    pub fn field(&self) -> &Field<f32> {
        &self.field
    }

    pub fn value(&self) -> f32 {
        self.field.value()
    }

    pub fn set_value(&self, value: f32) -> bool {
        self.field.set_value(value)
    }

    pub fn set_attached(&mut self, attached: bool) {
        set_field_attached(&self.field, attached);
    }

    /// Filled fraction in `0..=1`
    pub fn fill_fraction(&self) -> f32 {
        let range = self.high - self.low;
        if range == 0.0 || !range.is_finite() {
            return 0.0;
        }
        ((self.field.value() - self.low) / range).clamp(0.0, 1.0)
    }

    /// Fill rectangle inside `background`, growing from the left edge
    pub fn fill_rect(&self, background: Rect) -> Rect {
        Rect::new(
            background.x(),
            background.y(),
            background.width() * self.fill_fraction(),
            background.height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_is_clamped_but_value_is_not() {
        let bar = ProgressBar::new();
        bar.set_value(150.0);
        assert_eq!(bar.value(), 150.0);
        assert_eq!(bar.fill_fraction(), 1.0);
        bar.set_value(-5.0);
        assert_eq!(bar.fill_fraction(), 0.0);
    }

    #[test]
    fn test_fill_rect() {
        let mut bar = ProgressBar::new();
        bar.set_low_value(10.0);
        bar.set_high_value(20.0);
        bar.set_value(12.5);
        let fill = bar.fill_rect(Rect::new(5.0, 5.0, 200.0, 10.0));
        assert_eq!(fill, Rect::new(5.0, 5.0, 50.0, 10.0));
    }

    #[test]
    fn test_empty_range() {
        let mut bar = ProgressBar::new();
        bar.set_high_value(0.0);
        bar.set_value(3.0);
        assert_eq!(bar.fill_fraction(), 0.0);
    }
}
