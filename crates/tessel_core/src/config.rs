//! Widget behavior configuration
//!
//! Tunables for drag sensitivity, timers and split view resizing. All values
//! have defaults, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! [drag]
//! sensitivity = 0.03
//! fast_multiplier = 4.0
//! slow_multiplier = 0.25
//!
//! [timing]
//! popup_open_delay_ms = 100
//! repeat_delay_ms = 250
//! repeat_interval_ms = 30
//!
//! [splitter]
//! decouple_tolerance = 10.0
//!
//! [field]
//! mixed_value_marker = "—"
//! notify_when_detached = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Complete widget configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub field: FieldConfig,
}

impl WidgetConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded widget configuration");
        Ok(config)
    }
}

/// Drag-scrub tuning for numeric fields
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DragConfig {
    /// Base value change per pixel, scaled by the value's magnitude
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Multiplier while the fast modifier (shift) is held
    #[serde(default = "default_fast_multiplier")]
    pub fast_multiplier: f32,
    /// Multiplier while the slow modifier (alt) is held
    #[serde(default = "default_slow_multiplier")]
    pub slow_multiplier: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            fast_multiplier: default_fast_multiplier(),
            slow_multiplier: default_slow_multiplier(),
        }
    }
}

fn default_sensitivity() -> f64 {
    0.03
}

fn default_fast_multiplier() -> f32 {
    4.0
}

fn default_slow_multiplier() -> f32 {
    0.25
}

/// Delays and intervals for scheduled widget actions
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Delay between pointer-down on a popup and the menu opening
    #[serde(default = "default_popup_open_delay")]
    pub popup_open_delay_ms: u64,
    /// Delay before a held repeat action starts repeating
    #[serde(default = "default_repeat_delay")]
    pub repeat_delay_ms: u64,
    /// Interval between repeats once repeating
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            popup_open_delay_ms: default_popup_open_delay(),
            repeat_delay_ms: default_repeat_delay(),
            repeat_interval_ms: default_repeat_interval(),
        }
    }
}

fn default_popup_open_delay() -> u64 {
    100
}

fn default_repeat_delay() -> u64 {
    250
}

fn default_repeat_interval() -> u64 {
    30
}

/// Split view resize tuning
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SplitterConfig {
    /// Distance in pixels the drag handle may trail the pointer before the
    /// resize gesture is ended
    #[serde(default = "default_decouple_tolerance")]
    pub decouple_tolerance: f32,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            decouple_tolerance: default_decouple_tolerance(),
        }
    }
}

fn default_decouple_tolerance() -> f32 {
    10.0
}

/// Defaults applied to every field
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    /// Text shown in place of a value while the mixed overlay is active
    #[serde(default = "default_mixed_marker")]
    pub mixed_value_marker: String,
    /// Raise change events even when the field is not attached to a tree
    #[serde(default)]
    pub notify_when_detached: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            mixed_value_marker: default_mixed_marker(),
            notify_when_detached: false,
        }
    }
}

fn default_mixed_marker() -> String {
    "\u{2014}".to_string()
}
