//! Rounding helpers for values produced by pointer and keyboard input
//!
//! Pointer positions map onto value ranges with far more precision than the
//! user can meaningfully express. These helpers trim the result to the number
//! of decimals one pixel (or one drag step) can actually distinguish.

/// Number of decimals needed to represent steps of `min_difference`
///
/// Clamped to `0..=15`.
pub fn decimals_for_min_difference(min_difference: f64) -> u32 {
    if min_difference == 0.0 || !min_difference.is_finite() {
        return 0;
    }
    let decimals = -(min_difference.abs().log10().floor());
    decimals.clamp(0.0, 15.0) as u32
}

/// Round `value` to `decimals` places, halves away from zero
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Drop decimals smaller than the sixth significant digit
pub fn discard_least_significant_decimal(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let decimals = (5.0 - value.abs().log10()).clamp(0.0, 15.0) as u32;
    round_to_decimals(value, decimals)
}

/// Round `value` to the precision a step of `min_difference` can express
pub fn round_based_on_min_difference(value: f64, min_difference: f64) -> f64 {
    if min_difference == 0.0 {
        return discard_least_significant_decimal(value);
    }
    round_to_decimals(value, decimals_for_min_difference(min_difference))
}

/// Snap `value` to the nearest multiple of `step`
pub fn round_to_multiple_of(value: f64, step: f64) -> f64 {
    if step == 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Power of ten closest to `positive` in log space; `1` for non-positive input
pub fn closest_power_of_ten(positive: f64) -> f64 {
    if positive <= 0.0 || !positive.is_finite() {
        return 1.0;
    }
    10f64.powi(positive.log10().round() as i32)
}

/// Approximate float comparison tolerant of accumulated rounding error
pub fn approximately_f32(a: f32, b: f32) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}

/// `f64` counterpart of [`approximately_f32`]
pub fn approximately_f64(a: f64, b: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f64::EPSILON * 8.0)
}
