//! Answer normalization onto the canonical 1–6 scale.
//!
//! Question sources use different raw scales. Generic questions declare
//! their `scale_max`; the legacy source always answers on a fixed 1–4
//! scale and goes through [`remap_four_point`].

use crate::models::{NEUTRAL_SCORE, SCALE_MAX, SCALE_MIN};
use serde_json::Value;

/// Scale maximum of the legacy question source.
pub const LEGACY_SCALE_MAX: u32 = 4;

/// Affine map of a clamped value on `[1, max]` onto `[1, 6]`.
fn affine(raw: f64, max: f64) -> f64 {
    let clamped = raw.clamp(SCALE_MIN, max);
    SCALE_MIN + (clamped - SCALE_MIN) / (max - SCALE_MIN) * (SCALE_MAX - SCALE_MIN)
}

/// Normalize a raw value from a scale of `1..=max` onto `[1, 6]`.
///
/// The raw value is clamped to `[1, max]` first. A degenerate scale
/// (`max <= 1`) yields the neutral midpoint.
pub fn normalize(raw: f64, max: u32) -> f64 {
    if max <= 1 {
        return NEUTRAL_SCORE;
    }
    affine(raw, f64::from(max))
}

/// Normalize a value answered on the legacy fixed 1–4 scale.
pub fn remap_four_point(raw: f64) -> f64 {
    affine(raw, f64::from(LEGACY_SCALE_MAX))
}

/// Extract a numeric value from a raw JSON answer.
///
/// Numbers and numeric strings (decimal comma allowed) are accepted;
/// everything else, including non-finite numbers, yields `None`.
pub fn parse_raw_choice(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Whether a parsed value lies on the declared scale.
pub fn in_scale(value: f64, max: u32) -> bool {
    (SCALE_MIN..=f64::from(max.max(1))).contains(&value)
}
