//! Numeric helpers for per-frame code.

/// Linearly remap `input` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// With `clamp` the result stays inside the output range. A degenerate input
/// range maps everything to `out_min`.
///
/// ```
/// use prometheus_tickbus::util::map_range;
///
/// assert_eq!(map_range(5.0, 0.0, 10.0, 0.0, 100.0, false), 50.0);
/// assert_eq!(map_range(20.0, 0.0, 10.0, 0.0, 100.0, true), 100.0);
/// ```
#[must_use]
pub fn map_range(input: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32, clamp: bool) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let mapped = (input - in_min) / span * (out_max - out_min) + out_min;
    if !clamp {
        return mapped;
    }
    let (lo, hi) = if out_min <= out_max {
        (out_min, out_max)
    } else {
        (out_max, out_min)
    };
    mapped.clamp(lo, hi)
}
