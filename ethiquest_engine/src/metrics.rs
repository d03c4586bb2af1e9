/// Numeric helpers shared across resolution and challenge logic.

/// Clamp a 0-100 scale value (satisfaction, reputation, market share).
pub fn clamp_scale(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Express `delta` as a signed percentage of `previous`.
///
/// Uses the absolute previous value so the sign of the result always
/// follows the sign of the delta; returns 0 when previous is 0.
pub fn percent_change(delta: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        delta / previous.abs() * 100.0
    }
}
