//! Tolerant floating-point comparisons.

/// Relative tolerance used when comparing stored doubles.
pub const DOUBLE_COMPARE_TOLERANCE: f64 = f64::EPSILON * 5.0;

/// True when `x` is within [`DOUBLE_COMPARE_TOLERANCE`] of zero.
pub fn is_zero(x: f64) -> bool {
    x.abs() <= DOUBLE_COMPARE_TOLERANCE
}

/// True when `x` and `y` are equal up to a tolerance scaled by their magnitude.
pub fn is_equal(x: f64, y: f64) -> bool {
    (x - y).abs() <= DOUBLE_COMPARE_TOLERANCE * 1.0_f64.max(x.abs().max(y.abs()))
}
