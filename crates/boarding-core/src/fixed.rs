use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All simulated time and every delay sample is carried in this type so a
/// run is bit-for-bit reproducible across platforms.
pub type Fixed64 = I32F32;

/// Simulated time and delays, in abstract time units.
pub type Time = Fixed64;

/// Convert an f64 to Fixed64, saturating at the representable range.
/// Use at the sampling boundary only, never for accumulation.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and reporting.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Clamp a sampled delay so it is never negative.
#[inline]
pub fn non_negative(v: Fixed64) -> Fixed64 {
    v.max(Fixed64::ZERO)
}

/// Subtract `step` from a delay counter, flooring at zero.
#[inline]
pub fn countdown(delay: Fixed64, step: Fixed64) -> Fixed64 {
    delay.saturating_sub(step).max(Fixed64::ZERO)
}

/// Whole time units of a delay, truncated. Used by the grid rendering.
#[inline]
pub fn whole_units(v: Fixed64) -> i64 {
    v.to_num::<i64>()
}
