use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All power and drive-speed arithmetic uses this type so aggregation is
/// bit-exact regardless of summation order.
pub type Fixed64 = I32F32;

/// Convert an f64 to Fixed64. Use only for initialization and config.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and renderer handoff.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
