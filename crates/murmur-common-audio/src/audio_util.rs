//! Fixed-point sample conversions.
//!
//! Samples and window coefficients arrive as signed Q15 words (16-bit two's
//! complement, 15 fractional bits).

/// Scale of a Q15 word.
pub const Q15_SCALE: f32 = 32768.0;

/// Converts a Q15 word to a float in `[-1.0, 1.0)`.
#[inline]
pub fn q15_to_float(v: i16) -> f32 {
    f32::from(v) / Q15_SCALE
}

/// Converts a float to Q15, truncating toward zero and saturating at the
/// representable range.
#[inline]
pub fn float_to_q15(v: f32) -> i16 {
    // `as` saturates and maps NaN to zero.
    (v * Q15_SCALE) as i16
}

/// Reinterprets the low 16 bits of `raw` as a Q15 word.
#[inline]
pub fn q15_from_bits(raw: u32) -> i16 {
    (raw & 0xFFFF) as u16 as i16
}
