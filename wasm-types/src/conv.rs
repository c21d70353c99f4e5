//! Exhaustive value conversions: wrap/extend, demote/promote,
//! convert, trunc (trapping and saturating), and bit reinterpretation.
//!
//! Every operation here is a distinct named function with a fixed trap
//! profile and rounding mode, matching the Core Spec's numeric
//! instruction set rather than a generic `as`-cast helper. Grounded on
//! `original_source/.../types/conversions.hpp`, which is the only
//! source that states the canonical trunc bounds as exact constants
//! instead of prose.

use crate::error::{Error, ErrorCode, Location};
use crate::Result;

/// Truncate an `i64` to its low 32 bits. Never traps.
#[must_use]
pub const fn i32_wrap_i64(x: i64) -> i32 {
    x as i32
}

/// Sign-extend an `i32` to `i64`. Never traps.
#[must_use]
pub const fn i64_extend_i32_s(x: i32) -> i64 {
    x as i64
}

/// Zero-extend an `i32` to `i64`, treating it as unsigned. Never traps.
#[must_use]
pub const fn i64_extend_i32_u(x: i32) -> i64 {
    (x as u32) as i64
}

/// Round an `f64` to the nearest `f32`, ties to even. Infinities and
/// NaNs pass through; finite overflow becomes an infinity. Never
/// traps.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn f32_demote_f64(x: f64) -> f32 {
    x as f32
}

/// Widen an `f32` to `f64`. Exact: every `f32` value has a precise
/// `f64` representation. Never traps.
#[must_use]
pub const fn f64_promote_f32(x: f32) -> f64 {
    x as f64
}

/// Convert a signed `i32` to the nearest `f32`, ties to even. Never
/// traps.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f32_convert_i32_s(x: i32) -> f32 {
    x as f32
}

/// Convert an `i32`, treated as unsigned, to the nearest `f32`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f32_convert_i32_u(x: i32) -> f32 {
    (x as u32) as f32
}

/// Convert a signed `i64` to the nearest `f32`. For large magnitudes
/// this loses precision by design, as the Core Spec permits.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f32_convert_i64_s(x: i64) -> f32 {
    x as f32
}

/// Convert an `i64`, treated as unsigned, to the nearest `f32`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f32_convert_i64_u(x: i64) -> f32 {
    (x as u64) as f32
}

/// Convert a signed `i32` to the exact `f64`.
#[must_use]
pub const fn f64_convert_i32_s(x: i32) -> f64 {
    x as f64
}

/// Convert an `i32`, treated as unsigned, to the exact `f64`.
#[must_use]
pub const fn f64_convert_i32_u(x: i32) -> f64 {
    (x as u32) as f64
}

/// Convert a signed `i64` to the nearest `f64`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f64_convert_i64_s(x: i64) -> f64 {
    x as f64
}

/// Convert an `i64`, treated as unsigned, to the nearest `f64`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f64_convert_i64_u(x: i64) -> f64 {
    (x as u64) as f64
}

/// A truncation range, with each end independently marked inclusive or
/// exclusive — the two ends are not symmetric. A bound's `hi` may be
/// either the largest *accepted* value (inclusive) or the smallest
/// *rejected* one (exclusive), and which applies depends on whether
/// the canonical integer-range edge happens to be exactly
/// representable in the source float type.
struct TruncBound<T> {
    lo: T,
    lo_inclusive: bool,
    hi: T,
    hi_inclusive: bool,
}

fn in_trunc_range<T: PartialOrd + Copy>(x: T, bound: &TruncBound<T>) -> bool {
    let lo_ok = if bound.lo_inclusive { x >= bound.lo } else { x > bound.lo };
    let hi_ok = if bound.hi_inclusive { x <= bound.hi } else { x < bound.hi };
    lo_ok && hi_ok
}

/// Canonical trunc bounds, as exact constants rather than values
/// derived from `i32::MAX`/`i64::MAX` at runtime (that derivation would
/// itself be float arithmetic subject to the rounding this table exists
/// to get right).
mod bounds {
    use super::TruncBound;

    // i32 from f32: f32 has 24 bits of mantissa, so 2^31 - 128 (not
    // 2^31 - 1) is the largest i32 magnitude exactly representable —
    // it is itself a valid, accepted bound. -2^31 is exactly
    // representable too (a power of two), and is the accepted i32::MIN
    // edge.
    pub const I32_F32_S: TruncBound<f32> = TruncBound {
        lo: -2_147_483_648.0,
        lo_inclusive: true,
        hi: 2_147_483_520.0,
        hi_inclusive: true,
    };
    pub const I32_F32_U: TruncBound<f32> = TruncBound {
        lo: 0.0,
        lo_inclusive: true,
        hi: 4_294_967_040.0,
        hi_inclusive: true,
    };

    // i32 from f64: f64 exactly represents every integer up to 2^53,
    // so the true i32 range edges (2^31, -2^31 - 1, 2^32, -1) are
    // themselves exactly representable, and are the first *rejected*
    // values on each side.
    pub const I32_F64_S: TruncBound<f64> = TruncBound {
        lo: -2_147_483_649.0,
        lo_inclusive: false,
        hi: 2_147_483_648.0,
        hi_inclusive: false,
    };
    pub const I32_F64_U: TruncBound<f64> = TruncBound {
        lo: -1.0,
        lo_inclusive: false,
        hi: 4_294_967_296.0,
        hi_inclusive: false,
    };

    // i64 from f32/f64: 2^63 and -2^63 are both exactly representable
    // (powers of two) in either float type. -2^63 is itself i64::MIN
    // and is accepted; 2^63 is one past i64::MAX and is rejected.
    pub const I64_F32_S: TruncBound<f32> = TruncBound {
        lo: -9_223_372_036_854_775_808.0,
        lo_inclusive: true,
        hi: 9_223_372_036_854_775_808.0,
        hi_inclusive: false,
    };
    pub const I64_F32_U: TruncBound<f32> = TruncBound {
        lo: -1.0,
        lo_inclusive: false,
        hi: 18_446_744_073_709_551_616.0,
        hi_inclusive: false,
    };

    pub const I64_F64_S: TruncBound<f64> = TruncBound {
        lo: -9_223_372_036_854_775_808.0,
        lo_inclusive: true,
        hi: 9_223_372_036_854_775_808.0,
        hi_inclusive: false,
    };
    pub const I64_F64_U: TruncBound<f64> = TruncBound {
        lo: -1.0,
        lo_inclusive: false,
        hi: 18_446_744_073_709_551_616.0,
        hi_inclusive: false,
    };
}

/// Trap if `x` is NaN, infinite, or falls outside `bound`.
fn check_trunc_range_f32(x: f32, bound: &TruncBound<f32>, dest: ErrorCode) -> Result<()> {
    if x.is_nan() || x.is_infinite() || !in_trunc_range(x, bound) {
        return Err(Error::new(dest, "float-to-int truncation out of range")
            .at(Location::at(0)));
    }
    Ok(())
}

fn check_trunc_range_f64(x: f64, bound: &TruncBound<f64>, dest: ErrorCode) -> Result<()> {
    if x.is_nan() || x.is_infinite() || !in_trunc_range(x, bound) {
        return Err(Error::new(dest, "float-to-int truncation out of range")
            .at(Location::at(0)));
    }
    Ok(())
}

/// Truncate an `f32` toward zero to a signed `i32`. Traps (per
/// `ErrorCode::InvalidImmediate` for the "out of range" case) if `x` is
/// NaN, infinite, or outside the exact representable bound.
pub fn i32_trunc_f32_s(x: f32) -> Result<i32> {
    check_trunc_range_f32(x, &bounds::I32_F32_S, ErrorCode::InvalidImmediate)?;
    Ok(x as i32)
}

/// Truncate an `f32` toward zero to an unsigned `i32` (returned as
/// `i32` bit pattern).
pub fn i32_trunc_f32_u(x: f32) -> Result<i32> {
    check_trunc_range_f32(x, &bounds::I32_F32_U, ErrorCode::InvalidImmediate)?;
    Ok((x as u32) as i32)
}

/// Truncate an `f64` toward zero to a signed `i32`.
pub fn i32_trunc_f64_s(x: f64) -> Result<i32> {
    check_trunc_range_f64(x, &bounds::I32_F64_S, ErrorCode::InvalidImmediate)?;
    Ok(x as i32)
}

/// Truncate an `f64` toward zero to an unsigned `i32`.
pub fn i32_trunc_f64_u(x: f64) -> Result<i32> {
    check_trunc_range_f64(x, &bounds::I32_F64_U, ErrorCode::InvalidImmediate)?;
    Ok((x as u32) as i32)
}

/// Truncate an `f32` toward zero to a signed `i64`.
pub fn i64_trunc_f32_s(x: f32) -> Result<i64> {
    check_trunc_range_f32(x, &bounds::I64_F32_S, ErrorCode::InvalidImmediate)?;
    Ok(x as i64)
}

/// Truncate an `f32` toward zero to an unsigned `i64`.
pub fn i64_trunc_f32_u(x: f32) -> Result<i64> {
    check_trunc_range_f32(x, &bounds::I64_F32_U, ErrorCode::InvalidImmediate)?;
    Ok((x as u64) as i64)
}

/// Truncate an `f64` toward zero to a signed `i64`.
pub fn i64_trunc_f64_s(x: f64) -> Result<i64> {
    check_trunc_range_f64(x, &bounds::I64_F64_S, ErrorCode::InvalidImmediate)?;
    Ok(x as i64)
}

/// Truncate an `f64` toward zero to an unsigned `i64`.
pub fn i64_trunc_f64_u(x: f64) -> Result<i64> {
    check_trunc_range_f64(x, &bounds::I64_F64_U, ErrorCode::InvalidImmediate)?;
    Ok((x as u64) as i64)
}

/// Saturating (non-trapping) variant of [`i32_trunc_f32_s`]: out-of-range
/// values saturate to `i32::MIN`/`i32::MAX`, NaN saturates to `0`.
#[must_use]
pub fn i32_trunc_sat_f32_s(x: f32) -> i32 {
    if x.is_nan() {
        0
    } else {
        x as i32
    }
}

/// Saturating variant of [`i32_trunc_f32_u`].
#[must_use]
pub fn i32_trunc_sat_f32_u(x: f32) -> i32 {
    if x.is_nan() || x < 0.0 {
        0
    } else {
        (x as u32) as i32
    }
}

/// Saturating variant of [`i32_trunc_f64_s`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn i32_trunc_sat_f64_s(x: f64) -> i32 {
    if x.is_nan() {
        0
    } else {
        x as i32
    }
}

/// Saturating variant of [`i32_trunc_f64_u`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn i32_trunc_sat_f64_u(x: f64) -> i32 {
    if x.is_nan() || x < 0.0 {
        0
    } else {
        (x as u32) as i32
    }
}

/// Saturating variant of [`i64_trunc_f32_s`].
#[must_use]
pub fn i64_trunc_sat_f32_s(x: f32) -> i64 {
    if x.is_nan() {
        0
    } else {
        x as i64
    }
}

/// Saturating variant of [`i64_trunc_f32_u`].
#[must_use]
pub fn i64_trunc_sat_f32_u(x: f32) -> i64 {
    if x.is_nan() || x < 0.0 {
        0
    } else {
        (x as u64) as i64
    }
}

/// Saturating variant of [`i64_trunc_f64_s`].
#[must_use]
pub fn i64_trunc_sat_f64_s(x: f64) -> i64 {
    if x.is_nan() {
        0
    } else {
        x as i64
    }
}

/// Saturating variant of [`i64_trunc_f64_u`].
#[must_use]
pub fn i64_trunc_sat_f64_u(x: f64) -> i64 {
    if x.is_nan() || x < 0.0 {
        0
    } else {
        (x as u64) as i64
    }
}

/// Reinterpret an `f32`'s bit pattern as `i32`. Never traps, preserves
/// NaN payloads exactly.
#[must_use]
pub const fn i32_reinterpret_f32(x: f32) -> i32 {
    x.to_bits() as i32
}

/// Reinterpret an `i32`'s bit pattern as `f32`.
#[must_use]
pub const fn f32_reinterpret_i32(x: i32) -> f32 {
    f32::from_bits(x as u32)
}

/// Reinterpret an `f64`'s bit pattern as `i64`.
#[must_use]
pub const fn i64_reinterpret_f64(x: f64) -> i64 {
    x.to_bits() as i64
}

/// Reinterpret an `i64`'s bit pattern as `f64`.
#[must_use]
pub const fn f64_reinterpret_i64(x: i64) -> f64 {
    f64::from_bits(x as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_extend_round_trip() {
        for x in [0i32, 1, -1, i32::MIN, i32::MAX, 12345, -98765] {
            assert_eq!(i32_wrap_i64(i64_extend_i32_s(x)), x);
            assert_eq!(i32_wrap_i64(i64_extend_i32_u(x)), x);
        }
    }

    #[test]
    fn reinterpret_round_trips_nan_payload() {
        let bits: u32 = 0x7FC0_0001;
        let f = f32_reinterpret_i32(bits as i32);
        assert_eq!(i32_reinterpret_f32(f) as u32, bits);

        let bits64: u64 = 0x7FF8_0000_0000_0001;
        let d = f64_reinterpret_i64(bits64 as i64);
        assert_eq!(i64_reinterpret_f64(d) as u64, bits64);
    }

    #[test]
    fn trunc_rejects_nan_and_infinity() {
        assert!(i32_trunc_f32_s(f32::NAN).is_err());
        assert!(i32_trunc_f32_s(f32::INFINITY).is_err());
        assert!(i32_trunc_f64_u(-1.0_f64).is_err());
    }

    #[test]
    fn trunc_accepts_canonical_bound() {
        assert_eq!(i32_trunc_f32_s(2_147_483_520.0).unwrap(), i32::MAX - 127);
        assert!(i32_trunc_f64_s(2_147_483_648.0).is_err());
    }

    #[test]
    fn trunc_sat_saturates_nan_to_zero() {
        assert_eq!(i32_trunc_sat_f32_s(f32::NAN), 0);
        assert_eq!(i64_trunc_sat_f64_u(f64::NAN), 0);
    }

    #[test]
    fn trunc_sat_saturates_out_of_range() {
        assert_eq!(i32_trunc_sat_f32_s(f32::INFINITY), i32::MAX);
        assert_eq!(i32_trunc_sat_f32_s(f32::NEG_INFINITY), i32::MIN);
    }

    #[test]
    fn demote_promote_are_not_mutual_inverses() {
        let x: f64 = 1.0 / 3.0;
        let demoted = f32_demote_f64(x);
        let promoted_back = f64_promote_f32(demoted);
        assert_ne!(promoted_back, x);

        let f: f32 = 1.5;
        assert_eq!(f32_demote_f64(f64_promote_f32(f)), f);
    }
}
