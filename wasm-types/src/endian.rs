//! Little-endian byte packing for the fixed-width numeric encodings.
//!
//! The Core Spec encodes `i32`/`i64`/`f32`/`f64` immediates (and the
//! `v128` lane bytes) as fixed-width little-endian integers; only the
//! LEB128 varints get special treatment, and those live in
//! `wasm-reader`. Grounded on `fuel-asm::conv`'s style of isolating
//! bit-packing behind small free functions rather than methods on a
//! byte-cursor type.

/// Decode a little-endian `u32` from exactly 4 bytes.
#[must_use]
pub const fn u32_from_le_bytes(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Decode a little-endian `u64` from exactly 8 bytes.
#[must_use]
pub const fn u64_from_le_bytes(bytes: [u8; 8]) -> u64 {
    u64::from_le_bytes(bytes)
}

/// Decode an IEEE-754 binary32 float from its little-endian bit pattern.
///
/// This is a bit-for-bit reinterpretation, never an arithmetic
/// conversion: NaN payloads and signalling bits survive untouched.
#[must_use]
pub const fn f32_from_le_bytes(bytes: [u8; 4]) -> f32 {
    f32::from_bits(u32::from_le_bytes(bytes))
}

/// Decode an IEEE-754 binary64 float from its little-endian bit pattern.
#[must_use]
pub const fn f64_from_le_bytes(bytes: [u8; 8]) -> f64 {
    f64::from_bits(u64::from_le_bytes(bytes))
}

/// Encode a `u32` as little-endian bytes.
#[must_use]
pub const fn u32_to_le_bytes(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encode a `u64` as little-endian bytes.
#[must_use]
pub const fn u64_to_le_bytes(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Encode an `f32` as its little-endian bit pattern.
#[must_use]
pub const fn f32_to_le_bytes(value: f32) -> [u8; 4] {
    value.to_bits().to_le_bytes()
}

/// Encode an `f64` as its little-endian bit pattern.
#[must_use]
pub const fn f64_to_le_bytes(value: f64) -> [u8; 8] {
    value.to_bits().to_le_bytes()
}

/// Split a `v128` lane payload into its sixteen constituent bytes,
/// little-endian within each lane as the Core Spec requires.
#[must_use]
pub const fn v128_to_le_bytes(value: u128) -> [u8; 16] {
    value.to_le_bytes()
}

/// Reassemble a `v128` from sixteen little-endian bytes.
#[must_use]
pub const fn v128_from_le_bytes(bytes: [u8; 16]) -> u128 {
    u128::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_u32() {
        let value = 0xDEAD_BEEFu32;
        assert_eq!(u32_from_le_bytes(u32_to_le_bytes(value)), value);
    }

    #[test]
    fn round_trips_f64_including_nan_bits() {
        let bits = 0x7FF8_0000_0000_0001u64;
        let value = f64_from_le_bytes(u64_to_le_bytes(bits));
        assert_eq!(value.to_bits(), bits);
    }

    #[test]
    fn little_endian_byte_order() {
        assert_eq!(u32_to_le_bytes(0x0102_0304), [0x04, 0x03, 0x02, 0x01]);
    }
}
