#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};

use wasm_types::error::{Error, ErrorCode, Location};
use wasm_types::Result;

/// A bounds-checked cursor over an immutable byte slice.
///
/// Every read method advances `pos` only on success; a failed read
/// leaves the cursor where it was, so callers can report the offset of
/// the failing read rather than the offset after it.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a byte slice for bounds-checked reading from the start.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The current byte offset from the start of the original slice.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.pos
    }

    /// The bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// `true` if no bytes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read exactly `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Borrow an absolute byte range of the underlying slice, ignoring
    /// the cursor position. Used to capture the exact bytes spanned by
    /// a multi-instruction construct (e.g. a constant expression)
    /// after the fact.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start..end]
    }

    /// Build the "unexpected end of input" error at the cursor's
    /// current position, logging it the way
    /// `wasm_types::error::reject` does for every other rejection in
    /// the workspace.
    fn eof(&self) -> Error {
        tracing::debug!(offset = self.pos, "rejecting input: unexpected end of input");
        Error::new(ErrorCode::UnexpectedEndOfFile, "unexpected end of input")
            .at(Location::at(self.pos))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(|| self.eof())?;
        let slice = self.data.get(self.pos..end).ok_or_else(|| self.eof())?;
        self.pos = end;
        Ok(slice)
    }

    /// Read one byte without advancing the cursor.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data.get(self.pos).copied().ok_or_else(|| self.eof())
    }

    /// Read one byte, advancing the cursor.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a fixed-width little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked above");
        Ok(wasm_types::endian::u32_from_le_bytes(bytes))
    }

    /// Read a fixed-width little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked above");
        Ok(wasm_types::endian::u64_from_le_bytes(bytes))
    }

    /// Read a fixed-width little-endian `f32` bit pattern.
    pub fn read_f32_le(&mut self) -> Result<f32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked above");
        Ok(wasm_types::endian::f32_from_le_bytes(bytes))
    }

    /// Read a fixed-width little-endian `f64` bit pattern.
    pub fn read_f64_le(&mut self) -> Result<f64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked above");
        Ok(wasm_types::endian::f64_from_le_bytes(bytes))
    }

    fn invalid_leb128(&self) -> Error {
        tracing::debug!(offset = self.pos, "rejecting input: malformed LEB128 integer");
        Error::new(ErrorCode::InvalidLEB128Encoding, "malformed LEB128 integer")
            .at(Location::at(self.pos))
    }

    /// Read an unsigned LEB128 integer targeting `bits` bits (32 or
    /// 64). Rejects encodings longer than `ceil(bits/7)` bytes and
    /// encodings whose terminating byte has non-zero unused high bits.
    fn read_uleb128(&mut self, bits: u32) -> Result<u64> {
        let max_bytes = (bits + 6) / 7;
        let mut result: u64 = 0;
        for i in 0..max_bytes {
            let byte = self.read_u8().map_err(|_| self.eof())?;
            let shift = i * 7;
            let is_last_allowed = i + 1 == max_bytes;
            if is_last_allowed {
                let valid_bits = bits.saturating_sub(shift);
                if valid_bits < 7 {
                    let mask: u8 = ((1u16 << valid_bits) - 1) as u8;
                    if (byte & 0x7F) & !mask != 0 {
                        return Err(self.invalid_leb128());
                    }
                }
                if byte & 0x80 != 0 {
                    return Err(self.invalid_leb128());
                }
            }
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(self.invalid_leb128())
    }

    /// Read a signed LEB128 integer targeting `bits` bits (32, 33, or
    /// 64). The terminating byte's unused high bits must be a correct
    /// sign extension of the value.
    fn read_sleb128(&mut self, bits: u32) -> Result<i64> {
        let max_bytes = (bits + 6) / 7;
        let mut result: i64 = 0;
        for i in 0..max_bytes {
            let byte = self.read_u8().map_err(|_| self.eof())?;
            let shift = i * 7;
            let is_last_allowed = i + 1 == max_bytes;
            let more = byte & 0x80 != 0;
            if is_last_allowed {
                if more {
                    return Err(self.invalid_leb128());
                }
                let valid_bits = bits.saturating_sub(shift).max(1);
                if valid_bits < 7 {
                    let mask: u8 = ((1u16 << valid_bits) - 1) as u8;
                    let payload = byte & 0x7F;
                    let sign_bit = (payload >> (valid_bits - 1)) & 1;
                    let expected_upper = if sign_bit == 1 { 0x7F & !mask } else { 0 };
                    if (payload & !mask) != expected_upper {
                        return Err(self.invalid_leb128());
                    }
                }
            }
            result |= i64::from(byte & 0x7F) << shift;
            if !more {
                let filled = shift + 7;
                if filled < 64 && (byte & 0x40) != 0 {
                    result |= -(1i64 << filled);
                }
                return Ok(result);
            }
        }
        Err(self.invalid_leb128())
    }

    /// Read an unsigned LEB128 value as a 32-bit target.
    pub fn read_uleb128_u32(&mut self) -> Result<u32> {
        let value = self.read_uleb128(32)?;
        Ok(value as u32)
    }

    /// Read an unsigned LEB128 value as a 64-bit target.
    pub fn read_uleb128_u64(&mut self) -> Result<u64> {
        self.read_uleb128(64)
    }

    /// Read a signed LEB128 value as a 32-bit target.
    pub fn read_sleb128_i32(&mut self) -> Result<i32> {
        let value = self.read_sleb128(32)?;
        Ok(value as i32)
    }

    /// Read a signed LEB128 value as a 33-bit target, used only for
    /// block-type indices (which need one extra bit over `i32` to
    /// disambiguate from the value-kind tag bytes).
    pub fn read_sleb128_i33(&mut self) -> Result<i64> {
        self.read_sleb128(33)
    }

    /// Read a signed LEB128 value as a 64-bit target.
    pub fn read_sleb128_i64(&mut self) -> Result<i64> {
        self.read_sleb128(64)
    }

    /// Read a length-prefixed UTF-8 name.
    ///
    /// Rejects overlong encodings, surrogate code points, and code
    /// points above `U+10FFFF` by virtue of delegating to Rust's
    /// strict UTF-8 validation.
    #[cfg(feature = "alloc")]
    pub fn read_name(&mut self) -> Result<String> {
        let len = self.read_uleb128_u32()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| {
                let offset = self.pos - len;
                tracing::debug!(offset, "rejecting input: name is not valid UTF-8");
                Error::new(ErrorCode::InvalidUTF8Sequence, "name is not valid UTF-8")
                    .at(Location::at(offset))
            })
    }

    /// Skip `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n)?;
        Ok(())
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(self.eof());
        }
        self.pos = offset;
        Ok(())
    }

    /// Read a uleb128 count, then call `f` that many times, collecting
    /// results. Every "vector of entries" section shape in the binary
    /// format is expressed through this helper.
    #[cfg(feature = "alloc")]
    pub fn read_vec<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_uleb128_u32()? as usize;
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            out.push(f(self)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u8_advances_and_reports_offset() {
        let mut r = Reader::new(&[1, 2, 3]);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.offset(), 1);
        assert_eq!(r.peek_u8().unwrap(), 2);
        assert_eq!(r.offset(), 1);
    }

    #[test]
    fn read_u8_fails_on_empty_input() {
        let mut r = Reader::new(&[]);
        assert_eq!(
            r.read_u8().unwrap_err().code(),
            ErrorCode::UnexpectedEndOfFile
        );
    }

    #[test]
    fn reads_le_fixed_width_integers() {
        let mut r = Reader::new(&[0x01, 0x00, 0x00, 0x00, 0xFF, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(r.read_u32_le().unwrap(), 1);
        assert_eq!(r.read_u64_le().unwrap(), 0xFF);
    }

    #[test]
    fn uleb128_decodes_single_byte() {
        let mut r = Reader::new(&[0x00]);
        assert_eq!(r.read_uleb128_u32().unwrap(), 0);
        let mut r = Reader::new(&[0x7F]);
        assert_eq!(r.read_uleb128_u32().unwrap(), 127);
    }

    #[test]
    fn uleb128_decodes_multi_byte() {
        // 624485 = 0xE5 0x8E 0x26 in uleb128
        let mut r = Reader::new(&[0xE5, 0x8E, 0x26]);
        assert_eq!(r.read_uleb128_u32().unwrap(), 624_485);
    }

    #[test]
    fn uleb128_rejects_nonzero_unused_high_bits() {
        // u32 fits in 5 bytes of 7 bits (35 bits); the top 3 bits of
        // the 5th byte must be zero.
        let mut r = Reader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert_eq!(
            r.read_uleb128_u32().unwrap_err().code(),
            ErrorCode::InvalidLEB128Encoding
        );
    }

    #[test]
    fn sleb128_decodes_negative_value() {
        // -1 in sleb128 is a single byte 0x7F.
        let mut r = Reader::new(&[0x7F]);
        assert_eq!(r.read_sleb128_i32().unwrap(), -1);
        // -624485 is 0x9B 0xF1 0x59.
        let mut r = Reader::new(&[0x9B, 0xF1, 0x59]);
        assert_eq!(r.read_sleb128_i32().unwrap(), -624_485);
    }

    #[test]
    fn sleb128_round_trips_extremes() {
        let mut r = Reader::new(&[0x80, 0x80, 0x80, 0x80, 0x08]);
        assert_eq!(r.read_sleb128_i32().unwrap(), i32::MIN);
    }

    #[test]
    #[cfg(feature = "alloc")]
    fn read_name_accepts_utf8_and_rejects_invalid() {
        let mut bytes = vec![3u8];
        bytes.extend_from_slice("abc".as_bytes());
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_name().unwrap(), "abc");

        let mut r = Reader::new(&[1u8, 0xFF]);
        assert_eq!(
            r.read_name().unwrap_err().code(),
            ErrorCode::InvalidUTF8Sequence
        );
    }

    #[test]
    #[cfg(feature = "alloc")]
    fn read_vec_reads_count_then_entries() {
        let mut r = Reader::new(&[2u8, 0xAA, 0xBB]);
        let entries = r.read_vec(|r| r.read_u8()).unwrap();
        assert_eq!(entries, vec![0xAA, 0xBB]);
    }

    #[test]
    fn skip_and_seek_are_bounded() {
        let mut r = Reader::new(&[1, 2, 3]);
        r.skip(2).unwrap();
        assert_eq!(r.offset(), 2);
        assert!(r.skip(5).is_err());
        r.seek(0).unwrap();
        assert_eq!(r.offset(), 0);
        assert!(r.seek(10).is_err());
    }
}
