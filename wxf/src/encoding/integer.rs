//! Varint helpers for the length, count, rank and dimension fields of the format.
//!
//! Values are split into 7-bit groups, least-significant group first. Every byte but the
//! last carries the continuation bit (`0x80`). A `u64` never needs more than
//! [`MAX_VARINT_LEN`] bytes.

/// Upper bound on the encoded size of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` and hand the produced bytes to `sink` in a single call.
///
/// Returns the number of bytes written.
///
/// Notes:
/// - Value 0 encodes to a single byte `0x00`.
/// - The encoding for 128 is `[0x80, 0x01]` (digit 0 with continuation, then digit 1).
///
/// ```
/// use wxf::encoding::integer::encode_u64;
/// let mut out = Vec::new();
/// encode_u64(300, &mut |b| out.extend_from_slice(b));
/// assert_eq!(out, [0xAC, 0x02]);
/// ```
pub fn encode_u64<F: FnMut(&[u8])>(mut value: u64, sink: &mut F) -> usize {
    let mut scratch = [0u8; MAX_VARINT_LEN];
    let mut size = 0;

    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            scratch[size] = byte;
            size += 1;
            break;
        }
        scratch[size] = byte | 0x80;
        size += 1;
    }

    sink(&scratch[..size]);
    size
}

/// Decode one varint starting at `pos`.
///
/// Returns `(value, bytes_consumed)`. Reading stops at the first byte with the continuation bit
/// cleared, after [`MAX_VARINT_LEN`] bytes, or at the end of `buf`, whichever comes first. A value
/// cut short by the end of the buffer is returned as decoded so far; use [`decode_u64_exact`] when
/// that must be reported instead.
pub fn decode_u64(buf: &[u8], pos: usize) -> (u64, usize) {
    let mut value: u64 = 0;
    let mut consumed = 0;

    for (i, &byte) in buf.iter().skip(pos).take(MAX_VARINT_LEN).enumerate() {
        // The tenth group only contributes its lowest bit, higher bits fall off the u64.
        value |= u64::from(byte & 0x7F) << (7 * i);
        consumed = i + 1;
        if byte & 0x80 == 0 {
            break;
        }
    }

    (value, consumed)
}

/// Like [`decode_u64`], but returns `None` when the buffer ends while a continuation bit is still
/// set (or before any byte could be read).
pub fn decode_u64_exact(buf: &[u8], pos: usize) -> Option<(u64, usize)> {
    let (value, consumed) = decode_u64(buf, pos);
    if consumed == 0 {
        return None;
    }

    let last = buf[pos + consumed - 1];
    if last & 0x80 != 0 && consumed < MAX_VARINT_LEN {
        return None;
    }

    Some((value, consumed))
}

/// Compute the encoded size in bytes of `value`.
///
/// Useful for preallocating buffers.
pub fn encoded_size_u64(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let sig_bits = (64 - value.leading_zeros()) as usize;
    sig_bits.div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(v: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_u64(v, &mut |b| buf.extend_from_slice(b));
        buf
    }

    #[test]
    fn roundtrip_small_values() {
        let values = [
            0_u64, 1, 2, 3, 10, 42, 63, 64, 65, 100, 127, 128, 129, 255, 256, 300,
        ];
        for &v in &values {
            let buf = encode(v);
            let (decoded, consumed) = decode_u64(&buf, 0);
            assert_eq!(decoded, v, "value {v} roundtrip");
            assert_eq!(consumed, buf.len(), "buffer not fully consumed for {v}");
        }
    }

    #[test]
    fn encoding_shape_examples() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(127), [0x7F]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xAC, 0x02]);
        assert_eq!(encode(16383), [0xFF, 0x7F]);
        assert_eq!(encode(16384), [0x80, 0x80, 0x01]);
        assert_eq!(
            encode(u64::MAX),
            [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn decode_at_offset() {
        let buf = [0xAA, 0xBB, 0xAC, 0x02, 0x07];
        assert_eq!(decode_u64(&buf, 2), (300, 2));
        assert_eq!(decode_u64(&buf, 4), (7, 1));
    }

    #[test]
    fn decode_stops_at_buffer_end() {
        // Only continuation bytes, never a terminating byte.
        let buf = [0x81, 0x80];
        assert_eq!(decode_u64(&buf, 0), (1, 2));
        assert_eq!(decode_u64_exact(&buf, 0), None);
        assert_eq!(decode_u64(&buf, 2), (0, 0));
        assert_eq!(decode_u64_exact(&buf, 2), None);
    }

    #[test]
    fn decode_caps_at_ten_bytes() {
        let buf = [0xFF; 16];
        let (_, consumed) = decode_u64(&buf, 0);
        assert_eq!(consumed, MAX_VARINT_LEN);
        assert!(decode_u64_exact(&buf, 0).is_some());
    }

    #[test]
    fn encoded_size_matches_actual() {
        let test_values = [
            0_u64,
            1,
            42,
            127,
            128,
            300,
            16383,
            16384,
            1_000_000,
            2_u64.pow(32) - 1,
            2_u64.pow(32),
            u64::MAX,
        ];
        for &v in &test_values {
            assert_eq!(encode(v).len(), encoded_size_u64(v), "value {v} size mismatch");
        }
    }
}
