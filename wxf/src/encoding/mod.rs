//! Primitive codec: varints and fixed-width little-endian scalars.
pub mod integer;
pub mod magic;

/// Read `N` bytes at `pos`, or `None` if the buffer is too short.
///
/// Scalars are stored little-endian and copied byte for byte; converting them is left to
/// `from_le_bytes` at the call site.
#[inline]
pub fn read_le<const N: usize>(buf: &[u8], pos: usize) -> Option<[u8; N]> {
    let end = pos.checked_add(N)?;
    buf.get(pos..end)?.try_into().ok()
}

/// Append the little-endian bytes of a scalar.
#[inline]
pub(crate) fn write_le<const N: usize>(buf: &mut Vec<u8>, bytes: [u8; N]) {
    buf.extend_from_slice(&bytes);
}

/// Append a varint length/count field.
#[inline]
pub(crate) fn push_len(len: usize, buf: &mut Vec<u8>) {
    integer::encode_u64(len as u64, &mut |b| buf.extend_from_slice(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_is_bounds_checked() {
        let buf = [1u8, 2, 3];
        assert_eq!(read_le::<2>(&buf, 1), Some([2, 3]));
        assert_eq!(read_le::<2>(&buf, 2), None);
        assert_eq!(read_le::<1>(&buf, usize::MAX), None);
    }

    #[test]
    fn scalars_are_little_endian() {
        let mut buf = Vec::new();
        write_le(&mut buf, 0x0102_i16.to_le_bytes());
        assert_eq!(buf, [0x02, 0x01]);
        assert_eq!(i16::from_le_bytes(read_le(&buf, 0).unwrap()), 0x0102);
    }
}
