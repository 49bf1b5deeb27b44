//! Append-only builder producing WXF bytes.
use log::warn;

use crate::element::{ArrayElement, PackedElement};
use crate::encoding::{magic, push_len, write_le};
use crate::error::EncodeError;
use crate::tag::{ArrayKind, ElementType, Tag};
use crate::token::Token;
use crate::view::{NodeRef, Value};

/// A growable byte sink with one push operation per wire construct.
///
/// Composites are written prefix-first: after `push_function(head, n)` the caller must push exactly
/// `n` complete expressions, after `push_rule()` exactly two. The encoder does not track this. The
/// only check it performs is on arrays, whose dimensions must match the supplied elements; a
/// rejected array leaves the buffer untouched.
///
/// ```
/// use wxf::Encoder;
/// let mut enc = Encoder::with_header();
/// enc.push_function("f", 2).push_integer(1).push_string("a");
/// assert_eq!(enc.as_bytes(), b"8:f\x02s\x01fC\x01S\x01a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    /// An empty encoder, without header. Useful for building fragments.
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder whose buffer starts with the `8:` header.
    pub fn with_header() -> Self {
        Self {
            buffer: magic::HEADER.to_vec(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drop everything written after the first `len` bytes, e.g. to undo a partial expression.
    pub fn truncate(&mut self, len: usize) {
        self.buffer.truncate(len);
    }

    /// Push an integer using the narrowest of the four signed widths.
    pub fn push_integer(&mut self, value: i64) -> &mut Self {
        let tag = Tag::for_integer(value);
        self.buffer.push(tag as u8);
        // Truncating casts are exact here: `for_integer` picked a width that holds `value`.
        match tag {
            Tag::Integer8 => write_le(&mut self.buffer, (value as i8).to_le_bytes()),
            Tag::Integer16 => write_le(&mut self.buffer, (value as i16).to_le_bytes()),
            Tag::Integer32 => write_le(&mut self.buffer, (value as i32).to_le_bytes()),
            _ => write_le(&mut self.buffer, value.to_le_bytes()),
        }
        self
    }

    pub fn push_real(&mut self, value: f64) -> &mut Self {
        self.buffer.push(Tag::Real64 as u8);
        write_le(&mut self.buffer, value.to_le_bytes());
        self
    }

    #[inline]
    pub fn push_string(&mut self, text: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(Tag::String, text.as_ref())
    }

    #[inline]
    pub fn push_symbol(&mut self, name: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(Tag::Symbol, name.as_ref())
    }

    /// Push an arbitrary-precision integer given as its decimal digits.
    #[inline]
    pub fn push_bigint(&mut self, digits: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(Tag::BigInteger, digits.as_ref())
    }

    /// Push an arbitrary-precision real given as its textual form.
    #[inline]
    pub fn push_bigreal(&mut self, digits: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(Tag::BigReal, digits.as_ref())
    }

    #[inline]
    pub fn push_binary_string(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.push_text(Tag::BinaryString, bytes.as_ref())
    }

    fn push_text(&mut self, tag: Tag, bytes: &[u8]) -> &mut Self {
        self.buffer.push(tag as u8);
        push_len(bytes.len(), &mut self.buffer);
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Open a function with a symbol head; `len` arguments must follow.
    pub fn push_function(&mut self, head: impl AsRef<[u8]>, len: usize) -> &mut Self {
        self.buffer.push(Tag::Function as u8);
        push_len(len, &mut self.buffer);
        self.push_symbol(head)
    }

    /// Open an association; `len` rules must follow.
    pub fn push_association(&mut self, len: usize) -> &mut Self {
        self.buffer.push(Tag::Association as u8);
        push_len(len, &mut self.buffer);
        self
    }

    /// Open a rule; its two sides must follow.
    pub fn push_rule(&mut self) -> &mut Self {
        self.buffer.push(Tag::Rule as u8);
        self
    }

    /// Open a delayed rule; its two sides must follow.
    pub fn push_delay_rule(&mut self) -> &mut Self {
        self.buffer.push(Tag::DelayedRule as u8);
        self
    }

    /// Append bytes that already hold complete encoded expressions.
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Push a packed array of `data`, laid out row-major with shape `dims`.
    pub fn push_array<T: PackedElement>(
        &mut self,
        dims: &[usize],
        data: &[T],
    ) -> Result<&mut Self, EncodeError> {
        self.push_elements(ArrayKind::Packed, dims, data)
    }

    /// Push a numeric array; unlike packed arrays these also admit unsigned integers.
    pub fn push_numeric_array<T: ArrayElement>(
        &mut self,
        dims: &[usize],
        data: &[T],
    ) -> Result<&mut Self, EncodeError> {
        self.push_elements(ArrayKind::Numeric, dims, data)
    }

    /// Push an array from raw little-endian element bytes.
    pub fn push_array_bytes(
        &mut self,
        kind: ArrayKind,
        element: ElementType,
        dims: &[usize],
        bytes: &[u8],
    ) -> Result<&mut Self, EncodeError> {
        let width = element.width();
        if bytes.len() % width != 0 {
            return Err(self.reject(EncodeError::MisalignedArrayBytes {
                len: bytes.len(),
                width,
            }));
        }
        self.push_array_with(kind, element, dims, bytes.len() / width, |buffer| {
            buffer.extend_from_slice(bytes)
        })
    }

    fn push_elements<T: ArrayElement>(
        &mut self,
        kind: ArrayKind,
        dims: &[usize],
        data: &[T],
    ) -> Result<&mut Self, EncodeError> {
        self.push_array_with(kind, T::ELEMENT, dims, data.len(), |buffer| {
            buffer.reserve(data.len() * T::WIDTH);
            for value in data {
                value.write_le(buffer);
            }
        })
    }

    fn push_array_with(
        &mut self,
        kind: ArrayKind,
        element: ElementType,
        dims: &[usize],
        found: usize,
        write: impl FnOnce(&mut Vec<u8>),
    ) -> Result<&mut Self, EncodeError> {
        if !element.allowed_in(kind) {
            return Err(self.reject(EncodeError::ElementTypeNotAllowed { element }));
        }

        let rollback = self.buffer.len();
        self.buffer.push(kind.tag() as u8);
        self.buffer.push(element as u8);
        push_len(dims.len(), &mut self.buffer);

        let mut expected = Some(1usize);
        for &dim in dims {
            push_len(dim, &mut self.buffer);
            expected = expected.and_then(|product| product.checked_mul(dim));
        }

        let outcome = match expected {
            None => Err(EncodeError::DimensionOverflow),
            Some(expected) if expected != found => {
                Err(EncodeError::ArrayLengthMismatch { expected, found })
            }
            Some(_) => Ok(()),
        };
        if let Err(err) = outcome {
            self.buffer.truncate(rollback);
            return Err(self.reject(err));
        }

        write(&mut self.buffer);
        Ok(self)
    }

    fn reject(&self, err: EncodeError) -> EncodeError {
        warn!("array rejected by encoder: {err}");
        err
    }

    /// Re-emit a decoded expression. Integers are re-encoded at their narrowest width.
    pub fn push_node(&mut self, node: NodeRef<'_>) -> &mut Self {
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            match node.value() {
                Value::Function { head, len } => {
                    self.buffer.push(Tag::Function as u8);
                    push_len(len, &mut self.buffer);
                    self.push_token(head);
                }
                Value::Association(len) => {
                    self.push_association(len);
                }
                Value::Rule => {
                    self.push_rule();
                }
                Value::DelayedRule => {
                    self.push_delay_rule();
                }
                _ => self.push_token(node.token()),
            }
            pending.extend(node.children().rev());
        }
        self
    }

    /// Emit a decoded atom or array token.
    fn push_token(&mut self, token: &Token<'_>) {
        if let Some(value) = token.as_integer() {
            self.push_integer(value);
        } else if let Some(shape) = token.shape() {
            self.buffer.push(shape.kind.tag() as u8);
            self.buffer.push(shape.element as u8);
            push_len(shape.rank(), &mut self.buffer);
            for &dim in &shape.dims {
                push_len(dim, &mut self.buffer);
            }
            self.buffer.extend_from_slice(token.data());
        } else if token.tag().is_textual() {
            self.push_text(token.tag(), token.data());
        } else {
            self.buffer.push(token.tag() as u8);
            self.buffer.extend_from_slice(token.data());
        }
    }
}

impl From<Vec<u8>> for Encoder {
    fn from(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }
}

impl From<Encoder> for Vec<u8> {
    fn from(encoder: Encoder) -> Self {
        encoder.buffer
    }
}

impl AsRef<[u8]> for Encoder {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowest_integer_widths() {
        let cases: [(i64, &[u8]); 6] = [
            (0, &[67, 0]),
            (127, &[67, 127]),
            (-128, &[67, 0x80]),
            (128, &[106, 0x80, 0x00]),
            (70000, &[105, 0x70, 0x11, 0x01, 0x00]),
            (2147483648, &[76, 0, 0, 0, 0x80, 0, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            let mut enc = Encoder::new();
            enc.push_integer(value);
            assert_eq!(enc.as_bytes(), expected, "value {value}");
        }
    }

    #[test]
    fn text_like_values() {
        let mut enc = Encoder::new();
        enc.push_symbol("x")
            .push_bigint("123")
            .push_bigreal("1.5`20")
            .push_binary_string([0u8, 255]);
        assert_eq!(
            enc.as_bytes(),
            b"s\x01xI\x03123R\x061.5`20B\x02\x00\xFF"
        );
    }

    #[test]
    fn composites_are_prefix_only() {
        let mut enc = Encoder::new();
        enc.push_association(1).push_rule().push_symbol("a");
        enc.push_delay_rule();
        assert_eq!(enc.as_bytes(), b"A\x01-s\x01a:");
    }

    #[test]
    fn array_rejection_rolls_back() {
        let mut enc = Encoder::with_header();
        enc.push_integer(5);
        let before = enc.clone();

        let err = enc.push_array(&[2, 2], &[1i32, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            EncodeError::ArrayLengthMismatch {
                expected: 4,
                found: 3
            }
        );
        assert_eq!(enc, before);

        let err = enc.push_array(&[usize::MAX, 2], &[1i8]).unwrap_err();
        assert!(err.is_dimension_overflow());
        assert_eq!(enc, before);

        let err = enc
            .push_array_bytes(ArrayKind::Packed, ElementType::UnsignedInteger8, &[1], &[1])
            .unwrap_err();
        assert!(err.is_element_type_not_allowed());
        let err = enc
            .push_array_bytes(ArrayKind::Numeric, ElementType::Integer16, &[1], &[1, 2, 3])
            .unwrap_err();
        assert!(err.is_misaligned_array_bytes());
        assert_eq!(enc, before);
    }

    #[test]
    fn array_layout() {
        let mut enc = Encoder::new();
        enc.push_numeric_array(&[3], &[1u16, 2, 0x0300]).unwrap();
        assert_eq!(
            enc.as_bytes(),
            &[194, 17, 1, 3, 1, 0, 2, 0, 0, 3]
        );
    }
}
