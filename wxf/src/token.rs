//! Flat, zero-copy tokens produced by the first decode pass.
use std::fmt;

use smallvec::SmallVec;

use crate::encoding::read_le;
use crate::tag::{ArrayKind, ElementType, Tag};

/// Dimensions of an array token. Most arrays have a rank of at most four.
pub type Dims = SmallVec<[usize; 4]>;

/// Shape metadata owned by an array token.
///
/// `len` is always `dims.iter().product()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    pub kind: ArrayKind,
    pub element: ElementType,
    pub len: usize,
    pub dims: Dims,
}

impl ArrayShape {
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Size in bytes of the element payload, `None` if it overflows `usize`.
    #[inline]
    pub fn byte_len(&self) -> Option<usize> {
        self.len.checked_mul(self.element.width())
    }
}

/// Tag-specific part of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    /// Scalar or textual value; its bytes are the token data.
    Atom,
    /// Function, association, rule or delayed rule with its declared child count.
    ///
    /// For functions the count excludes the head expression.
    Composite { arity: usize },
    /// Packed or numeric array.
    Array(ArrayShape),
}

/// A typed view into the decoded buffer.
///
/// `data` borrows the value bytes (scalar bytes, text bytes or raw array elements). Composite tokens
/// borrow their count field, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub(crate) tag: Tag,
    pub(crate) offset: usize,
    pub(crate) data: &'a [u8],
    pub(crate) payload: Payload,
}

impl<'a> Token<'a> {
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Byte offset of the tag in the input buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Declared number of children, `None` for atoms and arrays.
    #[inline]
    pub fn arity(&self) -> Option<usize> {
        match self.payload {
            Payload::Composite { arity } => Some(arity),
            _ => None,
        }
    }

    #[inline]
    pub fn shape(&self) -> Option<&ArrayShape> {
        match &self.payload {
            Payload::Array(shape) => Some(shape),
            _ => None,
        }
    }

    /// Byte length of a scalar or textual value, or the child count of a composite.
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Atom => self.data.len(),
            Payload::Composite { arity } => *arity,
            Payload::Array(shape) => shape.len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self.payload, Payload::Composite { .. })
    }

    /// Value of an integer token of any width.
    pub fn as_integer(&self) -> Option<i64> {
        let value = match self.tag {
            Tag::Integer8 => i8::from_le_bytes(read_le(self.data, 0)?) as i64,
            Tag::Integer16 => i16::from_le_bytes(read_le(self.data, 0)?) as i64,
            Tag::Integer32 => i32::from_le_bytes(read_le(self.data, 0)?) as i64,
            Tag::Integer64 => i64::from_le_bytes(read_le(self.data, 0)?),
            _ => return None,
        };
        Some(value)
    }

    pub fn as_real(&self) -> Option<f64> {
        match self.tag {
            Tag::Real64 => Some(f64::from_le_bytes(read_le(self.data, 0)?)),
            _ => None,
        }
    }

    /// Raw bytes of a textual token (string, symbol, binary string, big number digits).
    pub fn text(&self) -> Option<&'a [u8]> {
        self.tag.is_textual().then_some(self.data)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        match &self.payload {
            Payload::Composite { arity } => write!(f, "[{arity}]"),
            Payload::Array(shape) => {
                write!(f, "<{}>[", shape.element)?;
                for (i, dim) in shape.dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{dim}")?;
                }
                f.write_str("]")
            }
            Payload::Atom => {
                if let Some(value) = self.as_integer() {
                    write!(f, ": {value}")
                } else if let Some(value) = self.as_real() {
                    write!(f, ": {value:?}")
                } else if self.tag == Tag::String {
                    write!(f, ": {:?}", String::from_utf8_lossy(self.data))
                } else if self.tag == Tag::BinaryString {
                    write!(f, ": {} byte(s)", self.data.len())
                } else {
                    write!(f, ": {}", String::from_utf8_lossy(self.data))
                }
            }
        }
    }
}
