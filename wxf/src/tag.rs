//! Type tag model: the closed set of expression tags and array element types.
use strum::{EnumIs, EnumIter, FromRepr, IntoStaticStr};

use crate::encoding::magic;

/// Tag byte identifying the wire type of an expression.
///
/// The tag space is closed: any byte that does not map to a variant is a decode error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIs, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Tag {
    Function = magic::FUNCTION,
    Association = magic::ASSOCIATION,
    DelayedRule = magic::DELAYED_RULE,
    Rule = magic::RULE,

    Symbol = magic::SYMBOL,
    String = magic::STRING,
    BinaryString = magic::BINARY_STRING,
    BigInteger = magic::BIG_INTEGER,
    BigReal = magic::BIG_REAL,

    Integer8 = magic::INTEGER8,
    Integer16 = magic::INTEGER16,
    Integer32 = magic::INTEGER32,
    Integer64 = magic::INTEGER64,
    Real64 = magic::REAL64,

    PackedArray = magic::PACKED_ARRAY,
    NumericArray = magic::NUMERIC_ARRAY,
}

/// Coarse classification of a tag byte, driving the parser dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum TagClass {
    /// Function, association, rule or delayed rule. `arity_follows` is set when a varint child
    /// count is written right after the tag (function, association); rules always have two
    /// children and carry no count.
    Composite { arity_follows: bool },
    /// Fixed-width little-endian number.
    Scalar { width: usize },
    /// Varint byte length followed by that many opaque bytes.
    Textual,
    /// Packed (`numeric == false`) or numeric array.
    Array { numeric: bool },
    /// Byte outside the tag space.
    Invalid,
}

impl Tag {
    /// Classify a raw tag byte.
    pub fn classify(byte: u8) -> TagClass {
        match Tag::from_repr(byte) {
            Some(tag) => tag.class(),
            None => TagClass::Invalid,
        }
    }

    pub fn class(self) -> TagClass {
        match self {
            Tag::Function | Tag::Association => TagClass::Composite {
                arity_follows: true,
            },
            Tag::Rule | Tag::DelayedRule => TagClass::Composite {
                arity_follows: false,
            },
            Tag::Symbol | Tag::String | Tag::BinaryString | Tag::BigInteger | Tag::BigReal => {
                TagClass::Textual
            }
            Tag::Integer8 => TagClass::Scalar { width: 1 },
            Tag::Integer16 => TagClass::Scalar { width: 2 },
            Tag::Integer32 => TagClass::Scalar { width: 4 },
            Tag::Integer64 | Tag::Real64 => TagClass::Scalar { width: 8 },
            Tag::PackedArray => TagClass::Array { numeric: false },
            Tag::NumericArray => TagClass::Array { numeric: true },
        }
    }

    /// Whether nodes with this tag carry children.
    #[inline]
    pub fn is_composite(self) -> bool {
        self.class().is_composite()
    }

    #[inline]
    pub fn is_textual(self) -> bool {
        self.class().is_textual()
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Tag::Integer8 | Tag::Integer16 | Tag::Integer32 | Tag::Integer64
        )
    }

    /// Child count implied by the tag itself (rules), if any.
    #[inline]
    pub fn fixed_arity(self) -> Option<usize> {
        match self {
            Tag::Rule | Tag::DelayedRule => Some(2),
            _ => None,
        }
    }

    /// Narrowest signed integer tag able to hold `value` exactly.
    pub fn for_integer(value: i64) -> Tag {
        if i8::try_from(value).is_ok() {
            Tag::Integer8
        } else if i16::try_from(value).is_ok() {
            Tag::Integer16
        } else if i32::try_from(value).is_ok() {
            Tag::Integer32
        } else {
            Tag::Integer64
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag as u8
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Width in bytes of a scalar tag (four integer widths and the 64-bit real).
///
/// Returns `None` for every other byte; the parser turns that into a decode error.
pub fn scalar_width(byte: u8) -> Option<usize> {
    match Tag::classify(byte) {
        TagClass::Scalar { width } => Some(width),
        _ => None,
    }
}

/// Element width in bytes encoded by an element type byte: `1 << (tag & 0b111)`.
#[inline]
pub const fn element_width(element: u8) -> usize {
    1 << (element & magic::ELEM_WIDTH_MASK)
}

/// Element type of a packed or numeric array payload.
///
/// Names follow the conventional spelling used by numeric array types (`Integer8`,
/// `UnsignedInteger16`, `ComplexReal64`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIs, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum ElementType {
    Integer8 = magic::ELEM_INTEGER8,
    Integer16 = magic::ELEM_INTEGER16,
    Integer32 = magic::ELEM_INTEGER32,
    Integer64 = magic::ELEM_INTEGER64,
    UnsignedInteger8 = magic::ELEM_UNSIGNED_INTEGER8,
    UnsignedInteger16 = magic::ELEM_UNSIGNED_INTEGER16,
    UnsignedInteger32 = magic::ELEM_UNSIGNED_INTEGER32,
    UnsignedInteger64 = magic::ELEM_UNSIGNED_INTEGER64,
    Real32 = magic::ELEM_REAL32,
    Real64 = magic::ELEM_REAL64,
    ComplexReal32 = magic::ELEM_COMPLEX_REAL32,
    ComplexReal64 = magic::ELEM_COMPLEX_REAL64,
}

impl ElementType {
    /// Size of one element in bytes. Complex elements count both components.
    #[inline]
    pub const fn width(self) -> usize {
        element_width(self as u8)
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ElementType::Integer8
                | ElementType::Integer16
                | ElementType::Integer32
                | ElementType::Integer64
        )
    }

    #[inline]
    pub fn is_unsigned(self) -> bool {
        (self as u8) & !magic::ELEM_WIDTH_MASK == magic::ELEM_UNSIGNED_FLAG
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, ElementType::Real32 | ElementType::Real64)
    }

    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(
            self,
            ElementType::ComplexReal32 | ElementType::ComplexReal64
        )
    }

    /// Packed arrays do not admit the unsigned integer family.
    #[inline]
    pub fn allowed_in(self, kind: ArrayKind) -> bool {
        match kind {
            ArrayKind::Packed => !self.is_unsigned(),
            ArrayKind::Numeric => true,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The two array flavours of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum ArrayKind {
    Packed,
    Numeric,
}

impl ArrayKind {
    #[inline]
    pub fn tag(self) -> Tag {
        match self {
            ArrayKind::Packed => Tag::PackedArray,
            ArrayKind::Numeric => Tag::NumericArray,
        }
    }
}
