//! Byte constants of the wire format.
//!
//! Conventions:
//! - A stream starts with [`HEADER`] (`"8:"`, format version 8).
//! - Every expression starts with one tag byte.
//! - Composites are prefix encoded: `tag [count] children...`, with no closing delimiter.
//! - Arrays are `tag element rank dims... raw_elements`.

/// Format/version marker.
pub const HEADER: [u8; 2] = [b'8', b':'];

// Composite tags
pub const FUNCTION: u8 = 102; // encode: OP count(varint) head children...
pub const ASSOCIATION: u8 = 65; // encode: OP count(varint) children...
pub const DELAYED_RULE: u8 = 58; // encode: OP lhs rhs
pub const RULE: u8 = 45; // encode: OP lhs rhs

// Textual tags, encode: OP len(varint) bytes
pub const SYMBOL: u8 = 115;
pub const STRING: u8 = 83;
pub const BINARY_STRING: u8 = 66;
pub const BIG_INTEGER: u8 = 73;
pub const BIG_REAL: u8 = 82;

// Scalar tags, encode: OP little-endian value
pub const INTEGER8: u8 = 67;
pub const INTEGER16: u8 = 106;
pub const INTEGER32: u8 = 105;
pub const INTEGER64: u8 = 76;
pub const REAL64: u8 = 114;

// Array tags
pub const PACKED_ARRAY: u8 = 193;
pub const NUMERIC_ARRAY: u8 = 194;

// Element types inside arrays. The low three bits hold log2 of the element width.
pub const ELEM_INTEGER8: u8 = 0;
pub const ELEM_INTEGER16: u8 = 1;
pub const ELEM_INTEGER32: u8 = 2;
pub const ELEM_INTEGER64: u8 = 3;
pub const ELEM_UNSIGNED_INTEGER8: u8 = 16;
pub const ELEM_UNSIGNED_INTEGER16: u8 = 17;
pub const ELEM_UNSIGNED_INTEGER32: u8 = 18;
pub const ELEM_UNSIGNED_INTEGER64: u8 = 19;
pub const ELEM_REAL32: u8 = 34;
pub const ELEM_REAL64: u8 = 35;
pub const ELEM_COMPLEX_REAL32: u8 = 51;
pub const ELEM_COMPLEX_REAL64: u8 = 52;

/// Marks the unsigned integer element family.
pub const ELEM_UNSIGNED_FLAG: u8 = 16;
/// Mask selecting `log2(width)` out of an element type byte.
pub const ELEM_WIDTH_MASK: u8 = 0b111;
