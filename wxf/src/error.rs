use strum::EnumIs;
use thiserror::Error;

use crate::tag::ElementType;

/// Reasons a buffer is rejected by the parser or the tree builder.
///
/// Offsets are byte positions in the input buffer, header included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum DecodeError {
    /// The buffer does not start with the `8:` marker.
    #[error("Missing or invalid header: a WXF buffer must start with the two bytes `8:`.")]
    BadHeader,

    /// A tag byte outside the closed tag set.
    #[error("Unknown expression tag `{tag}` at byte offset {offset}.")]
    UnknownTag { offset: usize, tag: u8 },

    /// An array element type byte outside the element set, or not permitted for the array kind.
    #[error("Invalid array element type `{tag}` at byte offset {offset}.")]
    UnknownElementType { offset: usize, tag: u8 },

    /// A declared length, width, count, rank or dimension runs past the end of the buffer.
    #[error(
        "Truncated input at byte offset {offset}: {needed} more bytes were declared but only {available} remain."
    )]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Declared child counts do not match the token sequence.
    #[error(
        "Declared arities do not match the content: {unclosed} composite(s) left open, {trailing} token(s) left over."
    )]
    ArityMismatch { unclosed: usize, trailing: usize },

    /// A function token is not followed by an atomic head expression.
    #[error("Function token #{token} is not followed by an atomic head expression.")]
    InvalidHead { token: usize },

    /// The buffer holds a header and nothing else.
    #[error("The buffer contains a header but no expression.")]
    EmptyExpression,

    /// Nesting exceeds the configured maximum.
    #[error("Expression nesting exceeds the configured depth limit of {limit}.")]
    DepthLimitExceeded { limit: usize },
}

/// Reasons the encoder refuses a push. The buffer is left as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum EncodeError {
    /// The product of the dimensions differs from the number of supplied elements.
    #[error(
        "Array dimensions describe {expected} element(s) but {found} were supplied."
    )]
    ArrayLengthMismatch { expected: usize, found: usize },

    /// The product of the dimensions does not fit in `usize`.
    #[error("The product of the array dimensions overflows.")]
    DimensionOverflow,

    /// Unsigned elements are only allowed in numeric arrays.
    #[error("Element type `{element}` is not allowed in a packed array.")]
    ElementTypeNotAllowed { element: ElementType },

    /// Raw element bytes that are not a whole number of elements.
    #[error("{len} byte(s) of raw element data is not a multiple of the element width {width}.")]
    MisalignedArrayBytes { len: usize, width: usize },
}
