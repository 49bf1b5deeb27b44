//! WXF: encoder and zero-copy decoder for the binary expression format.
//!
//! Wire shape
//!  - A buffer starts with the two-byte header `8:` followed by one expression.
//!  - Every expression starts with a tag byte. Composites (functions, associations, rules) are
//!    prefix encoded: the tag and the child count, then the children, with no closing delimiter.
//!  - Lengths, counts, ranks and dimensions are base-128 varints; scalars are little-endian.
//!
//! Decoding runs in two passes. [`Parser`] scans the buffer once into a flat list of [`Token`]s
//! borrowing the input; the tree builder then rebuilds the hierarchy with an explicit stack of
//! open composites ([`ExprTree`]). Neither pass recurses on the nesting depth of the input.
//!
//! Example
//! ```
//! use wxf::{decode, Encoder, Value};
//!
//! let mut enc = Encoder::with_header();
//! enc.push_function("f", 2).push_integer(1).push_string("a");
//!
//! let bytes = enc.into_bytes();
//! let tree = decode(&bytes).unwrap();
//! let root = tree.root();
//! assert_eq!(root.head_name(), Some("f"));
//! assert_eq!(root.child(0).unwrap().value(), Value::Integer(1));
//! assert_eq!(root.child(1).unwrap().as_str(), Some("a"));
//! assert_eq!(tree.to_string(), r#"f[1, "a"]"#);
//! ```

/// Array element types and their little-endian representation.
pub mod element;
/// Primitive codec: varints, scalars and wire constants.
pub mod encoding;
pub mod encoder;
pub mod error;
/// First decode pass.
pub mod parser;
/// FullForm pretty printer.
pub mod pretty;
/// Tag and element type model.
pub mod tag;
pub mod token;
/// Second decode pass and the decoded tree.
pub mod tree;
/// Typed access to decoded nodes.
pub mod view;

pub use element::{ArrayElement, Complex, PackedElement};
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError};
pub use parser::{Parser, tokenize};
pub use pretty::PrettyExpr;
pub use tag::{ArrayKind, ElementType, Tag, TagClass};
pub use token::{ArrayShape, Payload, Token};
pub use tree::{DecodeOptions, ExprNode, ExprTree, decode, decode_with};
pub use view::{ArrayView, NodeRef, Value};
