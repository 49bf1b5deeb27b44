//! Typed, borrowing access to a decoded tree.
use std::fmt;

use strum::EnumIs;

use crate::element::ArrayElement;
use crate::tag::{ArrayKind, ElementType, Tag};
use crate::token::{Payload, Token};
use crate::tree::ExprNode;

/// A node of an [`ExprTree`](crate::ExprTree) together with the tokens it indexes into.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tokens: &'t [Token<'t>],
    node: &'t ExprNode,
}

/// Value carried by a node. Text-like values are the raw bytes of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, EnumIs)]
pub enum Value<'t> {
    Integer(i64),
    Real(f64),
    String(&'t [u8]),
    BinaryString(&'t [u8]),
    Symbol(&'t [u8]),
    /// Decimal digits, never evaluated.
    BigInteger(&'t [u8]),
    BigReal(&'t [u8]),
    Array(ArrayView<'t>),
    Function { head: &'t Token<'t>, len: usize },
    Association(usize),
    Rule,
    DelayedRule,
}

impl<'t> NodeRef<'t> {
    pub(crate) fn new(tokens: &'t [Token<'t>], node: &'t ExprNode) -> Self {
        Self { tokens, node }
    }

    /// Index of the node's token in the token list.
    #[inline]
    pub fn index(self) -> usize {
        self.node.token()
    }

    #[inline]
    pub fn token(self) -> &'t Token<'t> {
        &self.tokens[self.node.token()]
    }

    #[inline]
    pub fn tag(self) -> Tag {
        self.token().tag()
    }

    /// Number of children (the function head is not counted).
    #[inline]
    pub fn len(self) -> usize {
        self.node.children().len()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Whether the node is an atom or an array. A composite with no children is not a leaf.
    #[inline]
    pub fn is_leaf(self) -> bool {
        !self.token().is_composite()
    }

    pub fn child(self, index: usize) -> Option<NodeRef<'t>> {
        let tokens = self.tokens;
        self.node
            .children()
            .get(index)
            .map(|node| NodeRef { tokens, node })
    }

    pub fn children(self) -> impl ExactSizeIterator<Item = NodeRef<'t>> + DoubleEndedIterator {
        let tokens = self.tokens;
        self.node
            .children()
            .iter()
            .map(move |node| NodeRef { tokens, node })
    }

    /// Head token of a function node.
    pub fn head(self) -> Option<&'t Token<'t>> {
        match self.tag() {
            Tag::Function => self.tokens.get(self.node.token() + 1),
            _ => None,
        }
    }

    /// Head of a function node when it is a symbol.
    pub fn head_name(self) -> Option<&'t str> {
        let head = self.head()?;
        match head.tag() {
            Tag::Symbol => std::str::from_utf8(head.data()).ok(),
            _ => None,
        }
    }

    pub fn value(self) -> Value<'t> {
        let token = self.token();
        let data = token.data();
        match (token.tag(), token.payload()) {
            (_, Payload::Array(shape)) => Value::Array(ArrayView {
                kind: shape.kind,
                element: shape.element,
                dims: &shape.dims,
                bytes: data,
            }),
            // Scalar widths are checked by the parser.
            (Tag::Integer8 | Tag::Integer16 | Tag::Integer32 | Tag::Integer64, _) => {
                Value::Integer(token.as_integer().unwrap_or_default())
            }
            (Tag::Real64, _) => Value::Real(token.as_real().unwrap_or_default()),
            (Tag::String, _) => Value::String(data),
            (Tag::BinaryString, _) => Value::BinaryString(data),
            (Tag::Symbol, _) => Value::Symbol(data),
            (Tag::BigInteger, _) => Value::BigInteger(data),
            (Tag::BigReal, _) => Value::BigReal(data),
            // The tree builder only accepts functions followed by a head token.
            (Tag::Function, _) => Value::Function {
                head: &self.tokens[self.node.token() + 1],
                len: self.len(),
            },
            (Tag::Association, _) => Value::Association(self.len()),
            (Tag::Rule, _) => Value::Rule,
            (Tag::DelayedRule, _) => Value::DelayedRule,
            (Tag::PackedArray | Tag::NumericArray, _) => {
                unreachable!("array tokens always carry a shape")
            }
        }
    }

    #[inline]
    pub fn as_integer(self) -> Option<i64> {
        self.token().as_integer()
    }

    #[inline]
    pub fn as_real(self) -> Option<f64> {
        self.token().as_real()
    }

    /// Text of a string or symbol, if it is valid UTF-8.
    pub fn as_str(self) -> Option<&'t str> {
        match self.tag() {
            Tag::String | Tag::Symbol => std::str::from_utf8(self.token().data()).ok(),
            _ => None,
        }
    }

    /// Raw bytes of any textual node.
    #[inline]
    pub fn as_bytes(self) -> Option<&'t [u8]> {
        self.token().text()
    }

    pub fn as_array(self) -> Option<ArrayView<'t>> {
        match self.value() {
            Value::Array(view) => Some(view),
            _ => None,
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index())
            .field("tag", &self.tag())
            .field("len", &self.len())
            .finish()
    }
}

/// Borrowed view of a packed or numeric array.
///
/// Elements are decoded on access; the underlying bytes carry no alignment guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayView<'t> {
    kind: ArrayKind,
    element: ElementType,
    dims: &'t [usize],
    bytes: &'t [u8],
}

impl<'t> ArrayView<'t> {
    #[inline]
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    #[inline]
    pub fn element(&self) -> ElementType {
        self.element
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &'t [usize] {
        self.dims
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.element.width()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw little-endian element bytes, row-major.
    #[inline]
    pub fn bytes(&self) -> &'t [u8] {
        self.bytes
    }

    /// Iterate elements as `T`, or `None` if `T` is not the stored element type.
    pub fn iter<T: ArrayElement>(&self) -> Option<impl ExactSizeIterator<Item = T> + use<'t, T>> {
        if T::ELEMENT != self.element {
            return None;
        }
        Some(self.bytes.chunks_exact(T::WIDTH).map(T::read_le))
    }

    pub fn to_vec<T: ArrayElement>(&self) -> Option<Vec<T>> {
        self.iter::<T>().map(Iterator::collect)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::Complex;
    use crate::tree::decode;

    use super::*;

    #[test]
    fn function_accessors() {
        let tree = decode(b"8:f\x02s\x01fC\x01S\x01a").unwrap();
        let root = tree.root();
        assert_eq!(root.tag(), Tag::Function);
        assert_eq!(root.len(), 2);
        assert!(!root.is_leaf());
        assert_eq!(root.head_name(), Some("f"));
        assert_eq!(root.child(0).and_then(NodeRef::as_integer), Some(1));
        assert_eq!(root.child(1).and_then(NodeRef::as_str), Some("a"));
        assert!(root.child(2).is_none());

        let tags: Vec<_> = root.children().map(NodeRef::tag).collect();
        assert_eq!(tags, [Tag::Integer8, Tag::String]);
        assert!(matches!(root.value(), Value::Function { len: 2, .. }));
    }

    #[test]
    fn scalar_values() {
        let tree = decode(b"8:r\x00\x00\x00\x00\x00\x00\xf8\x3f").unwrap();
        assert_eq!(tree.root().value(), Value::Real(1.5));

        let tree = decode(b"8:I\x0512345").unwrap();
        assert_eq!(tree.root().value(), Value::BigInteger(b"12345"));
        assert_eq!(tree.root().as_str(), None);
        assert_eq!(tree.root().as_bytes(), Some(&b"12345"[..]));
    }

    #[test]
    fn array_view() {
        let mut buf = b"8:\xC1\x33\x01\x02".to_vec();
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let tree = decode(&buf).unwrap();
        let view = tree.root().as_array().unwrap();
        assert_eq!(view.kind(), ArrayKind::Packed);
        assert_eq!(view.element(), ElementType::ComplexReal32);
        assert_eq!(view.dims(), &[2]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.to_vec::<f32>(), None);
        assert_eq!(
            view.to_vec::<Complex<f32>>(),
            Some(vec![Complex::new(1.0, 2.0), Complex::new(3.0, 4.0)])
        );
    }
}
