//! Second decode pass: rebuilding the implicit tree from the flat token sequence.
//!
//! Composites are prefix encoded with their child count and no closing delimiter, so the builder
//! keeps a stack of open frames, each collecting exactly as many children as its token declared.
//! Completing a child may complete its parent, and so on up the stack; this propagation is a loop,
//! so neither building nor dropping a tree recurses on the input's nesting depth.
use std::mem;

use log::debug;

use crate::encoder::Encoder;
use crate::error::DecodeError;
use crate::parser::tokenize;
use crate::tag::Tag;
use crate::token::Token;
use crate::view::NodeRef;

/// Knobs of the tree builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
    /// Maximum number of composites open at once, unlimited when `None`.
    pub max_depth: Option<usize>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }
}

/// A node of the decoded tree, referring to its token by index.
///
/// Children are allocated once with the declared arity of the token and never resized. The head of
/// a function is not a child: it is the token right after the function token.
#[derive(Debug, Default)]
pub struct ExprNode {
    token: usize,
    children: Box<[ExprNode]>,
}

impl ExprNode {
    fn leaf(token: usize) -> Self {
        Self {
            token,
            children: Box::default(),
        }
    }

    /// Index of this node's token in the token list.
    #[inline]
    pub fn token(&self) -> usize {
        self.token
    }

    #[inline]
    pub fn children(&self) -> &[ExprNode] {
        &self.children
    }
}

impl Drop for ExprNode {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }

        let mut pending = vec![mem::take(&mut self.children)];
        while let Some(children) = pending.pop() {
            for mut child in children.into_vec() {
                if !child.children.is_empty() {
                    pending.push(mem::take(&mut child.children));
                }
            }
        }
    }
}

/// An open composite waiting for its children.
struct Frame {
    token: usize,
    arity: usize,
    children: Vec<ExprNode>,
}

struct TreeBuilder<'t, 'a> {
    tokens: &'t [Token<'a>],
    next: usize,
    stack: Vec<Frame>,
    max_depth: Option<usize>,
    nodes: usize,
}

impl<'t, 'a> TreeBuilder<'t, 'a> {
    fn new(tokens: &'t [Token<'a>], options: &DecodeOptions) -> Self {
        Self {
            tokens,
            next: 0,
            stack: Vec::new(),
            max_depth: options.max_depth,
            nodes: 0,
        }
    }

    fn build(mut self) -> Result<ExprNode, DecodeError> {
        if self.tokens.is_empty() {
            return Err(DecodeError::EmptyExpression);
        }

        let root = loop {
            if self.next == self.tokens.len() {
                return Err(DecodeError::ArityMismatch {
                    unclosed: self.stack.len(),
                    trailing: 0,
                });
            }
            if let Some(node) = self.step()? {
                if let Some(root) = self.place(node) {
                    break root;
                }
            }
        };

        let trailing = self.tokens.len() - self.next;
        if trailing > 0 {
            return Err(DecodeError::ArityMismatch {
                unclosed: 0,
                trailing,
            });
        }

        debug!(
            "expression tree completed: {} token(s), {} node(s)",
            self.tokens.len(),
            self.nodes
        );
        Ok(root)
    }

    /// Consume the next token. Returns a finished node, or `None` when a new frame was opened.
    fn step(&mut self) -> Result<Option<ExprNode>, DecodeError> {
        let index = self.next;
        let token = &self.tokens[index];
        self.next += 1;
        self.nodes += 1;

        let Some(arity) = token.arity() else {
            return Ok(Some(ExprNode::leaf(index)));
        };

        if token.tag() == Tag::Function {
            match self.tokens.get(self.next) {
                Some(head) if !head.is_composite() => self.next += 1,
                _ => return Err(DecodeError::InvalidHead { token: index }),
            }
        }

        if arity == 0 {
            return Ok(Some(ExprNode::leaf(index)));
        }

        // Every child needs at least one token, so this bounds the allocation below.
        if arity > self.tokens.len() - self.next {
            return Err(DecodeError::ArityMismatch {
                unclosed: self.stack.len() + 1,
                trailing: 0,
            });
        }
        if let Some(limit) = self.max_depth {
            if self.stack.len() >= limit {
                return Err(DecodeError::DepthLimitExceeded { limit });
            }
        }

        self.stack.push(Frame {
            token: index,
            arity,
            children: Vec::with_capacity(arity),
        });
        Ok(None)
    }

    /// Attach a finished node to the innermost open frame, closing every frame it completes.
    ///
    /// Returns the root once the stack is empty.
    fn place(&mut self, mut node: ExprNode) -> Option<ExprNode> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Some(node);
            };

            frame.children.push(node);
            if frame.children.len() < frame.arity {
                return None;
            }

            let Frame {
                token, children, ..
            } = self.stack.pop()?;
            node = ExprNode {
                token,
                children: children.into_boxed_slice(),
            };
        }
    }
}

/// A decoded expression: the token list and the tree built over it.
///
/// Tokens borrow the input buffer (`'a`); nodes refer to tokens by index.
#[derive(Debug)]
pub struct ExprTree<'a> {
    tokens: Vec<Token<'a>>,
    root: ExprNode,
}

impl<'a> ExprTree<'a> {
    pub fn from_tokens(tokens: Vec<Token<'a>>) -> Result<Self, DecodeError> {
        Self::from_tokens_with(tokens, &DecodeOptions::default())
    }

    pub fn from_tokens_with(
        tokens: Vec<Token<'a>>,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        let root = TreeBuilder::new(&tokens, options).build()?;
        Ok(Self { tokens, root })
    }

    #[inline]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(&self.tokens, &self.root)
    }

    #[inline]
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token<'a>> {
        self.tokens
    }

    /// Re-encode the whole expression, header included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut encoder = Encoder::with_header();
        encoder.push_node(self.root());
        encoder.into_bytes()
    }
}

/// Decode a complete buffer into an expression tree.
pub fn decode(buffer: &[u8]) -> Result<ExprTree<'_>, DecodeError> {
    decode_with(buffer, &DecodeOptions::default())
}

pub fn decode_with<'a>(
    buffer: &'a [u8],
    options: &DecodeOptions,
) -> Result<ExprTree<'a>, DecodeError> {
    ExprTree::from_tokens_with(tokenize(buffer)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(node: &ExprNode) -> String {
        if node.children().is_empty() {
            return node.token().to_string();
        }
        let children: Vec<_> = node.children().iter().map(shape).collect();
        format!("{}({})", node.token(), children.join(" "))
    }

    #[test]
    fn leaf_root() {
        let tree = decode(b"8:C\x05").unwrap();
        assert_eq!(shape(&tree.root), "0");
    }

    #[test]
    fn function_head_is_skipped() {
        let tree = decode(b"8:f\x02s\x01fC\x01S\x01a").unwrap();
        assert_eq!(shape(&tree.root), "0(2 3)");
    }

    #[test]
    fn one_leaf_closes_many_frames() {
        // f[g[h[1]], 2]
        let buf = b"8:f\x02s\x01ff\x01s\x01gf\x01s\x01hC\x01C\x02";
        let tree = decode(buf).unwrap();
        assert_eq!(shape(&tree.root), "0(2(4(6)) 7)");
    }

    #[test]
    fn rules_in_association() {
        // <|a -> 1, b :> 2|>
        let buf = b"8:A\x02-s\x01aC\x01:s\x01bC\x02";
        let tree = decode(buf).unwrap();
        assert_eq!(shape(&tree.root), "0(1(2 3) 4(5 6))");
    }

    #[test]
    fn rule_root_has_two_children() {
        let tree = decode(b"8::s\x01aC\x07").unwrap();
        assert_eq!(shape(&tree.root), "0(1 2)");
        assert_eq!(
            decode(b"8:-C\x01C\x02C\x03").unwrap_err(),
            DecodeError::ArityMismatch {
                unclosed: 0,
                trailing: 1
            }
        );
    }

    #[test]
    fn zero_arity_function_is_a_leaf() {
        let tree = decode(b"8:f\x00s\x04List").unwrap();
        assert_eq!(shape(&tree.root), "0");
        assert_eq!(tree.tokens().len(), 2);
    }

    #[test]
    fn structural_errors() {
        assert_eq!(decode(b"8:").unwrap_err(), DecodeError::EmptyExpression);
        assert_eq!(
            decode(b"8:C\x01C\x02").unwrap_err(),
            DecodeError::ArityMismatch {
                unclosed: 0,
                trailing: 1
            }
        );
        // f declares two children but only g[1] follows.
        assert_eq!(
            decode(b"8:f\x02s\x01ff\x01s\x01gC\x01").unwrap_err(),
            DecodeError::ArityMismatch {
                unclosed: 1,
                trailing: 0
            }
        );
        assert_eq!(
            decode(b"8:f\x01-C\x01C\x02").unwrap_err(),
            DecodeError::InvalidHead { token: 0 }
        );
    }

    #[test]
    fn depth_limit() {
        let buf = b"8:f\x01s\x01ff\x01s\x01gC\x01";
        let options = DecodeOptions::new().max_depth(1);
        assert_eq!(
            decode_with(buf, &options).unwrap_err(),
            DecodeError::DepthLimitExceeded { limit: 1 }
        );
        assert!(decode_with(buf, &DecodeOptions::new().max_depth(2)).is_ok());
    }

    #[test]
    fn into_tokens_keeps_tokens() {
        let tree = decode(b"8:-C\x01C\x02").unwrap();
        let tokens = tree.into_tokens();
        assert_eq!(tokens.len(), 3);
    }
}
