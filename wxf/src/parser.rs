//! First decode pass: a single forward scan producing flat tokens.
use log::{debug, trace};

use crate::encoding::{integer, magic};
use crate::error::DecodeError;
use crate::tag::{ArrayKind, ElementType, Tag, TagClass};
use crate::token::{ArrayShape, Dims, Payload, Token};

/// Scans a buffer into [`Token`]s without building any hierarchy.
///
/// The parser never recurses and never reads outside `buffer`: every declared length, count, rank
/// and dimension is checked against the remaining bytes before it is used. If [`Parser::parse`]
/// fails, the tokens read before the error stay available through [`Parser::tokens`].
#[derive(Debug)]
pub struct Parser<'a> {
    buffer: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Check the header and tokenize the rest of the buffer.
    pub fn parse(&mut self) -> Result<(), DecodeError> {
        let result = self.run();
        if let Err(err) = &result {
            debug!(
                "decode aborted after {} token(s) at offset {}: {err}",
                self.tokens.len(),
                self.pos
            );
        }
        result
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token<'a>> {
        self.tokens
    }

    fn run(&mut self) -> Result<(), DecodeError> {
        if self.pos == 0 {
            if !self.buffer.starts_with(&magic::HEADER) {
                return Err(DecodeError::BadHeader);
            }
            self.pos = magic::HEADER.len();
        }

        while self.pos < self.buffer.len() {
            let token = self.next_token()?;
            trace!("token #{} at {}: {token}", self.tokens.len(), token.offset);
            self.tokens.push(token);
        }
        Ok(())
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let buffer = self.buffer;
        let start = self.pos;
        self.pos += len;
        Ok(&buffer[start..self.pos])
    }

    fn read_varint(&mut self) -> Result<usize, DecodeError> {
        let (value, consumed) = integer::decode_u64_exact(self.buffer, self.pos)
            .ok_or_else(|| self.truncated(self.remaining() + 1))?;
        let value = usize::try_from(value).map_err(|_| self.truncated(usize::MAX))?;
        self.pos += consumed;
        Ok(value)
    }

    /// Reject a count of items that cannot possibly fit, each item taking at least one byte.
    fn ensure_room(&self, items: usize) -> Result<(), DecodeError> {
        if items > self.remaining() {
            Err(self.truncated(items))
        } else {
            Ok(())
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, DecodeError> {
        let buffer = self.buffer;
        let offset = self.pos;
        let byte = buffer[offset];
        let tag = Tag::from_repr(byte).ok_or(DecodeError::UnknownTag { offset, tag: byte })?;
        self.pos += 1;

        let (data, payload) = match tag.class() {
            TagClass::Scalar { width } => (self.take(width)?, Payload::Atom),
            TagClass::Textual => {
                let len = self.read_varint()?;
                (self.take(len)?, Payload::Atom)
            }
            TagClass::Composite { .. } => match tag.fixed_arity() {
                Some(arity) => {
                    self.ensure_room(arity)?;
                    (&buffer[self.pos..self.pos], Payload::Composite { arity })
                }
                None => {
                    let start = self.pos;
                    let arity = self.read_varint()?;
                    // The head is one expression beyond the declared count.
                    let needed = match tag {
                        Tag::Function => arity.saturating_add(1),
                        _ => arity,
                    };
                    self.ensure_room(needed)?;
                    (&buffer[start..self.pos], Payload::Composite { arity })
                }
            },
            TagClass::Array { numeric } => {
                let kind = if numeric {
                    ArrayKind::Numeric
                } else {
                    ArrayKind::Packed
                };
                let shape = self.read_array_shape(kind)?;
                (self.take_elements(&shape)?, Payload::Array(shape))
            }
            TagClass::Invalid => return Err(DecodeError::UnknownTag { offset, tag: byte }),
        };

        Ok(Token {
            tag,
            offset,
            data,
            payload,
        })
    }

    fn read_array_shape(&mut self, kind: ArrayKind) -> Result<ArrayShape, DecodeError> {
        let offset = self.pos;
        let raw = self.take(1)?[0];
        let element = ElementType::from_repr(raw)
            .filter(|element| element.allowed_in(kind))
            .ok_or(DecodeError::UnknownElementType { offset, tag: raw })?;

        let rank = self.read_varint()?;
        self.ensure_room(rank)?;

        let mut dims = Dims::with_capacity(rank);
        let mut len: usize = 1;
        for _ in 0..rank {
            let dim = self.read_varint()?;
            // An overflowing element count can never be backed by the buffer.
            len = len.checked_mul(dim).ok_or_else(|| self.truncated(usize::MAX))?;
            dims.push(dim);
        }

        Ok(ArrayShape {
            kind,
            element,
            len,
            dims,
        })
    }

    fn take_elements(&mut self, shape: &ArrayShape) -> Result<&'a [u8], DecodeError> {
        let byte_len = shape
            .byte_len()
            .ok_or_else(|| self.truncated(usize::MAX))?;
        self.take(byte_len)
    }
}

/// Tokenize a whole buffer, discarding partial output on error.
pub fn tokenize(buffer: &[u8]) -> Result<Vec<Token<'_>>, DecodeError> {
    let mut parser = Parser::new(buffer);
    parser.parse()?;
    Ok(parser.into_tokens())
}
