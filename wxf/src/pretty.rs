//! RcDoc-based FullForm printer with termcolor annotations for decoded trees.
//!
//! Output is the usual textual form of expressions: `f[1, "a"]`, `{1, 2}` for lists,
//! `<|a -> 1|>` for associations, `a -> b` and `a :> b` for rules. Packed arrays print as nested
//! lists; numeric arrays as `NumericArray[{...}, "Type"]`.
//!
//! Composites nested deeper than [`MAX_PRINT_DEPTH`] print their arguments as `…`, as do arrays
//! whose rank would cross that depth, so printing any decoded tree uses bounded stack.

use std::fmt::Write as _;
use std::io::{self, Write};

use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::element::{ArrayElement, Complex};
use crate::tag::{ArrayKind, ElementType, Tag};
use crate::token::Token;
use crate::tree::ExprTree;
use crate::view::{ArrayView, NodeRef, Value};

type Doc = RcDoc<'static, Style>;

/// Nesting depth past which arguments are elided.
pub const MAX_PRINT_DEPTH: usize = 256;

/// Styles used to annotate parts of the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct, // commas
    /// Brackets are colored by nesting depth so matching pairs share a color.
    Bracket(u8),
    Head,     // function heads
    Symbol,   // symbols in argument position
    Number,   // integers, reals, big numbers
    Text,     // strings
    Operator, // ->, :>
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut s = ColorSpec::new();
        match self {
            Style::Punct => {
                s.set_dimmed(true);
            }
            Style::Bracket(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    _ => Color::Magenta,
                };
                s.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Head => {
                s.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Symbol => {
                s.set_fg(Some(Color::Green));
            }
            Style::Number => {
                s.set_fg(Some(Color::Magenta));
            }
            Style::Text => {
                s.set_fg(Some(Color::Yellow));
            }
            Style::Operator => {
                s.set_fg(Some(Color::Yellow)).set_bold(true);
            }
        }
        s
    }
}

fn styled(style: Style, s: impl Into<String>) -> Doc {
    RcDoc::text(s.into()).annotate(style)
}

fn punct(s: &'static str) -> Doc {
    RcDoc::text(s).annotate(Style::Punct)
}

#[inline]
fn bracket(s: &'static str, depth: usize) -> Doc {
    RcDoc::text(s).annotate(Style::Bracket((depth % 6) as u8))
}

/// `open item, item, ... close`, breaking after the opening bracket when too wide.
fn delimited(open: &'static str, items: Vec<Doc>, close: &'static str, depth: usize) -> Doc {
    bracket(open, depth)
        .append(
            RcDoc::line_()
                .append(RcDoc::intersperse(
                    items,
                    punct(",").append(RcDoc::line()),
                ))
                .nest(2),
        )
        .append(RcDoc::line_())
        .append(bracket(close, depth))
        .group()
}

fn quoted(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn real(value: f64) -> String {
    let mut out = String::new();
    let _ = write!(out, "{value:?}");
    out
}

fn atom_doc(token: &Token<'_>, style: Style) -> Doc {
    let data = token.data();
    match token.tag() {
        Tag::String => styled(Style::Text, quoted(data)),
        Tag::Symbol => styled(style, String::from_utf8_lossy(data)),
        Tag::BigInteger | Tag::BigReal => styled(Style::Number, String::from_utf8_lossy(data)),
        Tag::BinaryString => styled(Style::Head, "ByteArray").append(delimited(
            "[",
            vec![delimited(
                "{",
                data.iter().map(|b| styled(Style::Number, b.to_string())).collect(),
                "}",
                1,
            )],
            "]",
            0,
        )),
        Tag::Real64 => styled(Style::Number, real(token.as_real().unwrap_or_default())),
        tag if tag.is_integer() => styled(
            Style::Number,
            token.as_integer().unwrap_or_default().to_string(),
        ),
        tag => styled(style, tag.name()),
    }
}

fn elements<T: ArrayElement>(view: &ArrayView<'_>, show: impl Fn(T) -> String) -> Vec<Doc> {
    view.iter::<T>()
        .map(|values| values.map(|v| styled(Style::Number, show(v))).collect())
        .unwrap_or_default()
}

fn complex<T: std::fmt::Debug>(c: Complex<T>) -> String {
    format!("Complex[{:?}, {:?}]", c.re, c.im)
}

fn element_docs(view: &ArrayView<'_>) -> Vec<Doc> {
    match view.element() {
        ElementType::Integer8 => elements(view, |v: i8| v.to_string()),
        ElementType::Integer16 => elements(view, |v: i16| v.to_string()),
        ElementType::Integer32 => elements(view, |v: i32| v.to_string()),
        ElementType::Integer64 => elements(view, |v: i64| v.to_string()),
        ElementType::UnsignedInteger8 => elements(view, |v: u8| v.to_string()),
        ElementType::UnsignedInteger16 => elements(view, |v: u16| v.to_string()),
        ElementType::UnsignedInteger32 => elements(view, |v: u32| v.to_string()),
        ElementType::UnsignedInteger64 => elements(view, |v: u64| v.to_string()),
        ElementType::Real32 => elements(view, |v: f32| format!("{v:?}")),
        ElementType::Real64 => elements(view, real),
        ElementType::ComplexReal32 => elements(view, complex::<f32>),
        ElementType::ComplexReal64 => elements(view, complex::<f64>),
    }
}

fn array_doc(view: &ArrayView<'_>, depth: usize) -> Doc {
    let head = match view.kind() {
        ArrayKind::Packed => "PackedArray",
        ArrayKind::Numeric => "NumericArray",
    };
    let element = styled(Style::Text, quoted(view.element().name().as_bytes()));

    if view.is_empty() || depth + view.rank() > MAX_PRINT_DEPTH {
        let dims = view
            .dims()
            .iter()
            .map(|d| styled(Style::Number, d.to_string()))
            .collect();
        return styled(Style::Head, head).append(delimited(
            "[",
            vec![element, delimited("{", dims, "}", depth + 1)],
            "]",
            depth,
        ));
    }

    // Group row-major elements innermost dimension first.
    let mut items = element_docs(view);
    for (level, &dim) in view.dims().iter().enumerate().rev() {
        let groups = items.len() / dim;
        let mut flat = items.into_iter();
        items = (0..groups)
            .map(|_| delimited("{", flat.by_ref().take(dim).collect(), "}", depth + level))
            .collect();
    }
    let list = items.into_iter().next().unwrap_or_else(RcDoc::nil);

    match view.kind() {
        ArrayKind::Packed => list,
        ArrayKind::Numeric => styled(Style::Head, head).append(delimited(
            "[",
            vec![list, element],
            "]",
            depth,
        )),
    }
}

fn rule_side(node: NodeRef<'_>, depth: usize) -> Doc {
    match node.tag() {
        Tag::Rule | Tag::DelayedRule => bracket("(", depth)
            .append(node_doc(node, depth + 1))
            .append(bracket(")", depth)),
        _ => node_doc(node, depth),
    }
}

fn ellipsis() -> Doc {
    styled(Style::Punct, "…")
}

fn node_doc(node: NodeRef<'_>, depth: usize) -> Doc {
    let elide = depth >= MAX_PRINT_DEPTH && !node.is_empty();
    let args = || -> Vec<Doc> {
        if elide {
            return vec![ellipsis()];
        }
        node.children().map(|c| node_doc(c, depth + 1)).collect()
    };
    let side = |n| if elide { ellipsis() } else { rule_side(n, depth) };

    match node.value() {
        Value::Function { head, .. } => {
            if head.tag() == Tag::Symbol && head.data() == b"List" {
                delimited("{", args(), "}", depth)
            } else {
                atom_doc(head, Style::Head).append(delimited("[", args(), "]", depth))
            }
        }
        Value::Association(_) => delimited("<|", args(), "|>", depth),
        Value::Rule | Value::DelayedRule => {
            let op = if node.tag() == Tag::Rule { "->" } else { ":>" };
            let mut sides = node.children();
            match (sides.next(), sides.next()) {
                (Some(lhs), Some(rhs)) => side(lhs)
                    .append(RcDoc::space())
                    .append(styled(Style::Operator, op))
                    .append(RcDoc::line())
                    .append(side(rhs))
                    .group()
                    .nest(2),
                _ => RcDoc::nil(),
            }
        }
        Value::Array(view) => array_doc(&view, depth),
        _ => atom_doc(node.token(), Style::Symbol),
    }
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, 'w, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'w, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }
    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<'w, W: WriteColor + Write> pretty::Render for ColorWriter<'w, W> {
    type Error = io::Error;
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }
    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

fn render_to<W: WriteColor + Write>(doc: &Doc, width: usize, out: &mut W) -> io::Result<()> {
    let mut cw = ColorWriter { out };
    doc.render_raw(width, &mut cw)
}

fn terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Pretty-printing conveniences for decoded expressions.
pub trait PrettyExpr {
    /// Build the annotated document, for composing or rendering manually.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render with colors to any termcolor writer at the given width.
    fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()> {
        render_to(&self.pretty_doc(), width, out)
    }

    /// Print to stdout with colors (TTY-aware) at the terminal width, or 80 columns.
    fn pretty_print(&self) -> io::Result<()> {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(terminal_width(), &mut stdout)?;
        writeln!(stdout)
    }

    /// Plain string at 80 columns, without colors.
    fn pretty_string(&self) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(80, &mut buf);
        buf
    }
}

impl PrettyExpr for NodeRef<'_> {
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        node_doc(*self, 0)
    }
}

impl PrettyExpr for ExprTree<'_> {
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        node_doc(self.root(), 0)
    }
}

impl std::fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(80, &mut w)
    }
}

impl std::fmt::Display for ExprTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.root(), f)
    }
}
