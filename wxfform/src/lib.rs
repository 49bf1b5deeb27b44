//! Wxfform: FullForm-like templates compiled to WXF.
//!
//! A template is a single expression such as `f[1, "a", {x, #arg}]`, where `#arg` is a
//! placeholder replaced at compile time by pre-encoded bytes or by a callback driving the
//! [`wxf::Encoder`]. `Rule[a, b]` and `RuleDelayed[a, b]` compile to the dedicated rule tags;
//! every other call becomes a function with a symbol head.
pub mod ast;
pub mod compile;
pub mod error;
/// Template grammar.
pub mod parser;

pub use ast::Ast;
pub use compile::{Fragment, Substitutions, Template, compile};
pub use error::{ParseDiagnostic, TemplateError};
