use std::ops::Range;

use strum::EnumIs;
use thiserror::Error;
use wxf::EncodeError;

/// One syntax error, with the byte range of the template it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseDiagnostic {
    pub message: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum TemplateError {
    /// The template text is not a single well-formed expression.
    #[error("The template could not be parsed: {} syntax error(s).", .errors.len())]
    Parse { errors: Vec<ParseDiagnostic> },

    /// A placeholder has no entry in the substitution map.
    #[error("No substitution was provided for placeholder `#{0}`.")]
    MissingPlaceholder(String),

    /// `Rule` and `RuleDelayed` are encoded without a count and need exactly two arguments.
    #[error("`{name}` takes exactly 2 arguments, but {found} were given.")]
    RuleArity { name: String, found: usize },

    /// A real literal that does not parse as a 64-bit float.
    #[error("Invalid real literal `{0}`.")]
    NumberLiteral(String),

    /// A substitution callback failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
