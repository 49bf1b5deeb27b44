use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chumsky::Parser as _;
use log::{debug, warn};
use wxf::{EncodeError, Encoder};

use crate::ast::Ast;
use crate::error::{ParseDiagnostic, TemplateError};
use crate::parser::template_parser;

/// Content substituted for a placeholder.
pub enum Fragment<'f> {
    /// Complete encoded expression(s), appended verbatim.
    Bytes(Vec<u8>),
    /// Called with the encoder at the placeholder position; it must push exactly one expression.
    Callback(Box<dyn Fn(&mut Encoder) -> Result<(), EncodeError> + 'f>),
}

impl<'f> Fragment<'f> {
    pub fn callback(f: impl Fn(&mut Encoder) -> Result<(), EncodeError> + 'f) -> Self {
        Fragment::Callback(Box::new(f))
    }
}

impl From<Encoder> for Fragment<'_> {
    fn from(encoder: Encoder) -> Self {
        Fragment::Bytes(encoder.into_bytes())
    }
}

impl From<Vec<u8>> for Fragment<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Fragment::Bytes(bytes)
    }
}

impl fmt::Debug for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Fragment::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Placeholder name (without `#`) to substituted content.
pub type Substitutions<'f> = HashMap<String, Fragment<'f>>;

/// A parsed template, ready to be compiled any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    root: Ast,
}

impl Template {
    pub fn parse(src: &str) -> Result<Self, TemplateError> {
        let (root, errors) = template_parser().parse(src).into_output_errors();
        if !errors.is_empty() {
            let errors: Vec<_> = errors
                .into_iter()
                .map(|e| ParseDiagnostic {
                    message: e.to_string(),
                    span: e.span().start..e.span().end,
                })
                .collect();
            debug!("template rejected with {} error(s)", errors.len());
            return Err(TemplateError::Parse { errors });
        }
        root.map(|root| Self { root })
            .ok_or(TemplateError::Parse { errors: Vec::new() })
    }

    pub fn ast(&self) -> &Ast {
        &self.root
    }

    /// Names of the placeholders used, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        self.root.placeholders()
    }

    /// Compile into a fresh encoder, optionally starting with the `8:` header.
    pub fn compile(
        &self,
        subs: &Substitutions<'_>,
        include_header: bool,
    ) -> Result<Encoder, TemplateError> {
        let mut encoder = if include_header {
            Encoder::with_header()
        } else {
            Encoder::new()
        };
        self.compile_into(&mut encoder, subs)?;
        Ok(encoder)
    }

    /// Append the compiled expression to `encoder`. On error the encoder is left as it was.
    pub fn compile_into(
        &self,
        encoder: &mut Encoder,
        subs: &Substitutions<'_>,
    ) -> Result<(), TemplateError> {
        let rollback = encoder.len();
        let result = emit(&self.root, encoder, subs);
        if result.is_err() {
            encoder.truncate(rollback);
        }
        result
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::parse(src)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

fn emit(ast: &Ast, encoder: &mut Encoder, subs: &Substitutions<'_>) -> Result<(), TemplateError> {
    match ast {
        Ast::Integer(text) => match text.parse::<i64>() {
            Ok(value) => {
                encoder.push_integer(value);
            }
            Err(_) => {
                encoder.push_bigint(text);
            }
        },
        Ast::Real(text) => {
            let value = text
                .parse::<f64>()
                .map_err(|_| TemplateError::NumberLiteral(text.clone()))?;
            encoder.push_real(value);
        }
        Ast::String(text) => {
            encoder.push_string(text);
        }
        Ast::Symbol(name) => {
            encoder.push_symbol(name);
        }
        Ast::Placeholder(name) => match subs.get(name) {
            Some(Fragment::Bytes(bytes)) => {
                encoder.push_raw(bytes);
            }
            Some(Fragment::Callback(callback)) => callback(encoder)?,
            None => {
                warn!("unresolved template placeholder `#{name}`");
                return Err(TemplateError::MissingPlaceholder(name.clone()));
            }
        },
        Ast::Call { head, args } => {
            match head.as_str() {
                "Rule" | "RuleDelayed" if args.len() != 2 => {
                    return Err(TemplateError::RuleArity {
                        name: head.clone(),
                        found: args.len(),
                    });
                }
                "Rule" => {
                    encoder.push_rule();
                }
                "RuleDelayed" => {
                    encoder.push_delay_rule();
                }
                _ => {
                    encoder.push_function(head, args.len());
                }
            }
            for arg in args {
                emit(arg, encoder, subs)?;
            }
        }
    }
    Ok(())
}

/// Parse and compile `template` in one go.
///
/// ```
/// use wxfform::{compile, Fragment, Substitutions};
///
/// let mut subs = Substitutions::new();
/// subs.insert("x".to_string(), Fragment::callback(|enc| {
///     enc.push_integer(7);
///     Ok(())
/// }));
/// let encoder = compile("f[#x, \"a\"]", &subs, true).unwrap();
/// assert_eq!(encoder.as_bytes(), b"8:f\x02s\x01fC\x07S\x01a");
/// ```
pub fn compile(
    template: &str,
    subs: &Substitutions<'_>,
    include_header: bool,
) -> Result<Encoder, TemplateError> {
    Template::parse(template)?.compile(subs, include_header)
}
