use std::fmt;

/// Parsed template expression.
///
/// Number literals keep their source text; conversion happens when compiling so that integers
/// outside the 64-bit range can be emitted as big integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ast {
    Integer(String),
    Real(String),
    String(String),
    Symbol(String),
    /// `#name`, stored without the leading `#`.
    Placeholder(String),
    Call { head: String, args: Vec<Ast> },
}

impl Ast {
    pub fn call(head: impl Into<String>, args: Vec<Ast>) -> Self {
        Ast::Call {
            head: head.into(),
            args,
        }
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Ast::Call { .. })
    }

    /// Visit every placeholder name, left to right.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut pending = vec![self];
        while let Some(ast) = pending.pop() {
            match ast {
                Ast::Placeholder(name) => names.push(name.as_str()),
                Ast::Call { args, .. } => pending.extend(args.iter().rev()),
                _ => {}
            }
        }
        names
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Integer(text) | Ast::Real(text) | Ast::Symbol(text) => f.write_str(text),
            Ast::String(text) => write_quoted(f, text),
            Ast::Placeholder(name) => write!(f, "#{name}"),
            Ast::Call { head, args } => {
                write!(f, "{head}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
        }
    }
}
