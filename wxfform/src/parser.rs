//! Chumsky grammar of the template notation.
//!
//! ```text
//! expr        := number | symbol call? | "-" | placeholder | string | list
//! call        := "[" (expr ("," expr)*)? "]"
//! list        := "{" (expr ("," expr)*)? "}"          ; sugar for List[...]
//! symbol      := [A-Za-z$] [A-Za-z0-9$]*
//! placeholder := "#" [A-Za-z0-9$]*
//! number      := "-"? (digits ("." digits?)? | "." digits) ([eE] [+-]? digits)?
//! ```
//!
//! A number with a dot or an exponent is a real. A `-` not followed by a number is the symbol `-`.
//! In strings, `\n \t \r \" \\` are escapes; any other backslash is kept as is.
use chumsky::prelude::*;

use crate::ast::Ast;

type Extra<'src> = extra::Err<Rich<'src, char>>;

fn is_symbol_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == '$'
}

pub fn symbol_parser<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '$')
        .then(any().filter(is_symbol_char).repeated())
        .to_slice()
        .map(ToString::to_string)
        .labelled("symbol")
}

pub fn placeholder_parser<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('#')
        .ignore_then(any().filter(is_symbol_char).repeated().to_slice())
        .map(ToString::to_string)
        .labelled("placeholder")
}

pub fn number_parser<'src>() -> impl Parser<'src, &'src str, Ast, Extra<'src>> + Clone {
    let digit = any().filter(|c: &char| c.is_ascii_digit());

    let mantissa = digit
        .clone()
        .repeated()
        .at_least(1)
        .then(just('.').then(digit.clone().repeated()).or_not())
        .ignored()
        .or(just('.')
            .then(digit.clone().repeated().at_least(1))
            .ignored());
    let exponent = one_of("eE")
        .then(one_of("+-").or_not())
        .then(digit.repeated().at_least(1).labelled("exponent digits"))
        .ignored();

    just('-')
        .or_not()
        .then(mantissa)
        .then(exponent.or_not())
        .to_slice()
        .map(|text: &str| {
            if text.contains(['.', 'e', 'E']) {
                Ast::Real(text.to_string())
            } else {
                Ast::Integer(text.to_string())
            }
        })
        .labelled("number")
}

pub fn string_parser<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let escape = just('\\').ignore_then(any()).map(|c: char| match c {
        'n' => "\n".to_string(),
        't' => "\t".to_string(),
        'r' => "\r".to_string(),
        '"' => "\"".to_string(),
        '\\' => "\\".to_string(),
        other => format!("\\{other}"),
    });
    let plain = none_of("\\\"").map(String::from);

    escape
        .or(plain)
        .repeated()
        .collect::<Vec<String>>()
        .map(|parts| parts.concat())
        .delimited_by(just('"'), just('"'))
        .labelled("string")
}

pub fn expr_parser<'src>() -> impl Parser<'src, &'src str, Ast, Extra<'src>> + Clone {
    recursive(|expr| {
        let args = expr
            .separated_by(just(',').padded())
            .collect::<Vec<Ast>>()
            .padded();

        let call = symbol_parser()
            .then(
                args.clone()
                    .delimited_by(just('['), just(']'))
                    .labelled("arguments")
                    .or_not(),
            )
            .map(|(head, args)| match args {
                Some(args) => Ast::Call { head, args },
                None => Ast::Symbol(head),
            });

        let list = args
            .delimited_by(just('{'), just('}'))
            .map(|args| Ast::call("List", args))
            .labelled("list");

        choice((
            number_parser(),
            call,
            just('-').to(Ast::Symbol("-".to_string())),
            placeholder_parser().map(Ast::Placeholder),
            string_parser().map(Ast::String),
            list,
        ))
        .padded()
        .labelled("expression")
    })
}

/// A whole template: one expression and nothing else.
pub fn template_parser<'src>() -> impl Parser<'src, &'src str, Ast, Extra<'src>> + Clone {
    expr_parser().then_ignore(end())
}
