use proptest::prelude::*;
use wxf::{DecodeError, EncodeError, Encoder, NodeRef, Tag, Value, decode};

#[derive(Debug, Clone)]
enum Expr {
    Int(i64),
    Real(f64),
    Str(String),
    Sym(String),
    Array(Vec<usize>, Vec<i16>),
    Func(String, Vec<Expr>),
    Assoc(Vec<(Expr, Expr)>),
}

fn arb_array() -> impl Strategy<Value = Expr> {
    prop::collection::vec(1usize..4, 1..4).prop_flat_map(|dims| {
        let len: usize = dims.iter().product();
        prop::collection::vec(any::<i16>(), len).prop_map(move |data| Expr::Array(dims.clone(), data))
    })
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Expr::Int),
        any::<f64>().prop_map(Expr::Real),
        ".{0,8}".prop_map(Expr::Str),
        "[a-z][a-z0-9]{0,5}".prop_map(Expr::Sym),
        arb_array(),
    ];
    leaf.prop_recursive(4, 64, 5, |inner| {
        prop_oneof![
            ("[a-z]{1,4}", prop::collection::vec(inner.clone(), 0..5))
                .prop_map(|(head, args)| Expr::Func(head, args)),
            prop::collection::vec((inner.clone(), inner), 0..4).prop_map(Expr::Assoc),
        ]
    })
}

fn encode_into(expr: &Expr, enc: &mut Encoder) {
    match expr {
        Expr::Int(v) => {
            enc.push_integer(*v);
        }
        Expr::Real(v) => {
            enc.push_real(*v);
        }
        Expr::Str(s) => {
            enc.push_string(s);
        }
        Expr::Sym(s) => {
            enc.push_symbol(s);
        }
        Expr::Array(dims, data) => {
            enc.push_array(dims, data).unwrap();
        }
        Expr::Func(head, args) => {
            enc.push_function(head, args.len());
            for arg in args {
                encode_into(arg, enc);
            }
        }
        Expr::Assoc(rules) => {
            enc.push_association(rules.len());
            for (lhs, rhs) in rules {
                enc.push_rule();
                encode_into(lhs, enc);
                encode_into(rhs, enc);
            }
        }
    }
}

fn encode(expr: &Expr) -> Vec<u8> {
    let mut enc = Encoder::with_header();
    encode_into(expr, &mut enc);
    enc.into_bytes()
}

fn same(node: NodeRef<'_>, expr: &Expr) -> bool {
    match (node.value(), expr) {
        (Value::Integer(a), Expr::Int(b)) => a == *b,
        (Value::Real(a), Expr::Real(b)) => a.to_bits() == b.to_bits(),
        (Value::String(a), Expr::Str(b)) => a == b.as_bytes(),
        (Value::Symbol(a), Expr::Sym(b)) => a == b.as_bytes(),
        (Value::Array(view), Expr::Array(dims, data)) => {
            view.dims() == &dims[..] && view.to_vec::<i16>().as_ref() == Some(data)
        }
        (Value::Function { .. }, Expr::Func(head, args)) => {
            node.head_name() == Some(head.as_str())
                && node.len() == args.len()
                && node.children().zip(args).all(|(n, e)| same(n, e))
        }
        (Value::Association(len), Expr::Assoc(rules)) => {
            len == rules.len()
                && node.children().zip(rules).all(|(rule, (lhs, rhs))| {
                    rule.tag() == Tag::Rule
                        && rule.child(0).is_some_and(|n| same(n, lhs))
                        && rule.child(1).is_some_and(|n| same(n, rhs))
                })
        }
        _ => false,
    }
}

proptest! {
    /// decode(encode(x)) reproduces values and shapes.
    #[test]
    fn prop_roundtrip(expr in arb_expr()) {
        let bytes = encode(&expr);
        let tree = decode(&bytes).unwrap();
        prop_assert!(same(tree.root(), &expr));
        prop_assert_eq!(tree.to_bytes(), bytes);
    }

    /// The integer tag is the narrowest width holding the value.
    #[test]
    fn prop_integer_minimality(value in any::<i64>()) {
        let mut enc = Encoder::new();
        enc.push_integer(value);
        let expected = if i8::try_from(value).is_ok() {
            Tag::Integer8
        } else if i16::try_from(value).is_ok() {
            Tag::Integer16
        } else if i32::try_from(value).is_ok() {
            Tag::Integer32
        } else {
            Tag::Integer64
        };
        prop_assert_eq!(enc.as_bytes()[0], expected as u8);
    }

    /// Anything not starting with `8:` is rejected before tokenizing.
    #[test]
    fn prop_header_rejection(
        header in any::<[u8; 2]>().prop_filter("valid header", |h| h != b"8:"),
        rest in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut bytes = header.to_vec();
        bytes.extend(rest);
        prop_assert_eq!(decode(&bytes).unwrap_err(), DecodeError::BadHeader);
    }

    /// An array push succeeds iff the dimensions describe the data, and fails without side effects.
    #[test]
    fn prop_array_shape(
        dims in prop::collection::vec(0usize..5, 0..4),
        data in prop::collection::vec(any::<i32>(), 0..40),
    ) {
        let mut enc = Encoder::with_header();
        enc.push_symbol("prefix");
        let before = enc.clone();

        let product: usize = dims.iter().product();
        match enc.push_array(&dims, &data) {
            Ok(_) => prop_assert_eq!(product, data.len()),
            Err(err) => {
                prop_assert_ne!(product, data.len());
                prop_assert_eq!(err, EncodeError::ArrayLengthMismatch { expected: product, found: data.len() });
                prop_assert_eq!(enc, before);
            }
        }
    }

    /// Every strict prefix of a valid buffer is rejected without reading past its end.
    #[test]
    fn prop_truncation_safety(expr in arb_expr(), cut in any::<prop::sample::Index>()) {
        let bytes = encode(&expr);
        let len = cut.index(bytes.len());
        let prefix = &bytes[..len];
        let err = decode(prefix).unwrap_err();
        if len < 2 {
            prop_assert_eq!(err, DecodeError::BadHeader);
        } else if len == 2 {
            prop_assert_eq!(err, DecodeError::EmptyExpression);
        } else {
            prop_assert!(
                err.is_truncated() || err.is_arity_mismatch(),
                "unexpected error {err:?}"
            );
        }
    }

    /// Arbitrary bytes after a valid header never panic.
    #[test]
    fn prop_garbage_is_an_error_not_a_panic(rest in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut bytes = b"8:".to_vec();
        bytes.extend(rest);
        let _ = decode(&bytes);
    }
}
