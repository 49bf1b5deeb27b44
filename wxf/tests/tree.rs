use wxf::pretty::MAX_PRINT_DEPTH;
use wxf::{
    DecodeError, DecodeOptions, Encoder, NodeRef, PrettyExpr, Tag, decode, decode_with, tokenize,
};

fn nested_lists(depth: usize) -> Vec<u8> {
    let mut enc = Encoder::with_header();
    for _ in 0..depth {
        enc.push_function("List", 1);
    }
    enc.push_integer(42);
    enc.into_bytes()
}

#[test]
fn deep_nesting_does_not_recurse() {
    let depth = 100_000;
    let bytes = nested_lists(depth);
    let tree = decode(&bytes).unwrap();

    let mut node = tree.root();
    let mut seen = 0;
    while let Some(child) = node.child(0) {
        seen += 1;
        node = child;
    }
    assert_eq!(seen, depth);
    assert_eq!(node.as_integer(), Some(42));

    // Re-encoding is iterative too.
    assert_eq!(tree.to_bytes(), bytes);
}

#[test]
fn deep_trees_display_with_bounded_stack() {
    let bytes = nested_lists(100_000);
    let tree = decode(&bytes).unwrap();

    let text = tree.to_string();
    assert!(text.starts_with("{{{"));
    assert_eq!(text.matches('{').count(), MAX_PRINT_DEPTH + 1);
    assert!(text.contains('…'));
    assert!(!text.contains("42"));

    let deepest = tree.root().children().next().unwrap().pretty_string();
    assert_eq!(deepest.matches('{').count(), MAX_PRINT_DEPTH + 1);
}

#[test]
fn depth_limit_is_optional() {
    let bytes = nested_lists(64);
    assert!(decode(&bytes).is_ok());
    assert_eq!(
        decode_with(&bytes, &DecodeOptions::new().max_depth(16)).unwrap_err(),
        DecodeError::DepthLimitExceeded { limit: 16 }
    );
}

#[test]
fn declared_children_are_all_populated() {
    let mut enc = Encoder::with_header();
    enc.push_function("f", 3)
        .push_function("g", 2)
        .push_integer(1)
        .push_rule()
        .push_symbol("a")
        .push_symbol("b")
        .push_string("x")
        .push_association(0);
    let tree = decode(enc.as_bytes()).unwrap();

    let root = tree.root();
    assert_eq!(root.len(), 3);
    let g = root.child(0).unwrap();
    assert_eq!(g.head_name(), Some("g"));
    assert_eq!(g.len(), 2);
    assert_eq!(g.child(1).unwrap().tag(), Tag::Rule);
    assert_eq!(g.child(1).unwrap().len(), 2);
    assert_eq!(root.child(2).unwrap().tag(), Tag::Association);
    assert!(root.child(2).unwrap().is_empty());
    assert!(!root.child(2).unwrap().is_leaf());
}

#[test]
fn removing_the_last_child_is_an_arity_mismatch() {
    let mut enc = Encoder::with_header();
    enc.push_function("f", 2)
        .push_function("g", 1)
        .push_integer(1)
        .push_integer(2);
    let mut bytes = enc.into_bytes();
    assert!(decode(&bytes).is_ok());

    // Drop the final `C 2` token.
    bytes.truncate(bytes.len() - 2);
    assert!(tokenize(&bytes).is_ok());
    assert_eq!(
        decode(&bytes).unwrap_err(),
        DecodeError::ArityMismatch {
            unclosed: 1,
            trailing: 0
        }
    );
}

#[test]
fn leftover_tokens_are_an_arity_mismatch() {
    let mut enc = Encoder::with_header();
    enc.push_rule()
        .push_symbol("a")
        .push_symbol("b")
        .push_symbol("c");
    assert_eq!(
        decode(enc.as_bytes()).unwrap_err(),
        DecodeError::ArityMismatch {
            unclosed: 0,
            trailing: 1
        }
    );
}

#[test]
fn children_iterate_in_order() {
    let mut enc = Encoder::with_header();
    enc.push_function("List", 4);
    for i in 0..4 {
        enc.push_integer(i * 1000);
    }
    let tree = decode(enc.as_bytes()).unwrap();
    let values: Vec<i64> = tree
        .root()
        .children()
        .filter_map(NodeRef::as_integer)
        .collect();
    assert_eq!(values, [0, 1000, 2000, 3000]);
    assert_eq!(tree.root().children().rev().next().unwrap().index(), 5);
}
