use caret_ir::{AstNode, Span, TokenKind};
use pretty_assertions::assert_eq;

use crate::{parse_compilation_unit, ErrorContext, ParseError, TokenSet};

#[test]
fn test_parse_compilation_unit_returns_top_level_nodes() {
    let nodes = parse_compilation_unit("package p; import q.R; class A {} interface B {}");
    let Ok(nodes) = nodes else {
        panic!("unexpected stall: {nodes:?}");
    };
    assert_eq!(nodes.len(), 4);
    assert!(matches!(nodes[3], AstNode::Type(ref t) if t.name.as_str() == "B"));
}

#[test]
fn test_parse_compilation_unit_reports_first_stall() {
    let error = parse_compilation_unit("class A { int x = ; }");
    let Err(error) = error else {
        panic!("expected a stall");
    };
    assert_eq!(error.found, TokenKind::Semicolon);
    assert_eq!(error.span, Span::new(18, 19));
    assert_eq!(error.context, ErrorContext::Expression);
}

#[test]
fn test_parse_error_display() {
    let error = ParseError::new(
        TokenSet::single(TokenKind::Ident).with(TokenKind::LBrace),
        TokenKind::Semicolon,
        Span::new(3, 4),
        ErrorContext::ClassBody,
    );
    assert_eq!(
        error.to_string(),
        "expected `identifier` or `{`, found `;` at 3..4 in a class body"
    );
}

#[test]
fn test_empty_source_is_an_empty_unit() {
    assert_eq!(parse_compilation_unit(""), Ok(Vec::new()));
    assert_eq!(parse_compilation_unit(";;"), Ok(Vec::new()));
}
