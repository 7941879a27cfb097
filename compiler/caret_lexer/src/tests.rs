use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(
        kinds("public class Foo extends Bar"),
        vec![
            TokenKind::Public,
            TokenKind::Class,
            TokenKind::Ident,
            TokenKind::Extends,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_trivia_is_reported_by_lexemes() {
    let mut lexer = Lexer::new("a /* c */ b");
    let mut tags = Vec::new();
    loop {
        let lexeme = lexer.next_lexeme();
        tags.push((lexeme.tag, lexeme.kind.is_some()));
        if lexeme.is_eof() {
            break;
        }
    }
    assert_eq!(
        tags,
        vec![
            (RawTag::Ident, true),
            (RawTag::Whitespace, false),
            (RawTag::BlockComment, false),
            (RawTag::Whitespace, false),
            (RawTag::Ident, true),
            (RawTag::Eof, true),
        ]
    );
}

#[test]
fn test_unterminated_literals_cook_to_error() {
    assert_eq!(
        kinds("\"abc\n'x"),
        vec![TokenKind::Error, TokenKind::Error, TokenKind::Eof]
    );
}

#[test]
fn test_reset_rescans_from_offset() {
    let mut lexer = Lexer::new("int x = 1;");
    let first = lexer.next_token();
    assert_eq!(first.kind, TokenKind::Int);
    lexer.next_token();
    lexer.reset_to(0);
    assert_eq!(lexer.next_token(), first);
}

#[test]
fn test_restrict_limits_scanning() {
    let mut lexer = Lexer::new("void m() { a(); b(); }");
    lexer.restrict(Span::new(11, 15));
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
    assert_eq!(lexer.next_token().kind, TokenKind::LParen);
    assert_eq!(lexer.next_token().kind, TokenKind::RParen);
    assert_eq!(lexer.next_token().kind, TokenKind::Semicolon);
    let eof = lexer.next_token();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span, Span::point(15));
}

#[test]
fn test_jump_over_block_balances_nested_braces() {
    let source = "{ if (a) { b(\"}\"); } // }\n } tail";
    let mut lexer = Lexer::new(source);
    assert_eq!(lexer.next_token().kind, TokenKind::LBrace);
    let end = lexer.jump_over_block();
    assert_eq!(end, Some(27));
    let close = lexer.next_token();
    assert_eq!(close.kind, TokenKind::RBrace);
    assert_eq!(close.span.start, 27);
    assert_eq!(lexer.next_token().kind, TokenKind::Ident);
}

#[test]
fn test_jump_over_unclosed_block_reaches_eof() {
    let mut lexer = Lexer::new("{ a { b }");
    lexer.next_token();
    assert_eq!(lexer.jump_over_block(), None);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_unicode_escapes_follow_last_lexeme() {
    let mut lexer = Lexer::new("\\u0061b c");
    let tok = lexer.next_token();
    assert_eq!(tok.kind, TokenKind::Ident);
    assert_eq!(lexer.unicode_escapes(), &[(0, 6)]);
    lexer.next_token();
    assert!(lexer.unicode_escapes().is_empty());
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn tokens_are_ordered_and_in_bounds(source in "[ -~\n]{0,80}") {
            let tokens = lex(&source);
            let mut last_end = 0;
            for tok in &tokens {
                prop_assert!(tok.span.start >= last_end);
                prop_assert!(tok.span.end as usize <= source.len());
                last_end = tok.span.end;
            }
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }
}
