use std::num::NonZeroU64;

use caret_ir::{AssistId, InvalidCursorReason, Span, TokenKind};
use caret_lexer::Lexer;
use caret_parse::TokenSource;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::CursorScanner;

const ASSIST: AssistId = AssistId::new(NonZeroU64::MIN);

/// Scan to end of input, rendering tokens as `kind text` with a `#` on
/// the assist identifier.
fn scan(source: &str, caret: u32) -> Result<Vec<String>, InvalidCursorReason> {
    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, caret, ASSIST);
    let mut out = Vec::new();
    loop {
        let token = scanner.next_token()?;
        if token.kind == TokenKind::Eof {
            return Ok(out);
        }
        let mark = if token.is_assist() { "#" } else { "" };
        out.push(format!("{mark}{}", scanner.text(token.span)));
    }
}

fn assist_span(source: &str, caret: u32) -> Option<Span> {
    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, caret, ASSIST);
    loop {
        match scanner.next_token() {
            Ok(token) if token.is_assist() => return Some(token.span),
            Ok(token) if token.kind == TokenKind::Eof => return None,
            Ok(_) => {}
            Err(_) => return None,
        }
    }
}

#[test]
fn test_word_is_truncated_at_caret() {
    assert_eq!(scan("int foo;", 6), Ok(vec!["int".into(), "#fo".into(), ";".into()]));
    assert_eq!(scan("fo", 2), Ok(vec!["#fo".into()]));
}

#[test]
fn test_keyword_at_caret_becomes_identifier() {
    let mut lexer = Lexer::new("retur");
    let mut scanner = CursorScanner::new(&mut lexer, 5, ASSIST);
    let token = scanner.next_token();
    assert_eq!(token.map(|t| (t.kind, t.is_assist())), Ok((TokenKind::Ident, true)));
}

#[test]
fn test_empty_assist_in_whitespace_and_at_eof() {
    assert_eq!(scan("a  b", 2), Ok(vec!["a".into(), "#".into(), "b".into()]));
    assert_eq!(scan("a ", 2), Ok(vec!["a".into(), "#".into()]));
    assert_eq!(assist_span("a ", 2), Some(Span::new(2, 2)));
}

#[test]
fn test_empty_assist_before_token_at_caret() {
    assert_eq!(
        scan("f(a,)", 4),
        Ok(vec!["f".into(), "(".into(), "a".into(), ",".into(), "#".into(), ")".into()])
    );
    // A word starting at the caret is claimed with an empty prefix.
    assert_eq!(scan("f(x)", 2), Ok(vec!["f".into(), "(".into(), "#".into(), ")".into()]));
}

#[test]
fn test_word_ending_at_caret_wins_over_following_whitespace() {
    assert_eq!(scan("ab cd", 2), Ok(vec!["#ab".into(), "cd".into()]));
}

#[test]
fn test_caret_past_input_issues_nothing() {
    assert_eq!(scan("class A", 8), Ok(vec!["class".into(), "A".into()]));
}

#[test]
fn test_invalid_cursor_locations() {
    assert_eq!(scan("x = 12;", 5), Err(InvalidCursorReason::InsideNumber));
    assert_eq!(scan("x = 12;", 6), Err(InvalidCursorReason::InsideNumber));
    assert_eq!(scan("s = \"abc\";", 6), Err(InvalidCursorReason::InsideString));
    assert_eq!(scan("s = \"abc", 8), Err(InvalidCursorReason::InsideString));
    assert_eq!(scan("/* hel */", 6), Err(InvalidCursorReason::InsideComment));
    assert_eq!(scan("// abc", 6), Err(InvalidCursorReason::InsideComment));
    assert_eq!(scan("a\\u0062c", 3), Err(InvalidCursorReason::InsideUnicode));
}

#[test]
fn test_caret_inside_doc_comment_is_let_through() {
    assert_eq!(scan("/** hel */ class A", 7), Ok(vec!["class".into(), "A".into()]));
    assert_eq!(assist_span("/** hel */ class A", 7), None);
    assert_eq!(scan("/**/ int x;", 2), Err(InvalidCursorReason::InsideComment));
}

#[test]
fn test_caret_at_literal_start_is_not_inside() {
    assert_eq!(scan("x = 12", 4), Ok(vec!["x".into(), "=".into(), "#".into(), "12".into()]));
}

#[test]
fn test_rescan_reissues_the_same_identifier() {
    let source = "a.b(c, d";
    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, 6, ASSIST);
    let mut first = Vec::new();
    while let Ok(token) = scanner.next_token() {
        first.push(token);
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    scanner.reset_to(0);
    let mut second = Vec::new();
    while let Ok(token) = scanner.next_token() {
        second.push(token);
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    assert_eq!(first, second);
    assert_eq!(scanner.issued(), Some(Span::new(6, 6)));
}

#[test]
fn test_eof_repeats_after_end() {
    let mut lexer = Lexer::new("a");
    let mut scanner = CursorScanner::new(&mut lexer, 1, ASSIST);
    assert!(scanner.next_token().is_ok_and(|t| t.is_assist()));
    for _ in 0..3 {
        assert_eq!(scanner.next_token().map(|t| t.kind), Ok(TokenKind::Eof));
    }
}

#[test]
fn test_jump_refuses_block_with_caret() {
    let source = "{ a; { b; } } c";
    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, 14, ASSIST);
    scanner.reset_to(1);
    assert_eq!(scanner.jump_over_block(), Some(12));

    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, 8, ASSIST);
    scanner.reset_to(1);
    assert_eq!(scanner.jump_over_block(), None);
}

#[test]
fn test_token_end_after_ignores_caret() {
    let mut lexer = Lexer::new("foo bar");
    let mut scanner = CursorScanner::new(&mut lexer, 5, ASSIST);
    assert_eq!(scanner.token_end_after(3), Some(7));
    assert_eq!(scanner.token_end_after(7), None);
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn at_most_one_assist_span(source in "[a-z (){};.,=0-9\"/*]{0,40}", caret in 0u32..42) {
            let mut lexer = Lexer::new(&source);
            let mut scanner = CursorScanner::new(&mut lexer, caret, ASSIST);
            let mut spans = Vec::new();
            for _ in 0..200 {
                match scanner.next_token() {
                    Ok(token) if token.kind == TokenKind::Eof => break,
                    Ok(token) if token.is_assist() => spans.push(token.span),
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            prop_assert!(spans.len() <= 1);
            if let Some(span) = spans.first() {
                prop_assert_eq!(span.end, caret);
            }
        }
    }
}
