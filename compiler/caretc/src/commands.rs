//! The `complete` and `tokens` commands.

use std::fmt::Write as _;
use std::num::NonZeroU64;

use caret_assist::{
    CompletionOutcome, CompletionPayload, Cursor, CursorScanner, ElementStack, ParseSession,
    ReferenceContext, SessionOptions,
};
use caret_ir::{AssistId, TokenKind};
use caret_lexer::Lexer;
use caret_parse::TokenSource;

pub fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
        std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{path}'"),
        std::io::ErrorKind::InvalidData => format!("'{path}' contains invalid UTF-8 data"),
        _ => format!("error reading '{path}': {e}"),
    })
}

/// Run one completion request and render its outcome.
pub fn complete(
    source: &str,
    offset: i64,
    context: &ReferenceContext,
    options: SessionOptions,
) -> Result<String, caret_assist::AssistError> {
    let mut session = ParseSession::new().with_options(options);
    let outcome = session.complete(source, Cursor::new(offset), context)?;
    Ok(render_outcome(&outcome))
}

pub fn render_outcome(outcome: &CompletionOutcome) -> String {
    let mut out = String::new();
    match outcome {
        CompletionOutcome::Completion(completion) => {
            let node = &completion.node;
            let _ = writeln!(out, "completion {:?} @ {}", node.kind, node.span);
            let _ = writeln!(out, "  partial: {:?}", node.partial_name());
            if !node.previous_segments.is_empty() {
                let _ = writeln!(out, "  qualifier: {}", node.qualifier());
            }
            if let CompletionPayload::ExplicitConstructorCall { target, argument } = &node.payload {
                let _ = writeln!(
                    out,
                    "  wraps: {:?} {:?} @ {} ({target:?})",
                    argument.kind,
                    argument.partial_name(),
                    argument.span
                );
            } else if node.payload != CompletionPayload::None {
                let _ = writeln!(out, "  payload: {:?}", node.payload);
            }
            let _ = writeln!(out, "  checkpoint: {}", completion.checkpoint);
            render_elements(&mut out, completion.context.elements());
            if let Some(tree) = &completion.tree {
                out.push_str(&tree.outline());
            }
        }
        CompletionOutcome::Recovered(recovered) => {
            let report = &recovered.report;
            let _ = writeln!(
                out,
                "recovered after {} round(s), checkpoint {}{}",
                report.rounds,
                report.checkpoint,
                if report.resumable { "" } else { " (not resumable)" }
            );
            render_elements(&mut out, &report.elements);
            out.push_str(&recovered.tree.outline());
        }
        CompletionOutcome::InvalidCursorLocation(reason) => {
            let _ = writeln!(out, "invalid cursor location: {}", reason.code());
        }
    }
    out
}

fn render_elements(out: &mut String, elements: &ElementStack) {
    if elements.is_empty() {
        out.push_str("  elements: (none)\n");
        return;
    }
    out.push_str("  elements:\n");
    for entry in elements.entries() {
        let _ = write!(out, "    {:?} {:?}", entry.kind, entry.info);
        if let Some(name) = &entry.payload {
            let _ = write!(out, " {}", name.as_str());
        }
        out.push('\n');
    }
}

/// The token stream, with the assist identifier marked when `offset` is
/// given.
pub fn tokens(source: &str, offset: Option<i64>) -> Result<String, String> {
    let mut lexer = Lexer::new(source);
    let mut out = String::new();
    let Some(offset) = offset else {
        loop {
            let token = lexer.next_token();
            let _ = writeln!(out, "{:?} @ {}", token.kind, token.span);
            if token.kind == TokenKind::Eof {
                return Ok(out);
            }
        }
    };

    let caret = Cursor::new(offset)
        .caret(lexer.source_len())
        .map_err(|e| e.to_string())?;
    let mut scanner = CursorScanner::new(&mut lexer, caret, AssistId::new(NonZeroU64::MIN));
    loop {
        let token = match scanner.next_token() {
            Ok(token) => token,
            Err(reason) => {
                let _ = writeln!(out, "invalid cursor location: {}", reason.code());
                return Ok(out);
            }
        };
        let text = scanner.text(token.span);
        let marker = if token.assist.is_some() { "  <assist>" } else { "" };
        let _ = writeln!(out, "{:?} {text:?} @ {}{marker}", token.kind, token.span);
        if token.kind == TokenKind::Eof {
            return Ok(out);
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]
