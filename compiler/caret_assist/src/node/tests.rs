use std::num::NonZeroU64;
use std::ops::ControlFlow;

use caret_ir::ast::ConstructorTarget;
use caret_ir::{AssistId, Ident, Span};
use pretty_assertions::assert_eq;

use super::{CompletionKind, CompletionNode, CompletionPayload};

fn segments() -> Vec<Ident> {
    let assist = AssistId::new(NonZeroU64::MIN);
    vec![
        Ident::new("java", Span::new(7, 11)),
        Ident {
            assist: Some(assist),
            ..Ident::new("u", Span::new(12, 13))
        },
    ]
}

#[test]
fn test_new_splits_partial_from_previous_segments() {
    let node = CompletionNode::new(
        CompletionKind::ImportRef,
        &segments(),
        CompletionPayload::Import {
            is_static: false,
            on_demand: false,
        },
    );
    let Some(node) = node else {
        panic!("expected a node");
    };
    assert_eq!(node.partial_name(), "u");
    assert_eq!(node.qualifier(), "java");
    assert_eq!(node.span, Span::new(7, 13));
}

#[test]
fn test_new_requires_a_segment() {
    assert_eq!(
        CompletionNode::new(CompletionKind::SingleName, &[], CompletionPayload::None),
        None
    );
}

#[test]
fn test_explicit_constructor_call_keeps_argument_span() {
    let segments = segments();
    let Some(argument) = CompletionNode::new(
        CompletionKind::SingleName,
        &segments[1..],
        CompletionPayload::None,
    ) else {
        panic!("expected a node");
    };
    let wrapped = CompletionNode::explicit_constructor_call(argument.clone(), ConstructorTarget::Super);
    assert_eq!(wrapped.kind, CompletionKind::ExplicitConstructorCall);
    assert_eq!(wrapped.span, argument.span);
    assert_eq!(wrapped.innermost(), &argument);
    assert_eq!(wrapped.partial_name(), "u");
}

#[test]
fn test_resolve_always_signals_found() {
    let Some(node) = CompletionNode::new(
        CompletionKind::SingleName,
        &segments()[1..],
        CompletionPayload::None,
    ) else {
        panic!("expected a node");
    };
    assert_eq!(node.resolve(), ControlFlow::Break(&node));
}
