use std::num::NonZeroU64;

use caret_ir::ast::ConstructorTarget;
use caret_ir::{AssistId, AstNode, Ident, Span};
use caret_lexer::Lexer;
use caret_parse::{Flow, Goal, Interrupt, NameSite, NodeStacks, PResult, Parser, ReduceHooks};
use pretty_assertions::assert_eq;

use super::{AssistHooks, Found};
use crate::element::{ElementInfo, ElementKind};
use crate::node::{CompletionKind, CompletionPayload, ModuleRole};
use crate::recovered::RecoveredElement;
use crate::scanner::CursorScanner;
use crate::AssistError;

const ASSIST: AssistId = AssistId::new(NonZeroU64::MIN);

struct Run {
    result: PResult<()>,
    hooks: AssistHooks,
    stacks: NodeStacks,
}

fn run(source: &str, caret: u32, goal: Goal) -> Run {
    let mut lexer = Lexer::new(source);
    let mut scanner = CursorScanner::new(&mut lexer, caret, ASSIST);
    let mut stacks = NodeStacks::new();
    let mut hooks = AssistHooks::new(ASSIST, RecoveredElement::Unit, 0);
    let result = Parser::new(&mut scanner, &mut stacks, &mut hooks).parse(goal);
    Run {
        result,
        hooks,
        stacks,
    }
}

/// Parse a compilation unit with the caret at the end of `source`.
fn complete_at_end(source: &str) -> (u32, Found) {
    let len = u32::try_from(source.len()).unwrap_or(u32::MAX);
    let mut run = run(source, len, Goal::CompilationUnit);
    let Err(Interrupt::Found { checkpoint }) = run.result else {
        panic!("no completion in {source:?}: {:?}", run.result);
    };
    let Some(found) = run.hooks.take_found() else {
        panic!("completion signalled without a node");
    };
    (checkpoint, found)
}

fn kinds(found: &Found) -> Vec<ElementKind> {
    found.elements.entries().iter().map(|e| e.kind).collect()
}

#[test]
fn test_single_name_in_method_body() {
    let source = "class X { void m() { int y = fo";
    let (checkpoint, found) = complete_at_end(source);
    assert_eq!(found.node.kind, CompletionKind::SingleName);
    assert_eq!(found.node.partial_name(), "fo");
    assert_eq!(found.node.span, Span::new(29, 31));
    assert_eq!(checkpoint, 31);
    assert_eq!(
        kinds(&found),
        vec![ElementKind::TypeDelimiter, ElementKind::MethodDelimiter]
    );
    assert!(found.elements.is_inside_method());
}

#[test]
fn test_message_send_keeps_selector_context() {
    let source = "class X { void m() { list.ad(x); } }";
    let caret = u32::try_from(source.find("ad").unwrap_or(0) + 2).unwrap_or(0);
    let mut run = run(source, caret, Goal::CompilationUnit);
    let Err(Interrupt::Found { checkpoint }) = run.result else {
        panic!("expected a completion: {:?}", run.result);
    };
    let found = run.hooks.take_found();
    let Some(found) = found else {
        panic!("completion signalled without a node");
    };
    assert_eq!(found.node.kind, CompletionKind::MessageSend);
    assert_eq!(found.node.qualifier(), "list");
    assert_eq!(found.node.partial_name(), "ad");
    assert_eq!(
        found.node.payload,
        CompletionPayload::MessageSend {
            receiver: None,
            arg_count: 1,
        }
    );
    // Just past `)`.
    assert_eq!(checkpoint, 31);

    let top = found.elements.top().cloned();
    assert_eq!(top.as_ref().map(|e| e.kind), Some(ElementKind::Selector));
    assert_eq!(
        top.and_then(|e| e.payload).map(|name| name.name),
        Some("ad".into())
    );
}

#[test]
fn test_argument_of_explicit_constructor_call_is_wrapped() {
    let (_, found) = complete_at_end("class X { X() { this(1, 2, ");
    assert_eq!(found.node.kind, CompletionKind::ExplicitConstructorCall);
    let CompletionPayload::ExplicitConstructorCall { target, argument } = &found.node.payload
    else {
        panic!("unexpected payload {:?}", found.node.payload);
    };
    assert_eq!(*target, ConstructorTarget::This);
    assert_eq!(argument.kind, CompletionKind::SingleName);
    assert_eq!(argument.partial_name(), "");
    assert_eq!(found.node.innermost().kind, CompletionKind::SingleName);
    assert_eq!(
        found.elements.top().map(|e| e.info),
        Some(ElementInfo::ThisConstructor)
    );
}

#[test]
fn test_member_access_on_call_result() {
    let (_, found) = complete_at_end("class X { void m() { a.b().fo");
    assert_eq!(found.node.kind, CompletionKind::MemberAccess);
    assert_eq!(found.node.partial_name(), "fo");
    let CompletionPayload::MemberAccess { receiver } = &found.node.payload else {
        panic!("unexpected payload {:?}", found.node.payload);
    };
    assert!(receiver.is_some());
}

#[test]
fn test_qualified_type_in_class_body() {
    let (_, found) = complete_at_end("class X { java.util.Li");
    assert_eq!(found.node.kind, CompletionKind::QualifiedType);
    assert_eq!(found.node.qualifier(), "java.util");
    assert_eq!(found.node.partial_name(), "Li");
    assert_eq!(kinds(&found), vec![ElementKind::TypeDelimiter]);
}

#[test]
fn test_parameter_name_and_type() {
    let (_, found) = complete_at_end("class X { void m(String na");
    assert_eq!(found.node.kind, CompletionKind::ArgumentName);
    let CompletionPayload::Declaration { ty, varargs } = &found.node.payload else {
        panic!("unexpected payload {:?}", found.node.payload);
    };
    assert!(!varargs);
    assert_eq!(ty.render(), "String");

    let (_, found) = complete_at_end("class X { void m(Stri");
    assert_eq!(found.node.kind, CompletionKind::SingleType);
    assert_eq!(found.node.partial_name(), "Stri");
}

#[test]
fn test_package_and_import_names() {
    let source = "package com.ex";
    let mut run = run(source, 14, Goal::CompilationUnit);
    assert!(matches!(run.result, Err(Interrupt::Found { .. })));
    let found = run.hooks.take_found();
    assert_eq!(found.as_ref().map(|f| f.node.kind), Some(CompletionKind::PackageRef));
    assert_eq!(found.map(|f| f.node.qualifier()), Some("com".to_owned()));
    assert!(matches!(run.stacks.ast.as_slice(), [AstNode::Package(_)]));

    let (_, found) = complete_at_end("import static java.util.Ma");
    assert_eq!(found.node.kind, CompletionKind::ImportRef);
    assert_eq!(found.node.qualifier(), "java.util");
    assert_eq!(
        found.node.payload,
        CompletionPayload::Import {
            is_static: true,
            on_demand: false,
        }
    );
}

#[test]
fn test_module_names() {
    let (_, found) = complete_at_end("module com.ex { requires java.ba");
    assert_eq!(found.node.kind, CompletionKind::ModuleRef);
    assert_eq!(found.node.payload, CompletionPayload::Module(ModuleRole::Requires));
    assert_eq!(found.node.qualifier(), "java");
}

#[test]
fn test_enum_constant_body_context() {
    let (_, found) = complete_at_end("enum E { A { void m() { fo");
    assert_eq!(
        kinds(&found),
        vec![
            ElementKind::TypeDelimiter,
            ElementKind::EnumConstantDelimiter,
            ElementKind::FieldInitDelimiter,
            ElementKind::TypeDelimiter,
            ElementKind::MethodDelimiter,
        ]
    );
    assert_eq!(
        found.elements.entries().get(1).map(|e| e.info),
        Some(ElementInfo::EnumConstantBody { has_body: true })
    );
}

#[test]
fn test_field_initializer_in_enum_constant_body_stays_in_type() {
    let (_, found) = complete_at_end("enum E { A { int f = fo");
    assert_eq!(found.node.kind, CompletionKind::SingleName);
    assert_eq!(
        kinds(&found),
        vec![
            ElementKind::TypeDelimiter,
            ElementKind::EnumConstantDelimiter,
            ElementKind::FieldInitDelimiter,
            ElementKind::TypeDelimiter,
        ]
    );
    assert!(found.elements.is_inside_type());
    assert!(!found.elements.is_inside_field_initializer());
}

#[test]
fn test_field_initializer_context() {
    let (_, found) = complete_at_end("class X { int f = g(1, h");
    assert!(found.elements.is_indirectly_inside_field_initializer());
    assert_eq!(
        kinds(&found),
        vec![
            ElementKind::TypeDelimiter,
            ElementKind::FieldInitDelimiter,
            ElementKind::Selector,
        ]
    );
}

#[test]
fn test_cursor_free_parse_leaves_stack_empty() {
    let source = "class A {
        int f = new Object() { void g() { h(1); } }.hashCode();
        static { x(); }
        { y(); }
        enum E { P { }, Q(1); }
        @interface N { }
        A() { super(); }
        void m() { this.m(); new B(); }
    }";
    let past = u32::try_from(source.len() + 1).unwrap_or(u32::MAX);
    let mut run = run(source, past, Goal::CompilationUnit);
    assert_eq!(run.result, Ok(()));
    assert!(run.hooks.elements().is_empty(), "{:?}", run.hooks.elements());
    assert!(run.hooks.take_found().is_none());
}

#[test]
fn test_inconsistent_stacks_are_a_fault() {
    let mut hooks = AssistHooks::new(ASSIST, RecoveredElement::Unit, 0);
    let mut stacks = NodeStacks::new();
    stacks.push_ident(Ident::new("a", Span::new(0, 1)));
    stacks.push_name_length(3);
    let flow = hooks.on_name(&mut stacks, NameSite::NameReference);
    assert_eq!(flow, Flow::Found { checkpoint: 0 });
    assert!(matches!(
        hooks.take_fault(),
        Some(AssistError::CorruptStack { .. })
    ));
}

#[test]
fn test_names_without_assist_are_left_alone() {
    let mut hooks = AssistHooks::new(ASSIST, RecoveredElement::Unit, 0);
    let mut stacks = NodeStacks::new();
    stacks.push_ident(Ident::new("a", Span::new(0, 1)));
    stacks.push_name_length(1);
    assert_eq!(hooks.on_name(&mut stacks, NameSite::NameReference), Flow::Continue);
    assert_eq!(stacks.idents.len(), 1);
    assert!(hooks.take_fault().is_none());
}

#[test]
fn test_type_payload_records_dimensions() {
    let mut hooks = AssistHooks::new(ASSIST, RecoveredElement::Unit, 0);
    let mut stacks = NodeStacks::new();
    stacks.push_ident(Ident {
        assist: Some(ASSIST),
        ..Ident::new("Li", Span::new(0, 2))
    });
    stacks.push_name_length(1);
    stacks.generics_lengths.push(None);
    stacks.generics_ident_lengths.push(1);
    let flow = hooks.on_name(&mut stacks, NameSite::TypeReference { dims: 2, end: 6 });
    assert_eq!(flow, Flow::Found { checkpoint: 2 });
    let found = hooks.take_found();
    assert_eq!(
        found.map(|f| f.node.payload),
        Some(CompletionPayload::Type {
            dims: 2,
            previous_arguments: Vec::new(),
            arguments: None,
        })
    );
    assert!(stacks.idents.is_empty());
    assert!(stacks.generics_ident_lengths.is_empty());
}
