use caret_ir::{AstNode, Span};
use caret_lexer::Lexer;
use caret_parse::{BlockStart, Goal, NoHooks, NodeStacks, Parser};
use pretty_assertions::assert_eq;

use super::{prepare_for_block_statements, prepare_for_headers, resume_goal, Reconstruction};
use crate::element::{ElementInfo, ElementKind, ElementStack};
use crate::recovered::RecoveredElement;

/// Nodes and open blocks left on the stacks when `source` stalls.
fn stalled(source: &str) -> (Vec<AstNode>, Vec<BlockStart>) {
    let mut lexer = Lexer::new(source);
    let mut stacks = NodeStacks::new();
    let mut hooks = NoHooks;
    let result = Parser::new(&mut lexer, &mut stacks, &mut hooks).parse(Goal::CompilationUnit);
    assert!(result.is_err(), "{source:?} parsed cleanly");
    (std::mem::take(&mut stacks.ast), stacks.block_starts.clone())
}

fn stack(kinds: &[ElementKind]) -> ElementStack {
    let mut elements = ElementStack::new();
    for kind in kinds {
        elements.push(*kind, ElementInfo::Empty, None);
    }
    elements
}

fn kinds(elements: &ElementStack) -> Vec<ElementKind> {
    elements.entries().iter().map(|e| e.kind).collect()
}

#[test]
fn test_open_method_header_collects_parameters() {
    let (nodes, blocks) = stalled("class X { void foo(int a, ");
    let mut recon = Reconstruction::new(RecoveredElement::Unit, 0);
    let mut elements = ElementStack::new();
    recon.absorb(nodes, &blocks, None, &mut elements);
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  class X (open)\n    method foo(int a) (open)\n"
    );
    assert_eq!(recon.checkpoint, 24);
    assert_eq!(kinds(&elements), vec![ElementKind::MethodDelimiter]);
}

#[test]
fn test_sibling_member_after_closed_method() {
    let source = "class X { void m() { int a = 1; } int b";
    let (nodes, blocks) = stalled(source);
    let mut recon = Reconstruction::new(RecoveredElement::Unit, 0);
    recon.absorb(nodes, &blocks, None, &mut ElementStack::new());
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  class X (open)\n    method m()\n    field int b (open)\n"
    );
    assert_eq!(recon.checkpoint, 39);
}

#[test]
fn test_statements_open_nested_blocks() {
    let (nodes, blocks) = stalled("class X { void m() { if (x) { int a = 1; foo(");
    let mut recon = Reconstruction::new(RecoveredElement::Unit, 0);
    recon.absorb(nodes, &blocks, None, &mut ElementStack::new());
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  class X (open)\n    method m() (open)\n      block (open)\n        local int a\n"
    );
}

#[test]
fn test_close_brace_pops_to_enclosing_delimiter() {
    let (nodes, blocks) = stalled("class X { void m() { a(); ");
    let mut recon = Reconstruction::new(RecoveredElement::Unit, 0);
    let mut elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::Selector,
    ]);
    recon.absorb(nodes, &blocks, None, &mut elements);
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  class X (open)\n    method m() (open)\n      statement\n"
    );

    recon.begin_round();
    recon.absorb(
        [AstNode::CloseBrace(Span::new(27, 28))],
        &[],
        None,
        &mut elements,
    );
    assert_eq!(kinds(&elements), vec![ElementKind::TypeDelimiter]);
    assert_eq!(recon.checkpoint, 28);

    // The token observer already popped this type.
    recon.note_type_popped(29);
    recon.absorb(
        [AstNode::CloseBrace(Span::new(29, 30))],
        &[],
        None,
        &mut elements,
    );
    assert_eq!(kinds(&elements), vec![ElementKind::TypeDelimiter]);
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  class X\n    method m()\n      statement\n"
    );
}

#[test]
fn test_field_shaped_declaration_in_body() {
    let (mut method, _) = stalled("class X { void m() {");
    let (mut local, _) = stalled("class Y { final int b");
    let (mut field, _) = stalled("class Z { static int c");
    let mut recon = Reconstruction::new(RecoveredElement::Unit, 0);
    let nodes = [method.pop(), local.pop()].into_iter().flatten();
    recon.absorb(nodes, &[], None, &mut ElementStack::new());
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  method m() (open)\n    local int b\n"
    );

    recon.absorb(field.pop(), &[], None, &mut ElementStack::new());
    assert_eq!(
        recon.tree.outline(),
        "unit (open)\n  method m()\n    local int b\n  field int c (open)\n"
    );
}

#[test]
fn test_trailing_blocks_stop_at_assist_start() {
    let blocks = [
        BlockStart {
            offset: 5,
            fake: false,
        },
        BlockStart {
            offset: 20,
            fake: true,
        },
    ];
    let mut recon = Reconstruction::new(RecoveredElement::Block { fake: false }, 0);
    recon.absorb(Vec::<AstNode>::new(), &blocks, Some(10), &mut ElementStack::new());
    assert_eq!(recon.tree.outline(), "block (open)\n  block (open)\n");

    // A block already opened at the same offset is not opened twice.
    recon.absorb(Vec::<AstNode>::new(), &blocks[..1], Some(10), &mut ElementStack::new());
    assert_eq!(recon.tree.len(), 2);
}

#[test]
fn test_resume_goal_selection() {
    let method = stack(&[ElementKind::TypeDelimiter, ElementKind::MethodDelimiter]);
    assert_eq!(resume_goal(true, &method, None), Goal::Headers);

    let nested = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::FieldInitDelimiter,
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
    ]);
    assert_eq!(
        resume_goal(true, &nested, None),
        Goal::BlockStatementsOrCatchHeader
    );

    let (mut types, _) = stalled("class X {");
    let Some(AstNode::Type(decl)) = types.pop() else {
        panic!("expected an open type");
    };
    let ty = RecoveredElement::Type(decl);
    assert_eq!(resume_goal(false, &method, Some(&ty)), Goal::Headers);
    assert_eq!(
        resume_goal(false, &method, Some(&RecoveredElement::Unit)),
        Goal::BlockStatementsOrCatchHeader
    );
}

#[test]
fn test_prepare_trims_to_resume_context() {
    let mut elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::Selector,
    ]);
    prepare_for_headers(&mut elements);
    assert_eq!(kinds(&elements), vec![ElementKind::TypeDelimiter]);

    let mut elements = stack(&[ElementKind::MethodDelimiter, ElementKind::Selector]);
    prepare_for_headers(&mut elements);
    assert!(elements.is_empty());

    let mut elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::FieldInitDelimiter,
        ElementKind::Selector,
    ]);
    prepare_for_block_statements(&mut elements);
    assert_eq!(
        kinds(&elements),
        vec![
            ElementKind::TypeDelimiter,
            ElementKind::MethodDelimiter,
            ElementKind::FieldInitDelimiter,
        ]
    );

    let mut elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::FieldInitDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::Selector,
    ]);
    prepare_for_block_statements(&mut elements);
    assert_eq!(kinds(&elements).last(), Some(&ElementKind::MethodDelimiter));

    let mut elements = stack(&[ElementKind::TypeDelimiter]);
    prepare_for_block_statements(&mut elements);
    assert!(elements.is_empty());
}
