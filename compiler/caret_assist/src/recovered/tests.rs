use caret_ir::ast::{ImportDecl, PackageDecl};
use caret_ir::{Ident, Span};
use pretty_assertions::assert_eq;

use super::{RecoveredElement, RecoveredTree};

fn names(dotted: &str) -> Vec<Ident> {
    dotted
        .split('.')
        .map(|name| Ident::new(name, Span::DUMMY))
        .collect()
}

fn sample() -> RecoveredTree {
    let mut tree = RecoveredTree::new(RecoveredElement::Unit, 0);
    let root = tree.root();
    tree.add(
        root,
        RecoveredElement::Package(PackageDecl {
            name: names("a.b"),
            span: Span::new(0, 10),
        }),
        0,
        Some(10),
    );
    tree.add(
        root,
        RecoveredElement::Import(ImportDecl {
            name: names("java.util"),
            is_static: false,
            on_demand: true,
            span: Span::new(11, 30),
        }),
        11,
        Some(30),
    );
    let block = tree.add(root, RecoveredElement::Block { fake: false }, 31, None);
    let scope = tree.add(block, RecoveredElement::Block { fake: true }, 33, None);
    tree.close(scope, 40);
    tree.set_current(block);
    tree
}

#[test]
fn test_outline_marks_open_containers() {
    assert_eq!(
        sample().outline(),
        "unit (open)\n  package a.b\n  import java.util.*\n  block (open)\n    scope\n"
    );
}

#[test]
fn test_open_path_runs_from_root_to_current() {
    let tree = sample();
    let path: Vec<_> = tree
        .open_path()
        .into_iter()
        .filter_map(|id| tree.get(id).map(|node| node.element.label()))
        .collect();
    assert_eq!(path, vec!["unit".to_owned(), "block".to_owned()]);
}

#[test]
fn test_close_keeps_the_first_end() {
    let mut tree = sample();
    let current = tree.current();
    tree.close(current, 50);
    tree.close(current, 60);
    assert_eq!(tree.get(current).and_then(|node| node.end), Some(50));
}

#[test]
fn test_find_and_children() {
    let tree = sample();
    let import = tree.find(|element| matches!(element, RecoveredElement::Import(_)));
    assert!(import.is_some());
    assert_eq!(import.and_then(|id| tree.parent(id)), Some(tree.root()));
    assert_eq!(tree.children(tree.root()).count(), 3);
    assert_eq!(tree.len(), 5);
    assert!(tree.find(|element| matches!(element, RecoveredElement::Method(_))).is_none());
}

#[test]
fn test_container_roles() {
    assert!(RecoveredElement::Block { fake: true }.holds_statements());
    assert!(RecoveredElement::Unit.is_container());
    assert!(!RecoveredElement::Unit.holds_statements());
    let package = RecoveredElement::Package(PackageDecl {
        name: names("p"),
        span: Span::DUMMY,
    });
    assert!(!package.is_container());
}
