use std::num::NonZeroU64;

use caret_ir::{AssistId, Ident, Span};
use caret_parse::NodeStacks;
use pretty_assertions::assert_eq;

use super::{groups_fit, index_of_assist_identifier};

fn id(raw: u64) -> AssistId {
    AssistId::new(NonZeroU64::new(raw).unwrap())
}

fn ident(name: &str, at: u32, assist: Option<AssistId>) -> Ident {
    let span = Span::new(at, at + u32::try_from(name.len()).unwrap());
    Ident {
        assist,
        ..Ident::new(name, span)
    }
}

fn push_group(stacks: &mut NodeStacks, names: &[(&str, bool)], assist: AssistId) {
    for (i, (name, is_assist)) in names.iter().enumerate() {
        let at = u32::try_from(i * 10).unwrap();
        stacks.push_ident(ident(name, at, is_assist.then_some(assist)));
    }
    stacks.push_name_length(names.len());
}

#[test]
fn test_finds_assist_in_topmost_group() {
    let assist = id(7);
    let mut stacks = NodeStacks::new();
    push_group(&mut stacks, &[("x", false)], assist);
    push_group(&mut stacks, &[("a", false), ("b", true), ("c", false)], assist);
    assert_eq!(index_of_assist_identifier(&stacks, assist, false), Some(1));
}

#[test]
fn test_ignores_lower_groups_and_other_sessions() {
    let assist = id(7);
    let mut stacks = NodeStacks::new();
    push_group(&mut stacks, &[("fo", true)], assist);
    push_group(&mut stacks, &[("a", false)], assist);
    assert_eq!(index_of_assist_identifier(&stacks, assist, false), None);

    let mut stale = NodeStacks::new();
    push_group(&mut stale, &[("fo", true)], id(3));
    assert_eq!(index_of_assist_identifier(&stale, assist, false), None);
}

#[test]
fn test_spelling_does_not_identify_the_assist() {
    let assist = id(7);
    let mut stacks = NodeStacks::new();
    push_group(&mut stacks, &[("fo", false), ("fo", true)], assist);
    assert_eq!(index_of_assist_identifier(&stacks, assist, false), Some(1));
}

#[test]
fn test_type_grouping_spans_split_groups() {
    let assist = id(9);
    let mut stacks = NodeStacks::new();
    // `Map<K, V>.En` is split into `Map` and `En`.
    push_group(&mut stacks, &[("Map", false)], assist);
    push_group(&mut stacks, &[("En", true)], assist);
    stacks.generics_ident_lengths.push(2);

    assert_eq!(index_of_assist_identifier(&stacks, assist, true), Some(1));
    assert_eq!(index_of_assist_identifier(&stacks, assist, false), Some(0));
}

#[test]
fn test_lookup_is_idempotent() {
    let assist = id(2);
    let mut stacks = NodeStacks::new();
    push_group(&mut stacks, &[("java", false), ("u", true)], assist);
    let first = index_of_assist_identifier(&stacks, assist, false);
    let second = index_of_assist_identifier(&stacks, assist, false);
    assert_eq!(first, second);
    assert_eq!(stacks.idents.len(), 2);
    assert_eq!(stacks.ident_lengths, vec![2]);
}

#[test]
fn test_empty_and_inconsistent_stacks() {
    let assist = id(1);
    let mut stacks = NodeStacks::new();
    assert_eq!(index_of_assist_identifier(&stacks, assist, true), None);
    assert!(groups_fit(&stacks));

    stacks.push_name_length(3);
    assert_eq!(index_of_assist_identifier(&stacks, assist, false), None);
    assert!(!groups_fit(&stacks));
}
