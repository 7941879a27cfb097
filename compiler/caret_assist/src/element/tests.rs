use caret_ir::{Ident, Span};
use pretty_assertions::assert_eq;

use super::{ElementInfo, ElementKind, ElementKinds, ElementStack};

fn stack(kinds: &[ElementKind]) -> ElementStack {
    let mut stack = ElementStack::new();
    for kind in kinds {
        stack.push(*kind, ElementInfo::Empty, None);
    }
    stack
}

#[test]
fn test_pop_ignores_mismatched_kind() {
    let mut elements = stack(&[ElementKind::TypeDelimiter, ElementKind::MethodDelimiter]);
    assert_eq!(elements.pop(ElementKind::TypeDelimiter), None);
    assert_eq!(elements.len(), 2);
    assert!(elements.pop(ElementKind::MethodDelimiter).is_some());
    assert_eq!(elements.len(), 1);
}

#[test]
fn test_pop_until_keeps_the_match_on_top() {
    let mut elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::Selector,
        ElementKind::Selector,
    ]);
    elements.pop_until(ElementKind::MethodDelimiter);
    assert_eq!(elements.len(), 2);
    assert_eq!(
        elements.top().map(|e| e.kind),
        Some(ElementKind::MethodDelimiter)
    );

    elements.pop_until(ElementKind::FieldInitDelimiter);
    assert_eq!(elements.len(), 2);
}

#[test]
fn test_top_kind_with_mask_and_offset() {
    let elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::EnumConstantDelimiter,
        ElementKind::FieldInitDelimiter,
        ElementKind::Selector,
    ]);
    assert_eq!(
        elements.top_kind(ElementKinds::ANY, 1),
        Some(ElementKind::Selector)
    );
    assert_eq!(
        elements.top_kind(ElementKinds::ANY, 3),
        Some(ElementKind::EnumConstantDelimiter)
    );
    assert_eq!(
        elements.top_kind(ElementKinds::CONTAINERS, 2),
        Some(ElementKind::TypeDelimiter)
    );
    assert_eq!(elements.top_kind(ElementKinds::ANY, 5), None);
    assert_eq!(elements.top_kind(ElementKinds::ANY, 0), None);
}

#[test]
fn test_inside_queries_stop_at_nearest_container() {
    let elements = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::MethodDelimiter,
        ElementKind::TypeDelimiter,
    ]);
    assert!(elements.is_inside_type());
    assert!(!elements.is_inside_method());
    assert!(elements.is_indirectly_inside_method());
    assert!(!elements.is_indirectly_inside_field_initializer());
}

#[test]
fn test_attribute_value_is_shadowed_by_containers() {
    let inside = stack(&[
        ElementKind::TypeDelimiter,
        ElementKind::AttributeValueDelimiter,
        ElementKind::Selector,
    ]);
    assert!(inside.is_inside_attribute_value());

    let shadowed = stack(&[
        ElementKind::AttributeValueDelimiter,
        ElementKind::TypeDelimiter,
    ]);
    assert!(!shadowed.is_inside_attribute_value());
}

#[test]
fn test_enclosing_selector_and_flush() {
    let mut elements = stack(&[ElementKind::MethodDelimiter]);
    let name = Ident::new("foo", Span::new(3, 6));
    elements.push(ElementKind::Selector, ElementInfo::IdentSlot(0), Some(name));
    elements.push(ElementKind::AttributeValueDelimiter, ElementInfo::Empty, None);

    let selector = elements.enclosing_selector().map(|e| e.info);
    assert_eq!(selector, Some(ElementInfo::IdentSlot(0)));
    assert_eq!(elements.last_index_of(ElementKind::Selector), Some(1));

    elements.flush();
    assert!(elements.is_empty());
    assert_eq!(elements.enclosing_selector(), None);
}
