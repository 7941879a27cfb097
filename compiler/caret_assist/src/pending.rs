//! Locating the assist identifier among pending name groups.

use caret_ir::AssistId;
use caret_parse::NodeStacks;

/// Position of the assist identifier within the topmost name group.
///
/// With `by_type`, a class type with type arguments is searched as a whole
/// (its identifiers span several groups). Comparison is by [`AssistId`]
/// only; the stacks are not modified.
pub fn index_of_assist_identifier(
    stacks: &NodeStacks,
    assist: AssistId,
    by_type: bool,
) -> Option<usize> {
    let mut len = *stacks.ident_lengths.last()?;
    if by_type && len > 0 {
        if let Some(total) = stacks.generics_ident_lengths.last() {
            len = *total;
        }
    }
    let group = stacks.idents.get(stacks.idents.len().checked_sub(len)?..)?;
    group
        .iter()
        .rposition(|ident| ident.assist == Some(assist))
}

/// Whether the topmost groups fit inside the identifier stack.
pub(crate) fn groups_fit(stacks: &NodeStacks) -> bool {
    let available = stacks.idents.len();
    stacks.ident_lengths.last().is_none_or(|len| *len <= available)
        && stacks
            .generics_ident_lengths
            .last()
            .is_none_or(|len| *len <= available)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]
mod tests;
