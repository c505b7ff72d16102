//! Ordering and filtering over a collection's raw item array.
//!
//! Everything here is pure: functions take the array, return (or rewrite)
//! the derived view, and never talk to a store. The ordering invariant they
//! maintain is that `order` is a dense zero-based permutation after every
//! mutation; for todos `priority == order + 1` as well.

use crate::model::{Item, Priority, Status, StatusFilter, Variant};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why a requested sequence cannot be applied to a list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("sequence has {got} ids but the list has {expected} items")]
    LengthMismatch { expected: usize, got: usize },

    #[error("id '{0}' is not in the list")]
    UnknownId(String),

    #[error("id '{0}' appears more than once")]
    DuplicateId(String),
}

/// An item tagged with the collection it came from, for merged views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedItem {
    #[serde(rename = "type")]
    pub variant: Variant,
    #[serde(flatten)]
    pub item: Item,
}

/// Sort by ascending `order`. Stable, so equal orders keep array order.
pub fn sort_by_order(items: &mut [Item]) {
    items.sort_by_key(|item| item.order);
}

/// Rewrite `order` to array position. Todos also get `priority = position + 1`.
pub fn renumber(items: &mut [Item], variant: Variant) {
    for (position, item) in items.iter_mut().enumerate() {
        item.order = position;
        if variant.priority_follows_position() {
            item.priority = Priority::from_position(position);
        }
    }
}

/// Append `item` at the end without touching existing positions.
pub fn append(items: &mut Vec<Item>, mut item: Item) -> &Item {
    let position = items.len();
    item.order = position;
    items.push(item);
    &items[position]
}

/// Remove the item with `id` and renumber the rest.
pub fn remove(items: &mut Vec<Item>, id: &str, variant: Variant) -> Option<Item> {
    let index = items.iter().position(|item| item.id == id)?;
    let removed = items.remove(index);
    renumber(items, variant);
    Some(removed)
}

/// Arrange `items` in the order given by `sequence` (a permutation of their ids)
/// and renumber.
///
/// # Errors
///
/// Returns [`ReorderError`] if `sequence` is not exactly a permutation of the
/// ids in `items`.
pub fn reorder<S: AsRef<str>>(
    items: &[Item],
    sequence: &[S],
    variant: Variant,
) -> Result<Vec<Item>, ReorderError> {
    if sequence.len() != items.len() {
        return Err(ReorderError::LengthMismatch {
            expected: items.len(),
            got: sequence.len(),
        });
    }

    let mut seen = HashSet::with_capacity(sequence.len());
    let mut arranged = Vec::with_capacity(items.len());
    for id in sequence {
        let id = id.as_ref();
        if !seen.insert(id) {
            return Err(ReorderError::DuplicateId(id.to_string()));
        }
        let item = items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| ReorderError::UnknownId(id.to_string()))?;
        arranged.push(item.clone());
    }

    renumber(&mut arranged, variant);
    Ok(arranged)
}

/// Move one item to `to` (clamped to the end), keeping the others' relative order.
///
/// Returns `None` when `id` is not in the list.
#[must_use]
pub fn move_to(items: &[Item], id: &str, to: usize, variant: Variant) -> Option<Vec<Item>> {
    let from = items.iter().position(|item| item.id == id)?;
    let mut arranged = items.to_vec();
    let moved = arranged.remove(from);
    arranged.insert(to.min(arranged.len()), moved);
    renumber(&mut arranged, variant);
    Some(arranged)
}

/// The subsequence matching `filter`, relative order preserved.
#[must_use]
pub fn filter(items: &[Item], filter: StatusFilter) -> Vec<&Item> {
    items
        .iter()
        .filter(|item| filter.matches(item.status))
        .collect()
}

/// Pending items of both collections, most urgent first.
///
/// The sort is stable and tasks are merged ahead of todos, so at equal
/// priority tasks come first and each collection keeps its list order.
#[must_use]
pub fn today(tasks: &[Item], todos: &[Item]) -> Vec<TaggedItem> {
    let mut rows = tag_all(tasks, todos, |item| item.status == Status::Pending);
    rows.sort_by_key(|row| row.item.priority);
    rows
}

/// Both collections merged, newest first.
#[must_use]
pub fn overview(tasks: &[Item], todos: &[Item]) -> Vec<TaggedItem> {
    let mut rows = tag_all(tasks, todos, |_| true);
    rows.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
    rows
}

fn tag_all(tasks: &[Item], todos: &[Item], keep: impl Fn(&Item) -> bool) -> Vec<TaggedItem> {
    let tagged = |variant: Variant| {
        move |item: &Item| TaggedItem {
            variant,
            item: item.clone(),
        }
    };
    tasks
        .iter()
        .filter(|item| keep(item))
        .map(tagged(Variant::Task))
        .chain(todos.iter().filter(|item| keep(item)).map(tagged(Variant::Todo)))
        .collect()
}
