//! User-scoped list operations.
//!
//! Every mutation is read-modify-write over the whole item array: fetch the
//! record, change the array locally, then write it back guarded by the
//! revision that was read. A failed write leaves the stored list untouched
//! and is reported to the caller, never retried.

use crate::error::ErrorCode;
use crate::markup::strip_markup;
use crate::model::{Item, Priority, Status, Variant, next_item_id, title_from_text};
use crate::session::Identity;
use crate::store::{RecordStore, StoreError};
use crate::suggest::parse;
use crate::view::{self, ReorderError, TaggedItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no {variant} with id '{id}'")]
    ItemNotFound { variant: Variant, id: String },

    #[error("item text must not be blank")]
    EmptyText,

    #[error("invalid reorder: {0}")]
    InvalidReorder(#[from] ReorderError),

    #[error("todo priority follows its list position; reorder instead")]
    PriorityIsPositional,
}

impl ListError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Store(err) => err.code(),
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::EmptyText => ErrorCode::EmptyText,
            Self::InvalidReorder(_) => ErrorCode::InvalidReorder,
            Self::PriorityIsPositional => ErrorCode::PriorityIsPositional,
        }
    }
}

/// Both collections of one user, each sorted by `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lists {
    pub tasks: Vec<Item>,
    pub todos: Vec<Item>,
}

impl Lists {
    #[must_use]
    pub fn get(&self, variant: Variant) -> &[Item] {
        match variant {
            Variant::Task => &self.tasks,
            Variant::Todo => &self.todos,
        }
    }
}

/// List operations for one identity against one store.
pub struct ListService<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    identity: Identity,
    clock: fn() -> DateTime<Utc>,
}

impl<'a, S: RecordStore + ?Sized> ListService<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, identity: Identity) -> Self {
        Self {
            store,
            identity,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock (timestamps and ids derive from it).
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    fn user(&self) -> &str {
        &self.identity.user_id
    }

    /// Make sure both records exist.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Store`] on backend failure.
    pub fn provision(&self) -> Result<(), ListError> {
        for variant in [Variant::Task, Variant::Todo] {
            let created = self
                .store
                .ensure_record(self.user(), variant)
                .inspect_err(|err| {
                    error!(user = %self.user(), %variant, error = %err, "failed to provision record");
                })?;
            if created {
                info!(user = %self.user(), %variant, "provisioned empty record");
            }
        }
        Ok(())
    }

    /// Provision, then fetch both collections as a concurrent pair.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Store`] if provisioning or either load fails.
    pub fn open_lists(&self) -> Result<Lists, ListError> {
        self.provision()?;
        let store = self.store;
        let user = self.user();
        let (tasks, todos) = std::thread::scope(|scope| {
            let tasks = scope.spawn(|| store.load(user, Variant::Task));
            let todos = scope.spawn(|| store.load(user, Variant::Todo));
            (join_load(tasks), join_load(todos))
        });
        let lists = Lists {
            tasks: tasks?,
            todos: todos?,
        };
        debug!(
            user = %user,
            tasks = lists.tasks.len(),
            todos = lists.todos.len(),
            "lists loaded"
        );
        Ok(lists)
    }

    /// One collection sorted by `order`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Store`] if the record is missing or the backend fails.
    pub fn load(&self, variant: Variant) -> Result<Vec<Item>, ListError> {
        let items = self.store.load(self.user(), variant).inspect_err(|err| {
            error!(user = %self.user(), %variant, error = %err, "failed to load list");
        })?;
        debug!(user = %self.user(), %variant, count = items.len(), "list loaded");
        Ok(items)
    }

    /// Append a new pending item.
    ///
    /// Tasks take `priority` (default [`Priority::HIGH`]); todos always get
    /// `position + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::EmptyText`] for blank text, [`ListError::Store`]
    /// if the write fails.
    pub fn add(
        &self,
        variant: Variant,
        text: &str,
        priority: Option<Priority>,
    ) -> Result<Item, ListError> {
        let text = non_blank(text)?;
        self.mutate(variant, "add", |items, now| {
            let priority = if variant.priority_follows_position() {
                Priority::from_position(items.len())
            } else {
                priority.unwrap_or(Priority::HIGH)
            };
            let item = Item::new(next_item_id(now, items), text, priority, now);
            Ok(view::append(items, item).clone())
        })
    }

    /// Turn AI suggestion text into a new item.
    ///
    /// The whole suggestion becomes `text`; the title comes from the parser.
    /// Tasks also take the parsed priority and estimate.
    ///
    /// # Errors
    ///
    /// Same as [`ListService::add`].
    pub fn accept_suggestion(&self, variant: Variant, suggestion: &str) -> Result<Item, ListError> {
        let text = non_blank(suggestion)?;
        let parsed = parse(text);
        self.mutate(variant, "accept_suggestion", |items, now| {
            let priority = if variant.priority_follows_position() {
                Priority::from_position(items.len())
            } else {
                parsed.priority
            };
            let mut item = Item::new(next_item_id(now, items), text, priority, now);
            if parsed.title.is_empty() {
                item.title = title_from_text(&strip_markup(text));
            } else {
                item.title.clone_from(&parsed.title);
            }
            if variant == Variant::Task {
                item.estimated_time = parsed.estimated_time;
            }
            Ok(view::append(items, item).clone())
        })
    }

    /// Replace an item's text. The title keeps its creation-time value.
    ///
    /// # Errors
    ///
    /// [`ListError::EmptyText`], [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn edit_text(&self, variant: Variant, id: &str, text: &str) -> Result<Item, ListError> {
        let text = non_blank(text)?;
        self.mutate(variant, "edit_text", |items, now| {
            let item = find_mut(items, variant, id)?;
            text.clone_into(&mut item.text);
            item.updated_at = now;
            Ok(item.clone())
        })
    }

    /// Set a task's priority.
    ///
    /// # Errors
    ///
    /// [`ListError::PriorityIsPositional`] for todos, otherwise
    /// [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn set_priority(
        &self,
        variant: Variant,
        id: &str,
        priority: Priority,
    ) -> Result<Item, ListError> {
        if variant.priority_follows_position() {
            return Err(ListError::PriorityIsPositional);
        }
        self.mutate(variant, "set_priority", |items, now| {
            let item = find_mut(items, variant, id)?;
            item.priority = priority;
            item.updated_at = now;
            Ok(item.clone())
        })
    }

    /// Flip pending/done.
    ///
    /// # Errors
    ///
    /// [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn toggle_status(&self, variant: Variant, id: &str) -> Result<Item, ListError> {
        self.mutate(variant, "toggle_status", |items, now| {
            let item = find_mut(items, variant, id)?;
            item.toggle_status(now);
            Ok(item.clone())
        })
    }

    /// Force an item to done. Already-done items keep their `completed_at`.
    ///
    /// # Errors
    ///
    /// [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn mark_done(&self, variant: Variant, id: &str) -> Result<Item, ListError> {
        self.mutate(variant, "mark_done", |items, now| {
            let item = find_mut(items, variant, id)?;
            item.set_status(Status::Done, now);
            Ok(item.clone())
        })
    }

    /// Mark every pending item done. Returns how many changed.
    ///
    /// # Errors
    ///
    /// [`ListError::Store`] if the write fails.
    pub fn mark_all_done(&self, variant: Variant) -> Result<usize, ListError> {
        self.mutate(variant, "mark_all_done", |items, now| {
            Ok(items
                .iter_mut()
                .map(|item| item.set_status(Status::Done, now))
                .filter(|changed| *changed)
                .count())
        })
    }

    /// Remove an item and renumber the rest.
    ///
    /// # Errors
    ///
    /// [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn delete(&self, variant: Variant, id: &str) -> Result<Item, ListError> {
        self.mutate(variant, "delete", |items, _now| {
            view::remove(items, id, variant).ok_or_else(|| not_found(variant, id))
        })
    }

    /// Rearrange the list to follow `ids`, a permutation of its item ids.
    ///
    /// # Errors
    ///
    /// [`ListError::InvalidReorder`] if `ids` is not a permutation, else
    /// [`ListError::Store`].
    pub fn reorder<T: AsRef<str>>(&self, variant: Variant, ids: &[T]) -> Result<Vec<Item>, ListError> {
        self.mutate(variant, "reorder", |items, now| {
            let arranged = view::reorder(items, ids, variant)?;
            *items = touch_moved(items, arranged, now);
            Ok(items.clone())
        })
    }

    /// Move one item to position `to` (clamped to the end).
    ///
    /// # Errors
    ///
    /// [`ListError::ItemNotFound`] or [`ListError::Store`].
    pub fn move_item(&self, variant: Variant, id: &str, to: usize) -> Result<Vec<Item>, ListError> {
        self.mutate(variant, "move_item", |items, now| {
            let arranged =
                view::move_to(items, id, to, variant).ok_or_else(|| not_found(variant, id))?;
            *items = touch_moved(items, arranged, now);
            Ok(items.clone())
        })
    }

    /// Pending items of both lists, most urgent first.
    ///
    /// # Errors
    ///
    /// Same as [`ListService::open_lists`].
    pub fn today(&self) -> Result<Vec<TaggedItem>, ListError> {
        let lists = self.open_lists()?;
        Ok(view::today(&lists.tasks, &lists.todos))
    }

    fn mutate<T>(
        &self,
        variant: Variant,
        action: &'static str,
        change: impl FnOnce(&mut Vec<Item>, DateTime<Utc>) -> Result<T, ListError>,
    ) -> Result<T, ListError> {
        let user = self.user();
        let record = self.store.fetch(user, variant).inspect_err(|err| {
            error!(user = %user, %variant, action, error = %err, "failed to read list");
        })?;

        let mut items = record.items;
        view::sort_by_order(&mut items);
        let stored = items.clone();
        view::renumber(&mut items, variant);
        let outcome = change(&mut items, (self.clock)())?;

        if items == stored {
            debug!(user = %user, %variant, action, revision = record.revision, "list unchanged, skipping write");
            return Ok(outcome);
        }

        match self
            .store
            .replace_if_revision(user, variant, &items, record.revision)
        {
            Ok(revision) => {
                info!(user = %user, %variant, action, count = items.len(), revision, "list updated");
                Ok(outcome)
            }
            Err(err) => {
                error!(user = %user, %variant, action, error = %err, "failed to write list");
                Err(err.into())
            }
        }
    }
}

fn join_load(
    handle: std::thread::ScopedJoinHandle<'_, Result<Vec<Item>, StoreError>>,
) -> Result<Vec<Item>, StoreError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(StoreError::Remote("list load panicked".to_string())))
}

fn non_blank(text: &str) -> Result<&str, ListError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ListError::EmptyText)
    } else {
        Ok(trimmed)
    }
}

fn not_found(variant: Variant, id: &str) -> ListError {
    ListError::ItemNotFound {
        variant,
        id: id.to_string(),
    }
}

fn find_mut<'i>(items: &'i mut [Item], variant: Variant, id: &str) -> Result<&'i mut Item, ListError> {
    items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| not_found(variant, id))
}

/// Bump `updated_at` on items whose position or priority changed.
fn touch_moved(before: &[Item], mut after: Vec<Item>, now: DateTime<Utc>) -> Vec<Item> {
    for item in &mut after {
        let changed = before
            .iter()
            .find(|old| old.id == item.id)
            .is_none_or(|old| old.order != item.order || old.priority != item.priority);
        if changed {
            item.updated_at = now;
        }
    }
    after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid")
    }

    fn service(store: &MemoryStore) -> ListService<'_, MemoryStore> {
        let svc = ListService::new(store, Identity::new("teacher-1")).with_clock(fixed_now);
        svc.provision().unwrap();
        svc
    }

    fn ids(items: &[Item]) -> Vec<String> {
        items.iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn open_lists_provisions_empty_records() {
        let store = MemoryStore::new();
        let svc = ListService::new(&store, Identity::new("new-user"));
        let lists = svc.open_lists().unwrap();
        assert!(lists.tasks.is_empty());
        assert!(lists.todos.is_empty());
        assert_eq!(store.fetch("new-user", Variant::Todo).unwrap().revision, 0);
    }

    #[test]
    fn add_task_defaults_to_high_priority() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc
            .add(Variant::Task, "  Grade the unit three essays by Friday  ", None)
            .unwrap();
        assert_eq!(item.text, "Grade the unit three essays by Friday");
        assert_eq!(item.title, "Grade the unit three essays");
        assert_eq!(item.priority, Priority::HIGH);
        assert_eq!(item.order, 0);
        assert_eq!(item.id, fixed_now().timestamp_millis().to_string());
    }

    #[test]
    fn same_millisecond_adds_get_distinct_ids() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let a = svc.add(Variant::Task, "one", Some(Priority::LOW)).unwrap();
        let b = svc.add(Variant::Task, "two", None).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.priority, Priority::LOW);
        assert_eq!(b.order, 1);
        assert_eq!(store.fetch("teacher-1", Variant::Task).unwrap().order, 2);
    }

    #[test]
    fn todo_priority_follows_position_on_add() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.add(Variant::Todo, "first", Some(Priority::LOW)).unwrap();
        let second = svc.add(Variant::Todo, "second", None).unwrap();
        assert_eq!(second.priority, Priority::new(2));
    }

    #[test]
    fn blank_text_is_rejected_without_writing() {
        let store = MemoryStore::new();
        let svc = service(&store);
        assert_eq!(svc.add(Variant::Task, "   ", None), Err(ListError::EmptyText));
        assert_eq!(store.fetch("teacher-1", Variant::Task).unwrap().revision, 0);
    }

    #[test]
    fn accept_task_suggestion_uses_parsed_fields() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let text = "**Grade quizzes** (Low Priority, Est. Time: 30 minutes)\n\nWhy: feedback";
        let item = svc.accept_suggestion(Variant::Task, text).unwrap();
        assert_eq!(item.title, "Grade quizzes");
        assert_eq!(item.priority, Priority::LOW);
        assert_eq!(item.estimated_time, Some(30));
        assert_eq!(item.text, text);
    }

    #[test]
    fn accept_todo_suggestion_is_positional_without_estimate() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.add(Variant::Todo, "existing", None).unwrap();
        let item = svc
            .accept_suggestion(Variant::Todo, "**Boost fluency** (High Priority, Est. Time: 5 m)")
            .unwrap();
        assert_eq!(item.priority, Priority::new(2));
        assert_eq!(item.estimated_time, None);
        assert_eq!(item.title, "Boost fluency");
    }

    #[test]
    fn accept_suggestion_without_title_falls_back_to_text() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc
            .accept_suggestion(Variant::Task, "(High Priority) review **seating** chart today please")
            .unwrap();
        assert_eq!(item.title, "(High Priority) review seating chart");
        assert_eq!(item.priority, Priority::HIGH);
    }

    #[test]
    fn edit_keeps_title() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc.add(Variant::Task, "Plan field trip", None).unwrap();
        let edited = svc.edit_text(Variant::Task, &item.id, "Cancel field trip").unwrap();
        assert_eq!(edited.text, "Cancel field trip");
        assert_eq!(edited.title, "Plan field trip");
        assert_eq!(
            svc.edit_text(Variant::Task, "missing", "x"),
            Err(not_found(Variant::Task, "missing"))
        );
    }

    #[test]
    fn set_priority_is_task_only() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let task = svc.add(Variant::Task, "task", None).unwrap();
        let todo = svc.add(Variant::Todo, "goal", None).unwrap();
        assert_eq!(
            svc.set_priority(Variant::Task, &task.id, Priority::LOW).unwrap().priority,
            Priority::LOW
        );
        assert_eq!(
            svc.set_priority(Variant::Todo, &todo.id, Priority::LOW),
            Err(ListError::PriorityIsPositional)
        );
    }

    #[test]
    fn toggle_round_trip_restores_pending() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc.add(Variant::Todo, "goal", None).unwrap();
        let done = svc.toggle_status(Variant::Todo, &item.id).unwrap();
        assert_eq!(done.status, Status::Done);
        assert_eq!(done.completed_at, Some(fixed_now()));
        let back = svc.toggle_status(Variant::Todo, &item.id).unwrap();
        assert_eq!(back.status, Status::Pending);
        assert_eq!(back.completed_at, None);
    }

    #[test]
    fn mark_done_is_idempotent() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc.add(Variant::Task, "task", None).unwrap();
        assert!(svc.mark_done(Variant::Task, &item.id).unwrap().is_done());
        assert!(svc.mark_done(Variant::Task, &item.id).unwrap().is_done());
    }

    #[test]
    fn mark_all_done_counts_transitions() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let a = svc.add(Variant::Todo, "a", None).unwrap();
        svc.add(Variant::Todo, "b", None).unwrap();
        svc.add(Variant::Todo, "c", None).unwrap();
        svc.mark_done(Variant::Todo, &a.id).unwrap();
        assert_eq!(svc.mark_all_done(Variant::Todo).unwrap(), 2);
        assert!(svc.load(Variant::Todo).unwrap().iter().all(Item::is_done));
        assert_eq!(svc.mark_all_done(Variant::Todo).unwrap(), 0);
    }

    #[test]
    fn no_op_status_changes_leave_revision_alone() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let item = svc.add(Variant::Task, "task", None).unwrap();
        svc.mark_done(Variant::Task, &item.id).unwrap();
        let revision = store.fetch("teacher-1", Variant::Task).unwrap().revision;

        assert!(svc.mark_done(Variant::Task, &item.id).unwrap().is_done());
        assert_eq!(svc.mark_all_done(Variant::Task).unwrap(), 0);
        assert_eq!(store.fetch("teacher-1", Variant::Task).unwrap().revision, revision);
    }

    #[test]
    fn mutations_restore_dense_positions_on_stale_records() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let stale = [
            Item::new("a".into(), "a", Priority::new(1), fixed_now()),
            Item::new("b".into(), "b", Priority::new(1), fixed_now()),
        ];
        store.replace_all("teacher-1", Variant::Todo, &stale).unwrap();

        svc.add(Variant::Todo, "new goal", None).unwrap();
        let items = svc.load(Variant::Todo).unwrap();
        assert_eq!(ids(&items), ["a", "b", "1700000000000"]);
        assert_eq!(items.iter().map(|item| item.order).collect::<Vec<_>>(), [0, 1, 2]);
        for (position, item) in items.iter().enumerate() {
            assert_eq!(item.priority, Priority::from_position(position));
        }

        store.replace_all("teacher-1", Variant::Task, &stale).unwrap();
        let done = svc.mark_done(Variant::Task, "b").unwrap();
        assert_eq!(done.order, 1);
        let orders: Vec<_> = svc.load(Variant::Task).unwrap().iter().map(|item| item.order).collect();
        assert_eq!(orders, [0, 1]);
    }

    #[test]
    fn delete_renumbers_and_rederives_todo_priority() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let a = svc.add(Variant::Todo, "a", None).unwrap();
        svc.add(Variant::Todo, "b", None).unwrap();
        svc.add(Variant::Todo, "c", None).unwrap();
        let removed = svc.delete(Variant::Todo, &a.id).unwrap();
        assert_eq!(removed.id, a.id);
        let rest = svc.load(Variant::Todo).unwrap();
        let orders: Vec<_> = rest.iter().map(|item| item.order).collect();
        let ranks: Vec<_> = rest.iter().map(|item| item.priority.rank()).collect();
        assert_eq!(orders, [0, 1]);
        assert_eq!(ranks, [1, 2]);
        assert!(matches!(
            svc.delete(Variant::Todo, &a.id),
            Err(ListError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn reorder_applies_permutation() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let a = svc.add(Variant::Todo, "a", None).unwrap();
        let b = svc.add(Variant::Todo, "b", None).unwrap();
        let reordered = svc.reorder(Variant::Todo, &[&b.id, &a.id]).unwrap();
        assert_eq!(ids(&reordered), [b.id.clone(), a.id.clone()]);
        assert_eq!(reordered[0].priority, Priority::HIGH);
        assert_eq!(ids(&svc.load(Variant::Todo).unwrap()), [b.id.clone(), a.id]);

        assert!(matches!(
            svc.reorder(Variant::Todo, &[&b.id]),
            Err(ListError::InvalidReorder(ReorderError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn move_item_shifts_one_position() {
        let store = MemoryStore::new();
        let svc = service(&store);
        let a = svc.add(Variant::Task, "a", Some(Priority::LOW)).unwrap();
        let b = svc.add(Variant::Task, "b", None).unwrap();
        let c = svc.add(Variant::Task, "c", None).unwrap();
        let moved = svc.move_item(Variant::Task, &c.id, 0).unwrap();
        assert_eq!(ids(&moved), [c.id, a.id, b.id]);
        assert_eq!(moved[1].priority, Priority::LOW);
    }

    #[test]
    fn today_lists_pending_by_priority() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.add(Variant::Task, "low task", Some(Priority::LOW)).unwrap();
        let done = svc.add(Variant::Task, "done task", Some(Priority::HIGH)).unwrap();
        svc.mark_done(Variant::Task, &done.id).unwrap();
        svc.add(Variant::Todo, "goal one", None).unwrap();
        let rows = svc.today().unwrap();
        let texts: Vec<_> = rows.iter().map(|row| row.item.text.as_str()).collect();
        assert_eq!(texts, ["goal one", "low task"]);
    }

    #[test]
    fn unprovisioned_record_is_not_found() {
        let store = MemoryStore::new();
        let svc = ListService::new(&store, Identity::new("ghost"));
        assert!(matches!(
            svc.add(Variant::Task, "x", None),
            Err(ListError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn failed_write_is_reported_and_leaves_store_untouched() {
        let store = MemoryStore::new();
        let svc = service(&store);
        svc.add(Variant::Task, "kept", None).unwrap();
        store.set_offline(true);
        let err = svc.add(Variant::Task, "lost", None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RemoteFailure);
        store.set_offline(false);
        assert_eq!(svc.load(Variant::Task).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_writer_causes_conflict() {
        struct Racing<'a> {
            inner: &'a MemoryStore,
        }

        impl RecordStore for Racing<'_> {
            fn ensure_record(&self, user_id: &str, variant: Variant) -> Result<bool, StoreError> {
                self.inner.ensure_record(user_id, variant)
            }

            fn fetch(&self, user_id: &str, variant: Variant) -> Result<crate::store::Record, StoreError> {
                let record = self.inner.fetch(user_id, variant)?;
                // Another session writes between this read and the caller's write.
                self.inner.replace_all(user_id, variant, &record.items)?;
                Ok(record)
            }

            fn replace_all(&self, user_id: &str, variant: Variant, items: &[Item]) -> Result<u64, StoreError> {
                self.inner.replace_all(user_id, variant, items)
            }

            fn replace_if_revision(
                &self,
                user_id: &str,
                variant: Variant,
                items: &[Item],
                expected: u64,
            ) -> Result<u64, StoreError> {
                self.inner.replace_if_revision(user_id, variant, items, expected)
            }
        }

        let inner = MemoryStore::new();
        let racing = Racing { inner: &inner };
        let svc = ListService::new(&racing, Identity::new("teacher-1"));
        svc.provision().unwrap();
        let err = svc.add(Variant::Task, "x", None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::WriteConflict);
        assert!(inner.load("teacher-1", Variant::Task).unwrap().is_empty());
    }
}
