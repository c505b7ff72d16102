//! Record store: one document per user per variant holding the full item array.
//!
//! Writes always replace the whole array. Two write paths exist:
//! - [`RecordStore::replace_all`] is unconditional, last write wins
//! - [`RecordStore::replace_if_revision`] succeeds only if nobody wrote since
//!   the caller's read, and reports [`StoreError::Conflict`] otherwise
//!
//! Provisioning is a single idempotent [`RecordStore::ensure_record`] call,
//! so two first visits by the same user cannot both insert.

pub mod memory;
pub mod sqlite;

use crate::error::ErrorCode;
use crate::model::{Item, Variant};
use crate::view;
use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Stored document for one user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub user_id: String,
    pub variant: Variant,
    pub items: Vec<Item>,
    /// Item count as of the last write.
    pub order: usize,
    /// Bumped on every write.
    pub revision: u64,
}

impl Record {
    #[must_use]
    pub fn empty(user_id: &str, variant: Variant) -> Self {
        Self {
            user_id: user_id.to_string(),
            variant,
            items: Vec::new(),
            order: 0,
            revision: 0,
        }
    }
}

/// Errors surfaced by record store backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no {variant} record for user '{user_id}'")]
    NotFound { user_id: String, variant: Variant },

    #[error(
        "{variant} record for user '{user_id}' is at revision {actual}, expected {expected}"
    )]
    Conflict {
        user_id: String,
        variant: Variant,
        expected: u64,
        actual: u64,
    },

    #[error("record store failure: {0}")]
    Remote(String),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::Conflict { .. } => ErrorCode::WriteConflict,
            Self::Remote(_) => ErrorCode::RemoteFailure,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Remote(format!("corrupt item payload: {err}"))
    }
}

/// Backend holding users' list records.
///
/// Implementations must be shareable across threads: the initial fetch of
/// both collections runs as a concurrent pair.
pub trait RecordStore: Send + Sync {
    /// Create an empty record if none exists. Returns `true` if one was created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Remote`] on backend failure.
    fn ensure_record(&self, user_id: &str, variant: Variant) -> Result<bool, StoreError>;

    /// Read the record as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record was never provisioned.
    fn fetch(&self, user_id: &str, variant: Variant) -> Result<Record, StoreError>;

    /// Replace the whole item array. Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the record was never provisioned.
    fn replace_all(&self, user_id: &str, variant: Variant, items: &[Item])
    -> Result<u64, StoreError>;

    /// Replace the whole item array if the record is still at `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if another write landed first.
    fn replace_if_revision(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
        expected: u64,
    ) -> Result<u64, StoreError>;

    /// Items sorted by ascending `order`.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::fetch`].
    fn load(&self, user_id: &str, variant: Variant) -> Result<Vec<Item>, StoreError> {
        let mut items = self.fetch(user_id, variant)?.items;
        view::sort_by_order(&mut items);
        Ok(items)
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every backend must share.

    use super::{RecordStore, StoreError};
    use crate::model::{Item, Priority, Variant};
    use chrono::{TimeZone, Utc};

    fn item(id: &str, order: usize) -> Item {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid");
        let mut item = Item::new(id.to_string(), id, Priority::HIGH, now);
        item.order = order;
        item
    }

    pub fn fetch_before_provision_is_not_found(store: &dyn RecordStore) {
        let err = store.fetch("u1", Variant::Task).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.replace_all("u1", Variant::Task, &[]).is_err());
    }

    pub fn ensure_is_idempotent(store: &dyn RecordStore) {
        assert!(store.ensure_record("u1", Variant::Task).unwrap());
        assert!(!store.ensure_record("u1", Variant::Task).unwrap());
        let record = store.fetch("u1", Variant::Task).unwrap();
        assert!(record.items.is_empty());
        assert_eq!(record.revision, 0);
        assert_eq!(record.order, 0);
    }

    pub fn variants_and_users_are_isolated(store: &dyn RecordStore) {
        store.ensure_record("u1", Variant::Task).unwrap();
        store.ensure_record("u1", Variant::Todo).unwrap();
        store.ensure_record("u2", Variant::Task).unwrap();
        store
            .replace_all("u1", Variant::Task, &[item("a", 0)])
            .unwrap();

        assert_eq!(store.fetch("u1", Variant::Task).unwrap().items.len(), 1);
        assert!(store.fetch("u1", Variant::Todo).unwrap().items.is_empty());
        assert!(store.fetch("u2", Variant::Task).unwrap().items.is_empty());
    }

    pub fn replace_all_sets_count_and_revision(store: &dyn RecordStore) {
        store.ensure_record("u1", Variant::Todo).unwrap();
        let rev = store
            .replace_all("u1", Variant::Todo, &[item("a", 0), item("b", 1)])
            .unwrap();
        assert_eq!(rev, 1);
        let record = store.fetch("u1", Variant::Todo).unwrap();
        assert_eq!(record.order, 2);
        assert_eq!(record.revision, 1);
        assert_eq!(record.items[1].id, "b");
    }

    pub fn stale_revision_conflicts(store: &dyn RecordStore) {
        store.ensure_record("u1", Variant::Task).unwrap();
        let first = store
            .replace_if_revision("u1", Variant::Task, &[item("a", 0)], 0)
            .unwrap();
        assert_eq!(first, 1);

        let err = store
            .replace_if_revision("u1", Variant::Task, &[item("b", 0)], 0)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                user_id: "u1".into(),
                variant: Variant::Task,
                expected: 0,
                actual: 1,
            }
        );
        assert_eq!(store.fetch("u1", Variant::Task).unwrap().items[0].id, "a");
    }

    pub fn load_sorts_by_order(store: &dyn RecordStore) {
        store.ensure_record("u1", Variant::Task).unwrap();
        store
            .replace_all("u1", Variant::Task, &[item("b", 1), item("a", 0)])
            .unwrap();
        let items = store.load("u1", Variant::Task).unwrap();
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }

    pub fn run_all(make: impl Fn() -> Box<dyn RecordStore>) {
        fetch_before_provision_is_not_found(make().as_ref());
        ensure_is_idempotent(make().as_ref());
        variants_and_users_are_isolated(make().as_ref());
        replace_all_sets_count_and_revision(make().as_ref());
        stale_revision_conflicts(make().as_ref());
        load_sorts_by_order(make().as_ref());
    }
}
