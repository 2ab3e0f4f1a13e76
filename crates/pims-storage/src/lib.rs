//! The relational store seam used by the PIMS importer, with Postgres and
//! in-memory implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use pims_core::{EntryCandidate, LocationKey, StoredEntry};
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::{MemoryDatabase, MemoryEntry, MemoryTables, MemoryTx};
pub use postgres::{PgImportTx, PgStore};

pub const CRATE_NAME: &str = "pims-storage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
}

/// One open import transaction. Every write happens inside it; nothing is
/// visible to other readers until `commit`.
///
/// Insert methods are insert-or-ignore on the table's natural key and return
/// the number of rows actually inserted.
#[async_trait]
pub trait ImportStore: Send + Sized {
    async fn insert_organizations(&mut self, names: &[String]) -> Result<u64, StoreError>;
    async fn insert_locations(&mut self, locations: &[LocationKey]) -> Result<u64, StoreError>;
    async fn insert_topics(&mut self, names: &[String]) -> Result<u64, StoreError>;

    async fn organization_id(&mut self, name: &str) -> Result<Option<i32>, StoreError>;
    async fn location_id(&mut self, location: &LocationKey) -> Result<Option<i32>, StoreError>;

    /// Insert new entry keys; on key conflict overwrite the content columns.
    /// Returns the storage id of every row touched together with its key.
    async fn upsert_entries(
        &mut self,
        batch: &[EntryCandidate],
    ) -> Result<Vec<StoredEntry>, StoreError>;

    async fn topic_ids(&mut self) -> Result<HashMap<String, i32>, StoreError>;
    async fn insert_entry_topics(&mut self, pairs: &[(i32, i32)]) -> Result<u64, StoreError>;
    async fn insert_languages(&mut self, names: &[String]) -> Result<u64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
    async fn rollback(self) -> Result<(), StoreError>;
}
