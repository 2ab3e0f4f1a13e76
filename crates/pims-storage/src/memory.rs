use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use pims_core::{EntryCandidate, EntryContent, EntryKey, LocationKey, StoredEntry};

use crate::{ImportStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub id: i32,
    pub content: EntryContent,
}

/// Table contents of the in-process store. Ids are assigned serially per
/// table starting at 1, like a `SERIAL` column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTables {
    pub organizations: IndexMap<String, i32>,
    pub locations: IndexMap<LocationKey, i32>,
    pub topics: IndexMap<String, i32>,
    pub entries: IndexMap<EntryKey, MemoryEntry>,
    pub entry_topics: IndexSet<(i32, i32)>,
    pub languages: IndexMap<String, i32>,
}

impl MemoryTables {
    pub fn entry(&self, id: i32) -> Option<(&EntryKey, &MemoryEntry)> {
        self.entries.iter().find(|(_, e)| e.id == id)
    }
}

fn insert_or_ignore<K: std::hash::Hash + Eq>(table: &mut IndexMap<K, i32>, key: K) -> bool {
    if table.contains_key(&key) {
        return false;
    }
    let id = table.len() as i32 + 1;
    table.insert(key, id);
    true
}

/// Rows are never deleted, so a table of `len` rows holds exactly ids
/// `1..=len`.
fn assigned(len: usize, id: i32) -> bool {
    usize::try_from(id).is_ok_and(|id| id >= 1 && id <= len)
}

/// In-process stand-in for the relational store with the same uniqueness
/// and conflict rules. Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a transaction on a private working copy of the tables.
    pub fn begin(&self) -> MemoryTx {
        MemoryTx {
            db: self.clone(),
            working: self.lock().clone(),
        }
    }

    pub fn snapshot(&self) -> MemoryTables {
        self.lock().clone()
    }
}

pub struct MemoryTx {
    db: MemoryDatabase,
    working: MemoryTables,
}

impl MemoryTx {
    pub fn tables(&self) -> &MemoryTables {
        &self.working
    }
}

#[async_trait]
impl ImportStore for MemoryTx {
    async fn insert_organizations(&mut self, names: &[String]) -> Result<u64, StoreError> {
        let inserted = names
            .iter()
            .filter(|name| insert_or_ignore(&mut self.working.organizations, (*name).clone()))
            .count();
        Ok(inserted as u64)
    }

    async fn insert_locations(&mut self, locations: &[LocationKey]) -> Result<u64, StoreError> {
        let inserted = locations
            .iter()
            .filter(|loc| insert_or_ignore(&mut self.working.locations, (*loc).clone()))
            .count();
        Ok(inserted as u64)
    }

    async fn insert_topics(&mut self, names: &[String]) -> Result<u64, StoreError> {
        let inserted = names
            .iter()
            .filter(|name| insert_or_ignore(&mut self.working.topics, (*name).clone()))
            .count();
        Ok(inserted as u64)
    }

    async fn organization_id(&mut self, name: &str) -> Result<Option<i32>, StoreError> {
        Ok(self.working.organizations.get(name).copied())
    }

    async fn location_id(&mut self, location: &LocationKey) -> Result<Option<i32>, StoreError> {
        Ok(self.working.locations.get(location).copied())
    }

    async fn upsert_entries(
        &mut self,
        batch: &[EntryCandidate],
    ) -> Result<Vec<StoredEntry>, StoreError> {
        let mut seen = IndexSet::with_capacity(batch.len());
        for candidate in batch {
            if !seen.insert(&candidate.key) {
                return Err(StoreError::Rejected {
                    operation: "upsert_entries",
                    message: format!(
                        "batch affects entry {:?} more than once",
                        candidate.key.title
                    ),
                });
            }
        }

        let mut stored = Vec::with_capacity(batch.len());
        for candidate in batch {
            let next_id = self.working.entries.len() as i32 + 1;
            let entry = self
                .working
                .entries
                .entry(candidate.key.clone())
                .or_insert_with(|| MemoryEntry {
                    id: next_id,
                    content: EntryContent::default(),
                });
            entry.content = candidate.content.clone();
            stored.push(StoredEntry {
                id: entry.id,
                key: candidate.key.clone(),
            });
        }
        Ok(stored)
    }

    async fn topic_ids(&mut self) -> Result<HashMap<String, i32>, StoreError> {
        Ok(self
            .working
            .topics
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }

    async fn insert_entry_topics(&mut self, pairs: &[(i32, i32)]) -> Result<u64, StoreError> {
        let mut inserted = 0u64;
        for &(entry_id, topic_id) in pairs {
            if !assigned(self.working.entries.len(), entry_id)
                || !assigned(self.working.topics.len(), topic_id)
            {
                return Err(StoreError::Rejected {
                    operation: "insert_entry_topics",
                    message: format!("pair ({entry_id}, {topic_id}) references a missing row"),
                });
            }
            if self.working.entry_topics.insert((entry_id, topic_id)) {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn insert_languages(&mut self, names: &[String]) -> Result<u64, StoreError> {
        let inserted = names
            .iter()
            .filter(|name| insert_or_ignore(&mut self.working.languages, (*name).clone()))
            .count();
        Ok(inserted as u64)
    }

    async fn commit(self) -> Result<(), StoreError> {
        *self.db.lock() = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
