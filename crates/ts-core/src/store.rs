//! Data-access port for entry persistence.
//!
//! The engine never persists anything itself. It talks to whatever backs
//! this trait (a REST API in production, [`InMemoryStore`] in tests and
//! local development) and treats its failures as opaque.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::{EntryPatch, TimeEntry};
use crate::filter::EntryFilter;
use crate::types::EntryId;

/// Errors reported by an [`EntryStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry with this id exists.
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    /// An entry with this id already exists.
    #[error("duplicate entry id: {0}")]
    Duplicate(EntryId),

    /// Any other collaborator failure (transport, server, decoding).
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Create/read/update/delete capability for time entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Persists a new entry and returns the stored record.
    async fn create_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, StoreError>;

    /// Lists entries, optionally narrowed by `filter`.
    async fn list_entries(&self, filter: Option<&EntryFilter>)
    -> Result<Vec<TimeEntry>, StoreError>;

    /// Applies `patch` to an existing entry and returns the updated record.
    async fn update_entry(&self, id: &EntryId, patch: &EntryPatch)
    -> Result<TimeEntry, StoreError>;

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError>;
}

/// Vector-backed store. Entries are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<Vec<TimeEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `entries`.
    pub fn with_entries(entries: Vec<TimeEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Vec<TimeEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn create_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Duplicate(entry.id.clone()));
        }
        entries.push(entry.clone());
        Ok(entry.clone())
    }

    async fn list_entries(
        &self,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<TimeEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(match filter {
            Some(filter) => filter.apply(&entries).into_iter().cloned().collect(),
            None => entries.clone(),
        })
    }

    async fn update_entry(
        &self,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> Result<TimeEntry, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        entry.apply(patch);
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| &e.id != id);
        if entries.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
