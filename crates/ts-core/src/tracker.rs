//! Session-scoped tracker tying the timer, the entry collection, and the
//! store together.
//!
//! UI callbacks receive `&mut Tracker` rather than reaching for shared
//! state. The local collection only ever mirrors changes the store has
//! accepted.

use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::{AggregateError, DEFAULT_WEEKLY_TARGET_HOURS, Summary};
use crate::clock::{Clock, SystemClock};
use crate::entry::{EntryDraft, EntryPatch, TimeEntry};
use crate::filter::EntryFilter;
use crate::store::{EntryStore, StoreError};
use crate::timer::{Timer, TimerError};
use crate::types::EntryId;

/// Tracker operation errors.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A completed entry could not be saved. The entry is handed back so the
    /// caller can retry or show it.
    #[error("failed to save entry for {}", entry.project)]
    Persist {
        entry: Box<TimeEntry>,
        #[source]
        source: StoreError,
    },
}

/// One user's tracking session.
pub struct Tracker<S, C = SystemClock> {
    store: S,
    timer: Timer<C>,
    entries: Vec<TimeEntry>,
    weekly_target_hours: f64,
}

impl<S: EntryStore, C: Clock> Tracker<S, C> {
    /// An idle tracker with an empty collection.
    pub const fn new(store: S, clock: C) -> Self {
        Self {
            store,
            timer: Timer::new(clock),
            entries: Vec::new(),
            weekly_target_hours: DEFAULT_WEEKLY_TARGET_HOURS,
        }
    }

    /// Overrides the weekly target used by [`Tracker::summary`].
    #[must_use]
    pub fn with_weekly_target(mut self, hours: f64) -> Self {
        self.weekly_target_hours = hours;
        self
    }

    pub const fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    pub const fn timer_mut(&mut self) -> &mut Timer<C> {
        &mut self.timer
    }

    /// Entries loaded or saved during this session.
    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn weekly_target_hours(&self) -> f64 {
        self.weekly_target_hours
    }

    /// Replaces the collection with what the store returns for `filter`.
    pub async fn refresh(&mut self, filter: Option<&EntryFilter>) -> Result<(), TrackerError> {
        let entries = self.store.list_entries(filter).await.inspect_err(|e| {
            warn!(error = %e, "failed to list entries");
        })?;
        debug!(count = entries.len(), "entries loaded");
        self.entries = entries;
        Ok(())
    }

    /// Stops the timer and saves the resulting entry.
    ///
    /// `Ok(None)` means nothing was tracked and nothing was sent.
    pub async fn stop(&mut self) -> Result<Option<TimeEntry>, TrackerError> {
        let Some(entry) = self.timer.stop()? else {
            return Ok(None);
        };
        self.persist(entry).await.map(Some)
    }

    /// Validates and saves a manually entered duration.
    pub async fn save_manual(
        &mut self,
        draft: &EntryDraft,
        duration: &str,
    ) -> Result<TimeEntry, TrackerError> {
        let entry = self.timer.save_manual(draft, duration)?;
        self.persist(entry).await
    }

    /// Re-sends an entry previously returned in [`TrackerError::Persist`].
    pub async fn retry(&mut self, entry: TimeEntry) -> Result<TimeEntry, TrackerError> {
        self.persist(entry).await
    }

    pub async fn update(
        &mut self,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> Result<TimeEntry, TrackerError> {
        let updated = self
            .store
            .update_entry(id, patch)
            .await
            .inspect_err(|e| warn!(%id, error = %e, "failed to update entry"))?;
        if let Some(local) = self.entries.iter_mut().find(|e| &e.id == id) {
            *local = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &EntryId) -> Result<(), TrackerError> {
        self.store
            .delete_entry(id)
            .await
            .inspect_err(|e| warn!(%id, error = %e, "failed to delete entry"))?;
        self.entries.retain(|e| &e.id != id);
        Ok(())
    }

    /// Dashboard statistics over the current collection.
    pub fn summary(&self) -> Result<Summary, AggregateError> {
        Summary::compute(&self.entries, self.weekly_target_hours)
    }

    async fn persist(&mut self, entry: TimeEntry) -> Result<TimeEntry, TrackerError> {
        match self.store.create_entry(&entry).await {
            Ok(stored) => {
                debug!(id = %stored.id, duration_secs = stored.duration_secs, "entry saved");
                self.entries.push(stored.clone());
                Ok(stored)
            }
            Err(source) => {
                warn!(error = %source, "failed to save entry");
                Err(TrackerError::Persist {
                    entry: Box::new(entry),
                    source,
                })
            }
        }
    }
}
