//! Delete command.

use std::io::Write;

use anyhow::{Context, Result};
use ts_core::{Clock, EntryId, EntryStore, Tracker};

pub async fn run<W, S, C>(writer: &mut W, tracker: &mut Tracker<S, C>, id: &str) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    let id = EntryId::new(id)?;
    tracker
        .delete(&id)
        .await
        .with_context(|| format!("failed to delete entry {id}"))?;
    writeln!(writer, "Deleted entry {id}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ts_core::{EntryDraft, InMemoryStore, ManualClock, StoreError, TrackerError};

    use super::*;

    #[tokio::test]
    async fn delete_removes_entry() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let mut tracker = Tracker::new(InMemoryStore::new(), clock);
        let entry = tracker
            .save_manual(&EntryDraft::new("Mobile App", "Testing"), "0:15:00")
            .await
            .unwrap();
        let mut output = Vec::new();

        run(&mut output, &mut tracker, entry.id.as_str()).await.unwrap();

        assert!(tracker.store().snapshot().is_empty());
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("Deleted entry {}\n", entry.id)
        );
    }

    #[tokio::test]
    async fn delete_unknown_id_reports_not_found() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let mut tracker = Tracker::new(InMemoryStore::new(), clock);
        let mut output = Vec::new();

        let err = run(&mut output, &mut tracker, "missing").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::Store(StoreError::NotFound(_)))
        ));
        assert_eq!(err.to_string(), "failed to delete entry missing");
    }
}
