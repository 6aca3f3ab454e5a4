//! Edit command for patching an existing entry.

use std::io::Write;

use anyhow::{Context, Result};
use ts_core::{
    Clock, EntryId, EntryPatch, EntryStatus, EntryStore, ProjectName, TaskName, Timeframe,
    Tracker, parse_duration,
};

use super::util::describe;

/// Raw edit flags before validation.
#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub project: Option<String>,
    pub task: Option<String>,
    pub duration: Option<String>,
    pub status: Option<EntryStatus>,
    pub billable: Option<bool>,
    pub description: Option<String>,
    pub timeframe: Option<Timeframe>,
}

impl EditArgs {
    /// Validates the flags into a patch.
    pub fn into_patch(self) -> Result<EntryPatch> {
        Ok(EntryPatch {
            project: self.project.map(ProjectName::new).transpose()?,
            task: self.task.map(TaskName::new).transpose()?,
            duration_secs: self.duration.as_deref().map(parse_duration).transpose()?,
            billable: self.billable,
            status: self.status,
            description: self.description,
            timeframe: self.timeframe,
        })
    }
}

pub async fn run<W, S, C>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    id: &str,
    args: EditArgs,
) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    let id = EntryId::new(id)?;
    let patch = args.into_patch()?;
    if patch.is_empty() {
        anyhow::bail!("nothing to change: pass at least one field to edit");
    }

    let entry = tracker
        .update(&id, &patch)
        .await
        .with_context(|| format!("failed to update entry {id}"))?;
    writeln!(
        writer,
        "Updated entry {}: {} [{}]",
        entry.id,
        describe(&entry),
        entry.status
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use ts_core::{EntryDraft, InMemoryStore, ManualClock};

    use super::*;

    async fn tracker_with_entry() -> (Tracker<InMemoryStore, ManualClock>, EntryId) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap());
        let mut tracker = Tracker::new(InMemoryStore::new(), clock);
        let entry = tracker
            .save_manual(&EntryDraft::new("Mobile App", "Testing"), "1:00:00")
            .await
            .unwrap();
        (tracker, entry.id)
    }

    #[test]
    fn into_patch_validates_fields() {
        let args = EditArgs {
            project: Some("  ".to_string()),
            ..EditArgs::default()
        };
        assert!(args.into_patch().is_err());

        let args = EditArgs {
            duration: Some("1:99:00".to_string()),
            ..EditArgs::default()
        };
        assert!(args.into_patch().is_err());
    }

    #[tokio::test]
    async fn edit_applies_patch() {
        let (mut tracker, id) = tracker_with_entry().await;
        let mut output = Vec::new();
        let args = EditArgs {
            duration: Some("0:45:00".to_string()),
            status: Some(EntryStatus::Pending),
            billable: Some(false),
            ..EditArgs::default()
        };

        run(&mut output, &mut tracker, id.as_str(), args)
            .await
            .unwrap();

        let stored = &tracker.store().snapshot()[0];
        assert_eq!(stored.duration_secs, 2700);
        assert_eq!(stored.status, EntryStatus::Pending);
        assert!(!stored.billable);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            format!("Updated entry {id}: Mobile App / Testing, 00:45:00 (non-billable) [Pending]\n")
        );
    }

    #[tokio::test]
    async fn edit_without_fields_is_rejected() {
        let (mut tracker, id) = tracker_with_entry().await;
        let mut output = Vec::new();

        let err = run(&mut output, &mut tracker, id.as_str(), EditArgs::default())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("nothing to change"));
    }
}
