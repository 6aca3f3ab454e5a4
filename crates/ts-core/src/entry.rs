//! Time entries: the completed, persisted records of tracked work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::{format_duration, seconds_to_hours};
use crate::types::{EntryId, EntryStatus, ProjectName, TaskName, Timeframe, ValidationError};

/// One completed unit of tracked work.
///
/// `id` and `created_at` are fixed at creation; edits go through
/// [`TimeEntry::apply`], which never touches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: EntryId,
    pub project: ProjectName,
    pub task: TaskName,
    /// Tracked time in whole seconds.
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub billable: bool,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Builds a `Completed` entry with a fresh id.
    pub(crate) fn completed(
        details: EntryDetails,
        duration_secs: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            project: details.project,
            task: details.task,
            duration_secs,
            billable: details.billable,
            status: EntryStatus::Completed,
            description: details.description,
            timeframe: details.timeframe,
            created_at,
        }
    }

    /// Duration as fractional hours.
    pub fn hours(&self) -> f64 {
        seconds_to_hours(self.duration_secs)
    }

    /// Duration rendered as `HH:MM:SS`.
    pub fn duration_display(&self) -> String {
        format_duration(self.duration_secs)
    }

    /// Applies an edit in place.
    pub fn apply(&mut self, patch: &EntryPatch) {
        if let Some(project) = &patch.project {
            self.project = project.clone();
        }
        if let Some(task) = &patch.task {
            self.task = task.clone();
        }
        if let Some(duration) = patch.duration_secs {
            self.duration_secs = duration;
        }
        if let Some(billable) = patch.billable {
            self.billable = billable;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(description) = &patch.description {
            self.description = non_blank(description);
        }
        if let Some(timeframe) = patch.timeframe {
            self.timeframe = timeframe;
        }
    }
}

/// Unvalidated entry fields as typed into a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub project: String,
    pub task: String,
    pub billable: bool,
    pub description: Option<String>,
    pub timeframe: Timeframe,
}

impl EntryDraft {
    /// A billable draft with no description.
    pub fn new(project: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            task: task.into(),
            billable: true,
            description: None,
            timeframe: Timeframe::default(),
        }
    }

    #[must_use]
    pub const fn billable(mut self, billable: bool) -> Self {
        self.billable = billable;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub(crate) fn validate(&self) -> Result<EntryDetails, ValidationError> {
        Ok(EntryDetails {
            project: ProjectName::new(self.project.as_str())?,
            task: TaskName::new(self.task.as_str())?,
            billable: self.billable,
            description: self.description.as_deref().and_then(non_blank),
            timeframe: self.timeframe,
        })
    }
}

/// Validated fields shared by timer sessions and the entries they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDetails {
    pub project: ProjectName,
    pub task: TaskName,
    pub billable: bool,
    pub description: Option<String>,
    pub timeframe: Timeframe,
}

/// A partial update. `None` leaves the field unchanged.
///
/// A blank `description` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskName>,
    #[serde(
        default,
        rename = "duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
}

impl EntryPatch {
    /// Returns true if the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
