//! Entry filtering for list views.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::TimeEntry;
use crate::types::EntryStatus;

/// Criteria for selecting entries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Exact project name.
    pub project: Option<String>,
    pub billable: Option<bool>,
    pub status: Option<EntryStatus>,
    /// Inclusive lower bound on `created_at`.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub until: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.project
            .as_deref()
            .is_none_or(|project| entry.project.as_str() == project)
            && self.billable.is_none_or(|billable| entry.billable == billable)
            && self.status.is_none_or(|status| entry.status == status)
            && self.since.is_none_or(|since| entry.created_at >= since)
            && self.until.is_none_or(|until| entry.created_at < until)
    }

    /// Keeps the matching entries, preserving order.
    pub fn apply<'a>(&self, entries: &'a [TimeEntry]) -> Vec<&'a TimeEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    /// Query-string pairs for the set fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(project) = &self.project {
            pairs.push(("project", project.clone()));
        }
        if let Some(billable) = self.billable {
            pairs.push(("billable", billable.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(since) = self.since {
            pairs.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(until) = self.until {
            pairs.push(("until", until.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{EntryId, ProjectName, TaskName, Timeframe};

    fn entry(project: &str, billable: bool, status: EntryStatus, day: u32) -> TimeEntry {
        TimeEntry {
            id: EntryId::generate(),
            project: ProjectName::new(project).unwrap(),
            task: TaskName::new("Work").unwrap(),
            duration_secs: 3600,
            billable,
            status,
            description: None,
            timeframe: Timeframe::Hourly,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let e = entry("Mobile App", false, EntryStatus::Pending, 1);
        assert!(EntryFilter::default().matches(&e));
    }

    #[test]
    fn filters_combine_with_and() {
        let entries = vec![
            entry("Mobile App", true, EntryStatus::Completed, 10),
            entry("Mobile App", false, EntryStatus::Completed, 11),
            entry("Website Redesign", true, EntryStatus::Completed, 12),
            entry("Mobile App", true, EntryStatus::Pending, 13),
        ];
        let filter = EntryFilter {
            project: Some("Mobile App".to_string()),
            billable: Some(true),
            status: Some(EntryStatus::Completed),
            ..EntryFilter::default()
        };

        let matched = filter.apply(&entries);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, entries[0].id);
    }

    #[test]
    fn date_bounds_are_half_open() {
        let entries = vec![
            entry("P", true, EntryStatus::Completed, 14),
            entry("P", true, EntryStatus::Completed, 15),
            entry("P", true, EntryStatus::Completed, 16),
        ];
        let filter = EntryFilter {
            since: Some(Utc.with_ymd_and_hms(2024, 1, 14, 12, 0, 0).unwrap()),
            until: Some(Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap()),
            ..EntryFilter::default()
        };
        assert_eq!(filter.apply(&entries).len(), 2);
    }

    #[test]
    fn query_pairs_only_include_set_fields() {
        let filter = EntryFilter {
            project: Some("Mobile App".to_string()),
            status: Some(EntryStatus::InProgress),
            since: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()),
            ..EntryFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("project", "Mobile App".to_string()),
                ("status", "In Progress".to_string()),
                ("since", "2024-01-15T00:00:00Z".to_string()),
            ]
        );
        assert!(EntryFilter::default().query_pairs().is_empty());
    }
}
