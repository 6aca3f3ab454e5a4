//! Derived statistics over a collection of time entries.
//!
//! Everything here is a pure function of its input. Durations are summed as
//! integer seconds before conversion to hours, so results do not depend on
//! entry order.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::duration::seconds_to_hours;
use crate::entry::TimeEntry;

/// Default weekly target used by the dashboard.
pub const DEFAULT_WEEKLY_TARGET_HOURS: f64 = 40.0;

/// Aggregation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregateError {
    /// The weekly target must be a positive, finite number of hours.
    #[error("weekly target must be a positive number of hours, got {value}")]
    InvalidTarget { value: f64 },
}

/// Sum of all durations in hours.
pub fn total_hours(entries: &[TimeEntry]) -> f64 {
    seconds_to_hours(total_seconds(entries.iter()))
}

/// Sum of billable durations in hours.
pub fn billable_hours(entries: &[TimeEntry]) -> f64 {
    seconds_to_hours(total_seconds(entries.iter().filter(|e| e.billable)))
}

/// Number of distinct project names.
pub fn distinct_project_count(entries: &[TimeEntry]) -> usize {
    entries
        .iter()
        .map(|e| e.project.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Number of billable entries.
pub fn billable_entry_count(entries: &[TimeEntry]) -> usize {
    entries.iter().filter(|e| e.billable).count()
}

/// Share of the weekly target reached, in percent, capped at 100.
pub fn weekly_completion_percentage(
    entries: &[TimeEntry],
    target_hours: f64,
) -> Result<f64, AggregateError> {
    let target_hours = validate_target(target_hours)?;
    Ok((total_hours(entries) / target_hours * 100.0).min(100.0))
}

/// Checks that a weekly target is a positive, finite number of hours.
pub fn validate_target(target_hours: f64) -> Result<f64, AggregateError> {
    if !target_hours.is_finite() || target_hours <= 0.0 {
        return Err(AggregateError::InvalidTarget {
            value: target_hours,
        });
    }
    Ok(target_hours)
}

/// Hours tracked on one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHours {
    pub project: String,
    pub hours: f64,
    /// Share of all tracked time, 0-100.
    pub percentage: f64,
}

/// Per-project totals, largest first, ties broken by name.
pub fn project_breakdown(entries: &[TimeEntry]) -> Vec<ProjectHours> {
    let mut by_project: BTreeMap<&str, u64> = BTreeMap::new();
    for entry in entries {
        *by_project.entry(entry.project.as_str()).or_default() += entry.duration_secs;
    }
    let total = total_seconds(entries.iter());

    let mut rows: Vec<(&str, u64)> = by_project.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    rows.into_iter()
        .map(|(project, seconds)| ProjectHours {
            project: project.to_string(),
            hours: seconds_to_hours(seconds),
            percentage: if total == 0 {
                0.0
            } else {
                seconds_to_hours(seconds) / seconds_to_hours(total) * 100.0
            },
        })
        .collect()
}

/// Dashboard statistics for one collection of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub entry_count: usize,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub active_projects: usize,
    pub billable_entries: usize,
    pub target_hours: f64,
    pub weekly_completion: f64,
    pub projects: Vec<ProjectHours>,
}

impl Summary {
    pub fn compute(entries: &[TimeEntry], target_hours: f64) -> Result<Self, AggregateError> {
        Ok(Self {
            entry_count: entries.len(),
            total_hours: total_hours(entries),
            billable_hours: billable_hours(entries),
            active_projects: distinct_project_count(entries),
            billable_entries: billable_entry_count(entries),
            target_hours,
            weekly_completion: weekly_completion_percentage(entries, target_hours)?,
            projects: project_breakdown(entries),
        })
    }
}

fn total_seconds<'a>(entries: impl Iterator<Item = &'a TimeEntry>) -> u64 {
    entries.map(|e| e.duration_secs).sum()
}
