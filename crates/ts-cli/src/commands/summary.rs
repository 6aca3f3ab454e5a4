//! Summary command for dashboard statistics.
//!
//! This module implements `ts summary` with various period options
//! (--week, --last-week, --day, --last-day, --all) and output formats
//! (human-readable, JSON).

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use ts_core::{Clock, EntryFilter, EntryStore, Summary, Tracker, validate_target};

/// Summary period type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    LastWeek,
    Day,
    LastDay,
    All,
}

impl Period {
    /// Whether the period spans a calendar week, so the weekly target applies.
    pub const fn is_week(self) -> bool {
        matches!(self, Self::Week | Self::LastWeek)
    }
}

// ========== Period Date Calculation ==========

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // DST spring-forward gap at midnight; 1am local exists
            let one_am = midnight + chrono::Duration::hours(1);
            Local.from_local_datetime(&one_am).earliest()
        })
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |dt| dt.with_timezone(&Utc),
        )
}

fn monday_of(day: NaiveDate) -> NaiveDate {
    day - chrono::Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Half-open `[start, end)` bounds for `period`, or `None` for all time.
pub fn period_boundaries(period: Period, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = match period {
        Period::Week => {
            let monday = monday_of(today);
            (monday, monday + chrono::Duration::days(7))
        }
        Period::LastWeek => {
            let monday = monday_of(today);
            (monday - chrono::Duration::days(7), monday)
        }
        Period::Day => (today, today + chrono::Duration::days(1)),
        Period::LastDay => (today - chrono::Duration::days(1), today),
        Period::All => return None,
    };
    Some((local_midnight_to_utc(start), local_midnight_to_utc(end)))
}

/// Header text for a period starting on `start`.
fn period_heading(period: Period, start: Option<NaiveDate>) -> String {
    match (period, start) {
        (Period::Week | Period::LastWeek, Some(start)) => {
            format!("Week of {}", start.format("%b %-d, %Y"))
        }
        (Period::Day | Period::LastDay, Some(start)) => start.format("%A, %b %-d, %Y").to_string(),
        _ => "All entries".to_string(),
    }
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is clamped to 0..=1, so the cell count is 0..=10"
)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = if ratio < 0.05 && value > 0.0 {
        1
    } else {
        (ratio * 10.0).round() as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

// ========== Output ==========

/// Writes the human-readable summary.
///
/// The weekly target block is only shown for week-long periods.
pub fn write_summary<W: Write>(
    writer: &mut W,
    period: Period,
    heading: &str,
    summary: &Summary,
) -> std::io::Result<()> {
    writeln!(writer, "SUMMARY: {heading}")?;
    writeln!(writer)?;

    if summary.entry_count == 0 {
        writeln!(writer, "No entries recorded for this period.")?;
        return Ok(());
    }

    writeln!(writer, "Total hours       {:.1}", summary.total_hours)?;
    writeln!(writer, "Billable hours    {:.1}", summary.billable_hours)?;
    writeln!(writer, "Active projects   {}", summary.active_projects)?;
    writeln!(
        writer,
        "Billable entries  {} of {}",
        summary.billable_entries, summary.entry_count
    )?;

    if period.is_week() {
        writeln!(writer)?;
        writeln!(writer, "WEEKLY TARGET")?;
        writeln!(writer, "─────────────")?;
        writeln!(
            writer,
            "{}  {:.1}% of {:.1}h",
            progress_bar(summary.weekly_completion, 100.0),
            summary.weekly_completion,
            summary.target_hours
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "BY PROJECT")?;
    writeln!(writer, "──────────")?;
    let width = summary
        .projects
        .iter()
        .map(|row| row.project.chars().count())
        .max()
        .unwrap_or(0);
    for row in &summary.projects {
        writeln!(
            writer,
            "{:<width$}  {:>5.1}h  {:>5.1}%  {}",
            row.project,
            row.hours,
            row.percentage,
            progress_bar(row.percentage, 100.0)
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    period: JsonPeriod,
    #[serde(flatten)]
    summary: &'a Summary,
}

#[derive(Serialize)]
struct JsonPeriod {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

// ========== Public Interface ==========

/// Runs the summary command for the period containing `today`.
pub async fn run<W, S, C>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    period: Period,
    today: NaiveDate,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    validate_target(tracker.weekly_target_hours())?;

    let bounds = period_boundaries(period, today);
    let filter = EntryFilter {
        since: bounds.map(|(start, _)| start),
        until: bounds.map(|(_, end)| end),
        ..EntryFilter::default()
    };
    tracker
        .refresh(Some(&filter))
        .await
        .context("failed to load entries")?;
    let summary = tracker.summary()?;

    if json {
        let report = JsonSummary {
            period: JsonPeriod {
                start: filter.since,
                end: filter.until,
            },
            summary: &summary,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        let start = bounds.map(|(start, _)| start.with_timezone(&Local).date_naive());
        write_summary(writer, period, &period_heading(period, start), &summary)?;
    }
    Ok(())
}
