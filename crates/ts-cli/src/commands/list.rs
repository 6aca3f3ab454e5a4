//! List command for showing entries as a table or JSON.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use ts_core::{Clock, EntryFilter, EntryStore, TimeEntry, Tracker, total_hours};

pub async fn run<W, S, C>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    filter: &EntryFilter,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    tracker
        .refresh(Some(filter))
        .await
        .context("failed to list entries")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(tracker.entries())?)?;
    } else {
        write_entries(writer, tracker.entries(), &Local)?;
    }
    Ok(())
}

/// Writes entries as an aligned table with a total-hours footer.
///
/// Dates are shown in `tz`.
pub fn write_entries<W, Tz>(writer: &mut W, entries: &[TimeEntry], tz: &Tz) -> std::io::Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        writeln!(writer, "No entries found.")?;
        return Ok(());
    }

    let id_width = column_width("ID", entries.iter().map(|e| e.id.as_str()));
    let project_width = column_width("PROJECT", entries.iter().map(|e| e.project.as_str()));
    let task_width = column_width("TASK", entries.iter().map(|e| e.task.as_str()));

    writeln!(
        writer,
        "{:<id_width$}  {:<10}  {:<project_width$}  {:<task_width$}  {:>8}  {:<8}  STATUS",
        "ID", "DATE", "PROJECT", "TASK", "DURATION", "BILLABLE"
    )?;
    for entry in entries {
        writeln!(
            writer,
            "{:<id_width$}  {:<10}  {:<project_width$}  {:<task_width$}  {:>8}  {:<8}  {}",
            entry.id,
            entry.created_at.with_timezone(tz).format("%Y-%m-%d"),
            entry.project,
            entry.task,
            entry.duration_display(),
            if entry.billable { "yes" } else { "no" },
            entry.status,
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Total: {:.1} hours", total_hours(entries))?;
    Ok(())
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}
