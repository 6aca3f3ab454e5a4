//! Add command for recording a manual entry.

use std::io::Write;

use anyhow::Result;
use ts_core::{Clock, EntryDraft, EntryStore, Tracker};

use super::util::describe;

pub async fn run<W, S, C>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    draft: &EntryDraft,
    duration: &str,
) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    let entry = tracker.save_manual(draft, duration).await?;
    writeln!(writer, "Saved entry {}: {}", entry.id, describe(&entry))?;
    Ok(())
}
