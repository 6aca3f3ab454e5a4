//! Track command: an interactive timer driven by stdin.
//!
//! The loop multiplexes a display tick with command lines. The tick only
//! reads [`Timer::elapsed`](ts_core::Timer::elapsed); every state change
//! goes through [`apply_action`]. End of input discards the session.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;
use tracing::debug;
use ts_core::{Clock, EntryDraft, EntryStore, TimerError, Tracker, TrackerError};

use super::util::describe;

/// Display refresh interval.
pub const TICK: Duration = Duration::from_secs(1);

const COMMANDS: &str = "pause, resume, stop, abandon, status";

/// A command typed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Pause,
    Resume,
    Stop,
    Abandon,
    Status,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pause" | "p" => Ok(Self::Pause),
            "resume" | "r" => Ok(Self::Resume),
            "stop" | "s" => Ok(Self::Stop),
            "abandon" | "quit" | "q" => Ok(Self::Abandon),
            "status" | "" => Ok(Self::Status),
            other => anyhow::bail!("unknown command '{other}' (expected {COMMANDS})"),
        }
    }
}

/// Whether the session continues after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Applies one action to the tracker and reports the outcome.
///
/// Illegal transitions are reported and the session continues. A failed
/// save prints the unsaved entry as JSON before returning the error.
pub async fn apply_action<W, S, C>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    action: Action,
) -> Result<Flow>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    let result = match action {
        Action::Pause => tracker.timer_mut().pause().map(|()| {
            format!("Paused at {}", tracker.timer().elapsed_display())
        }),
        Action::Resume => tracker.timer_mut().resume().map(|()| "Resumed".to_string()),
        Action::Status => Ok(format!(
            "{} {}",
            tracker.timer().phase(),
            tracker.timer().elapsed_display()
        )),
        Action::Abandon => {
            tracker.timer_mut().abandon();
            writeln!(writer, "Session discarded.")?;
            return Ok(Flow::Finished);
        }
        Action::Stop => return stop(writer, tracker).await,
    };

    match result {
        Ok(message) => writeln!(writer, "{message}")?,
        Err(err @ TimerError::InvalidState { .. }) => writeln!(writer, "{err}")?,
        Err(err) => return Err(err.into()),
    }
    Ok(Flow::Continue)
}

async fn stop<W, S, C>(writer: &mut W, tracker: &mut Tracker<S, C>) -> Result<Flow>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    match tracker.stop().await {
        Ok(Some(entry)) => {
            writeln!(writer, "Saved entry {}: {}", entry.id, describe(&entry))?;
        }
        Ok(None) => writeln!(writer, "Nothing tracked; no entry saved.")?,
        Err(TrackerError::Persist { entry, source }) => {
            writeln!(writer, "Could not save entry; unsaved record follows:")?;
            writeln!(writer, "{}", serde_json::to_string(&entry)?)?;
            return Err(anyhow::Error::new(source).context("failed to save entry"));
        }
        Err(err) => return Err(err.into()),
    }
    Ok(Flow::Finished)
}

/// Starts a session from `draft` and runs it until stopped, abandoned,
/// or `input` is exhausted.
pub async fn run<R, W, S, C>(
    input: R,
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    draft: &EntryDraft,
    tick: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: EntryStore,
    C: Clock,
{
    tracker
        .timer_mut()
        .start(draft)
        .context("failed to start timer")?;
    writeln!(
        writer,
        "Tracking {} / {}. Commands: {COMMANDS}",
        draft.project.trim(),
        draft.task.trim()
    )?;

    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    if tracker.timer_mut().abandon() {
                        writeln!(writer, "Input closed; session discarded.")?;
                    }
                    return Ok(());
                };
                debug!(%line, "command received");
                match line.parse::<Action>() {
                    Ok(action) => {
                        if apply_action(writer, tracker, action).await? == Flow::Finished {
                            return Ok(());
                        }
                    }
                    Err(err) => writeln!(writer, "{err}")?,
                }
            }
            _ = ticker.tick() => {
                write!(
                    writer,
                    "\r{} ({})",
                    tracker.timer().elapsed_display(),
                    tracker.timer().phase()
                )?;
                writer.flush()?;
            }
        }
    }
}
