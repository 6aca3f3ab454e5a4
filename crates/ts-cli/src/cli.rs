//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use ts_core::{EntryDraft, EntryStatus, Timeframe};

/// Timesheet time tracker.
///
/// Runs a live timer or records manual entries against the timesheet
/// backend, and summarizes tracked hours against a weekly target.
#[derive(Debug, Parser)]
#[command(name = "ts", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive timer.
    ///
    /// Reads `pause`, `resume`, `stop`, `abandon`, and `status` from stdin.
    Track {
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Record a manual entry.
    Add {
        #[command(flatten)]
        entry: EntryArgs,

        /// Time spent, as H:MM:SS.
        #[arg(long)]
        duration: String,
    },

    /// List entries.
    List {
        /// Only entries for this project.
        #[arg(long)]
        project: Option<String>,

        /// Only billable entries.
        #[arg(long, conflicts_with = "non_billable")]
        billable: bool,

        /// Only non-billable entries.
        #[arg(long)]
        non_billable: bool,

        /// Only entries with this status (pending, in-progress, completed).
        #[arg(long)]
        status: Option<EntryStatus>,

        /// Created at or after (ISO 8601 or relative, e.g. "2 days ago").
        #[arg(long)]
        since: Option<String>,

        /// Created before (ISO 8601 or relative).
        #[arg(long)]
        until: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing entry.
    Edit {
        /// Entry ID.
        id: String,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        task: Option<String>,

        /// New duration, as H:MM:SS.
        #[arg(long)]
        duration: Option<String>,

        #[arg(long)]
        status: Option<EntryStatus>,

        #[arg(long)]
        billable: Option<bool>,

        /// New description; pass an empty string to clear it.
        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        timeframe: Option<Timeframe>,
    },

    /// Delete an entry.
    Delete {
        /// Entry ID.
        id: String,
    },

    /// Show tracked hours against the weekly target.
    #[command(group(ArgGroup::new("period").multiple(false)))]
    Summary {
        /// Current week (default).
        #[arg(long, group = "period")]
        week: bool,

        /// Previous week.
        #[arg(long, group = "period")]
        last_week: bool,

        /// Today.
        #[arg(long, group = "period")]
        day: bool,

        /// Yesterday.
        #[arg(long, group = "period")]
        last_day: bool,

        /// Every entry, regardless of date.
        #[arg(long, group = "period")]
        all: bool,

        /// Weekly target in hours (overrides config).
        #[arg(long)]
        target: Option<f64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Fields shared by timed and manual entries.
#[derive(Debug, Args)]
pub struct EntryArgs {
    /// Project the time belongs to.
    #[arg(short, long)]
    pub project: String,

    /// Task within the project.
    #[arg(short, long)]
    pub task: String,

    /// Mark the entry as non-billable.
    #[arg(long)]
    pub non_billable: bool,

    /// Free-text notes.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Tracking granularity (hourly, daily, weekly, monthly).
    #[arg(long, default_value_t = Timeframe::Hourly)]
    pub timeframe: Timeframe,
}

impl EntryArgs {
    pub fn draft(&self) -> EntryDraft {
        let mut draft = EntryDraft::new(self.project.as_str(), self.task.as_str())
            .billable(!self.non_billable)
            .timeframe(self.timeframe);
        if let Some(description) = &self.description {
            draft = draft.description(description.as_str());
        }
        draft
    }
}
