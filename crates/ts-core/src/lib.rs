//! Core domain logic for the timesheet tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the start/pause/resume/stop state machine for one active session
//! - Aggregation: hours, billable totals, and weekly progress over entries
//! - Storage: the [`EntryStore`] port and an in-memory implementation
//! - Tracker: the session object that ties the three together

pub mod aggregate;
pub mod clock;
pub mod duration;
pub mod entry;
pub mod filter;
pub mod store;
pub mod timer;
pub mod tracker;
pub mod types;

pub use aggregate::{
    AggregateError, DEFAULT_WEEKLY_TARGET_HOURS, ProjectHours, Summary, billable_entry_count,
    billable_hours, distinct_project_count, project_breakdown, total_hours, validate_target,
    weekly_completion_percentage,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_duration, parse_duration};
pub use entry::{EntryDetails, EntryDraft, EntryPatch, TimeEntry};
pub use filter::EntryFilter;
pub use store::{EntryStore, InMemoryStore, StoreError};
pub use timer::{Timer, TimerError, TimerPhase, TimerSession};
pub use tracker::{Tracker, TrackerError};
pub use types::{EntryId, EntryStatus, ProjectName, TaskName, Timeframe, ValidationError};
