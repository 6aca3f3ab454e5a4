//! Timer state machine for the single active tracking session.
//!
//! # States
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//!   ^                |                  |
//!   +-----stop-------+------stop--------+
//! ```
//!
//! Running time is folded into the session's accumulated total on every
//! pause, and the running-since reference is reset on resume, so
//! `elapsed() = accumulated + (now - running_since)` never loses or double
//! counts a second across pause/resume cycles. The running stretch only
//! ever grows: if the clock steps backwards, time already observed is kept.
//!
//! The display tick must only call [`Timer::elapsed`]; it never mutates
//! the accumulated total.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::duration::{format_duration, parse_duration};
use crate::entry::{EntryDetails, EntryDraft, TimeEntry};
use crate::types::ValidationError;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

impl TimerPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timer operation errors. State is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A required field was missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation is not legal in the current state.
    #[error("cannot {operation} while the timer is {state}")]
    InvalidState {
        operation: &'static str,
        state: TimerPhase,
    },
}

/// The in-progress tracking interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    details: EntryDetails,
    started_at: DateTime<Utc>,
    /// Running time up to the last pause; excludes the current running stretch.
    accumulated: Duration,
}

impl TimerSession {
    /// Fields that will be copied into the resulting entry.
    pub const fn details(&self) -> &EntryDetails {
        &self.details
    }

    /// When the session first entered the running state.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Running {
        session: TimerSession,
        stretch: Stretch,
    },
    Paused {
        session: TimerSession,
    },
}

/// The current uninterrupted running interval.
///
/// Remembers the furthest point it has been observed to reach, in
/// microseconds past `since`, so reads through `&Timer` can never report
/// less than an earlier read did.
#[derive(Debug)]
struct Stretch {
    since: DateTime<Utc>,
    reached_micros: AtomicI64,
}

impl Stretch {
    const fn new(since: DateTime<Utc>) -> Self {
        Self {
            since,
            reached_micros: AtomicI64::new(0),
        }
    }

    /// Length of the stretch as of `now`, never shorter than any earlier observation.
    fn observe(&self, now: DateTime<Utc>) -> Duration {
        let micros = (now - self.since)
            .num_microseconds()
            .unwrap_or(i64::MAX)
            .max(0);
        let previous = self.reached_micros.fetch_max(micros, Ordering::Relaxed);
        Duration::microseconds(previous.max(micros))
    }
}

impl Clone for Stretch {
    fn clone(&self) -> Self {
        Self {
            since: self.since,
            reached_micros: AtomicI64::new(self.reached_micros.load(Ordering::Relaxed)),
        }
    }
}

impl State {
    const fn phase(&self) -> TimerPhase {
        match self {
            Self::Idle => TimerPhase::Idle,
            Self::Running { .. } => TimerPhase::Running,
            Self::Paused { .. } => TimerPhase::Paused,
        }
    }
}

/// Start/pause/resume/stop state machine over a [`Clock`].
///
/// Holds at most one session; a second `start` is rejected rather than
/// implicitly stopping the first.
#[derive(Debug, Clone)]
pub struct Timer<C = SystemClock> {
    clock: C,
    state: State,
}

impl Default for Timer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> Timer<C> {
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            state: State::Idle,
        }
    }

    pub const fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    /// The active session, if running or paused.
    pub const fn session(&self) -> Option<&TimerSession> {
        match &self.state {
            State::Idle => None,
            State::Running { session, .. } | State::Paused { session } => Some(session),
        }
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Starts a new session from `draft`.
    pub fn start(&mut self, draft: &EntryDraft) -> Result<(), TimerError> {
        if !matches!(self.state, State::Idle) {
            return Err(invalid_state("start", self.phase()));
        }
        let details = draft.validate()?;
        let now = self.clock.now();

        debug!(project = %details.project, task = %details.task, "timer started");
        self.state = State::Running {
            session: TimerSession {
                details,
                started_at: now,
                accumulated: Duration::zero(),
            },
            stretch: Stretch::new(now),
        };
        Ok(())
    }

    /// Freezes accumulation.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now();
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Running {
                mut session,
                stretch,
            } => {
                session.accumulated += stretch.observe(now);
                debug!(
                    accumulated_secs = whole_seconds(session.accumulated),
                    "timer paused"
                );
                self.state = State::Paused { session };
                Ok(())
            }
            other => {
                let phase = other.phase();
                self.state = other;
                Err(invalid_state("pause", phase))
            }
        }
    }

    /// Continues a paused session.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now();
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Paused { session } => {
                debug!("timer resumed");
                self.state = State::Running {
                    session,
                    stretch: Stretch::new(now),
                };
                Ok(())
            }
            other => {
                let phase = other.phase();
                self.state = other;
                Err(invalid_state("resume", phase))
            }
        }
    }

    /// Ends the session and returns the completed entry.
    ///
    /// Returns `Ok(None)` when less than one whole second was tracked. The
    /// timer is back to idle either way.
    pub fn stop(&mut self) -> Result<Option<TimeEntry>, TimerError> {
        let now = self.clock.now();
        let session = match std::mem::replace(&mut self.state, State::Idle) {
            State::Running {
                mut session,
                stretch,
            } => {
                session.accumulated += stretch.observe(now);
                session
            }
            State::Paused { session } => session,
            State::Idle => return Err(invalid_state("stop", TimerPhase::Idle)),
        };

        let seconds = whole_seconds(session.accumulated);
        if seconds == 0 {
            debug!("timer stopped with nothing tracked");
            return Ok(None);
        }

        debug!(duration_secs = seconds, "timer stopped");
        Ok(Some(TimeEntry::completed(session.details, seconds, now)))
    }

    /// Discards the session without producing an entry.
    ///
    /// Returns true if a session was discarded.
    pub fn abandon(&mut self) -> bool {
        let discarded = !matches!(self.state, State::Idle);
        if discarded {
            debug!("timer session abandoned");
        }
        self.state = State::Idle;
        discarded
    }

    /// Whole seconds tracked so far, including the current running stretch.
    pub fn elapsed(&self) -> u64 {
        match &self.state {
            State::Idle => 0,
            State::Running { session, stretch } => {
                whole_seconds(session.accumulated + stretch.observe(self.clock.now()))
            }
            State::Paused { session } => whole_seconds(session.accumulated),
        }
    }

    /// [`elapsed`](Self::elapsed) as `HH:MM:SS`.
    pub fn elapsed_display(&self) -> String {
        format_duration(self.elapsed())
    }

    /// Builds a completed entry from a typed-in duration.
    ///
    /// Does not touch the running session, if any.
    pub fn save_manual(&self, draft: &EntryDraft, duration: &str) -> Result<TimeEntry, TimerError> {
        let details = draft.validate()?;
        let seconds = parse_duration(duration)?;
        debug!(duration_secs = seconds, "manual entry built");
        Ok(TimeEntry::completed(details, seconds, self.clock.now()))
    }
}

const fn invalid_state(operation: &'static str, state: TimerPhase) -> TimerError {
    TimerError::InvalidState { operation, state }
}

fn whole_seconds(duration: Duration) -> u64 {
    u64::try_from(duration.num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;
    use crate::types::EntryStatus;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
    }

    fn draft() -> EntryDraft {
        EntryDraft::new("Website Redesign", "Development")
    }

    fn running_timer() -> (Timer<ManualClock>, ManualClock) {
        let clock = clock();
        let mut timer = Timer::new(clock.clone());
        timer.start(&draft()).unwrap();
        (timer, clock)
    }

    #[test]
    fn start_then_elapsed_is_zero() {
        let (timer, _clock) = running_timer();
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.elapsed(), 0);
    }

    #[test]
    fn elapsed_counts_running_seconds() {
        let (timer, clock) = running_timer();
        clock.advance(125);
        assert_eq!(timer.elapsed(), 125);
        assert_eq!(timer.elapsed_display(), "00:02:05");
    }

    #[test]
    fn elapsed_is_zero_when_idle() {
        let timer = Timer::new(clock());
        assert_eq!(timer.elapsed(), 0);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn pause_resume_neither_loses_nor_double_counts() {
        let (mut timer, clock) = running_timer();
        clock.advance(40);
        timer.pause().unwrap();

        // Paused time is excluded.
        clock.advance(600);
        assert_eq!(timer.elapsed(), 40);

        timer.resume().unwrap();
        clock.advance(20);
        assert_eq!(timer.elapsed(), 60);
    }

    #[test]
    fn repeated_pause_cycles_accumulate() {
        let (mut timer, clock) = running_timer();
        for _ in 0..3 {
            clock.advance(10);
            timer.pause().unwrap();
            clock.advance(100);
            timer.resume().unwrap();
        }
        clock.advance(5);
        assert_eq!(timer.elapsed(), 35);
    }

    #[test]
    fn stop_emits_completed_entry_with_frozen_elapsed() {
        let (mut timer, clock) = running_timer();
        clock.advance(3600);
        let elapsed = timer.elapsed();

        let entry = timer.stop().unwrap().expect("entry emitted");

        assert_eq!(entry.duration_secs, elapsed);
        assert_eq!(entry.status, EntryStatus::Completed);
        assert_eq!(entry.project.as_str(), "Website Redesign");
        assert_eq!(entry.task.as_str(), "Development");
        assert!(entry.billable);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn stop_from_paused_uses_accumulated_time() {
        let (mut timer, clock) = running_timer();
        clock.advance(90);
        timer.pause().unwrap();
        clock.advance(1000);

        let entry = timer.stop().unwrap().unwrap();
        assert_eq!(entry.duration_secs, 90);
    }

    #[test]
    fn stop_with_nothing_tracked_emits_no_entry() {
        let (mut timer, _clock) = running_timer();
        assert_eq!(timer.stop().unwrap(), None);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn start_while_running_is_rejected() {
        let (mut timer, clock) = running_timer();
        clock.advance(30);

        let err = timer.start(&draft()).unwrap_err();

        assert_eq!(
            err,
            TimerError::InvalidState {
                operation: "start",
                state: TimerPhase::Running
            }
        );
        assert_eq!(timer.elapsed(), 30);
    }

    #[test]
    fn start_while_paused_is_rejected() {
        let (mut timer, _clock) = running_timer();
        timer.pause().unwrap();
        assert!(matches!(
            timer.start(&draft()),
            Err(TimerError::InvalidState {
                state: TimerPhase::Paused,
                ..
            })
        ));
        assert_eq!(timer.phase(), TimerPhase::Paused);
    }

    #[test]
    fn transitions_from_idle_are_rejected() {
        let mut timer = Timer::new(clock());
        assert!(matches!(
            timer.pause(),
            Err(TimerError::InvalidState {
                operation: "pause",
                state: TimerPhase::Idle
            })
        ));
        assert!(matches!(
            timer.resume(),
            Err(TimerError::InvalidState {
                operation: "resume",
                ..
            })
        ));
        assert!(matches!(
            timer.stop(),
            Err(TimerError::InvalidState {
                operation: "stop",
                ..
            })
        ));
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn resume_while_running_and_double_pause_are_rejected() {
        let (mut timer, _clock) = running_timer();
        assert!(timer.resume().is_err());
        assert_eq!(timer.phase(), TimerPhase::Running);

        timer.pause().unwrap();
        assert!(timer.pause().is_err());
        assert_eq!(timer.phase(), TimerPhase::Paused);
    }

    #[test]
    fn start_requires_project_and_task() {
        let mut timer = Timer::new(clock());
        assert_eq!(
            timer.start(&EntryDraft::new("", "Design")),
            Err(TimerError::Validation(ValidationError::Empty {
                field: "project"
            }))
        );
        assert_eq!(
            timer.start(&EntryDraft::new("Mobile App", "")),
            Err(TimerError::Validation(ValidationError::Empty { field: "task" }))
        );
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn abandon_discards_without_entry() {
        let (mut timer, clock) = running_timer();
        clock.advance(300);

        assert!(timer.abandon());
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.elapsed(), 0);
        assert!(!timer.abandon());
    }

    #[test]
    fn backwards_clock_never_goes_negative() {
        let (timer, clock) = running_timer();
        clock.advance(-30);
        assert_eq!(timer.elapsed(), 0);
    }

    #[test]
    fn backwards_clock_keeps_seconds_already_shown() {
        let (mut timer, clock) = running_timer();
        clock.advance(30);
        assert_eq!(timer.elapsed(), 30);

        clock.advance(-10);
        assert_eq!(timer.elapsed(), 30);

        // Counting resumes once the clock passes the furthest point seen.
        clock.advance(15);
        assert_eq!(timer.elapsed(), 35);

        clock.advance(-20);
        let entry = timer.stop().unwrap().unwrap();
        assert_eq!(entry.duration_secs, 35);
    }

    #[test]
    fn backwards_clock_before_pause_keeps_shown_seconds() {
        let (mut timer, clock) = running_timer();
        clock.advance(45);
        assert_eq!(timer.elapsed(), 45);
        clock.advance(-45);

        timer.pause().unwrap();
        assert_eq!(timer.elapsed(), 45);

        timer.resume().unwrap();
        clock.advance(5);
        assert_eq!(timer.elapsed(), 50);
    }

    #[test]
    fn session_exposes_copied_fields() {
        let clock = clock();
        let mut timer = Timer::new(clock.clone());
        timer
            .start(&draft().billable(false).description("Navbar"))
            .unwrap();

        let session = timer.session().unwrap();
        assert_eq!(session.started_at(), clock.now());
        assert!(!session.details().billable);
        assert_eq!(session.details().description.as_deref(), Some("Navbar"));
    }

    // ========== Manual Entry Tests ==========

    #[test]
    fn save_manual_parses_duration() {
        let timer = Timer::new(clock());
        let entry = timer.save_manual(&draft(), "2:30:00").unwrap();
        assert_eq!(entry.duration_secs, 9000);
        assert_eq!(entry.status, EntryStatus::Completed);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn save_manual_rejects_bad_durations() {
        let timer = Timer::new(clock());
        assert!(matches!(
            timer.save_manual(&draft(), "abc"),
            Err(TimerError::Validation(ValidationError::InvalidDuration { .. }))
        ));
        assert!(matches!(
            timer.save_manual(&draft(), ""),
            Err(TimerError::Validation(ValidationError::Empty {
                field: "duration"
            }))
        ));
    }

    #[test]
    fn save_manual_requires_project_and_task() {
        let timer = Timer::new(clock());
        assert!(matches!(
            timer.save_manual(&EntryDraft::new("", "Design"), "1:00:00"),
            Err(TimerError::Validation(ValidationError::Empty {
                field: "project"
            }))
        ));
    }

    #[test]
    fn save_manual_leaves_running_session_alone() {
        let (timer, clock) = running_timer();
        clock.advance(50);

        timer.save_manual(&draft(), "0:10:00").unwrap();

        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.elapsed(), 50);
    }

    #[test]
    fn error_messages_are_readable() {
        let err = TimerError::InvalidState {
            operation: "pause",
            state: TimerPhase::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause while the timer is idle");
    }
}
