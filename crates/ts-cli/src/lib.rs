//! Timesheet tracker CLI library.
//!
//! This crate provides the CLI interface for the timesheet tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EntryArgs};
pub use config::Config;
