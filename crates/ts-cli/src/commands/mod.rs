//! CLI subcommand implementations.

pub mod add;
pub mod delete;
pub mod edit;
pub mod list;
pub mod summary;
pub mod track;
pub mod util;
