use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ts_api::ApiClient;
use ts_cli::commands::{add, delete, edit, list, summary, track, util};
use ts_cli::{Cli, Commands, Config};
use ts_core::{EntryFilter, SystemClock, Tracker};

/// Load config and connect a tracker to the configured backend.
///
/// `target` overrides the configured weekly target. The target is checked
/// by `summary`, the only command that reads it.
fn open_tracker(config_path: Option<&Path>, target: Option<f64>) -> Result<Tracker<ApiClient>> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let client = ApiClient::with_timeout(&config.api_url, config.timeout())
        .context("failed to create API client")?;
    Ok(Tracker::new(client, SystemClock)
        .with_weekly_target(target.unwrap_or(config.weekly_target_hours)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let target = match &command {
        Commands::Summary { target, .. } => *target,
        _ => None,
    };
    let mut tracker = open_tracker(cli.config.as_deref(), target)?;
    let mut stdout = std::io::stdout();

    match command {
        Commands::Track { entry } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            track::run(stdin, &mut stdout, &mut tracker, &entry.draft(), track::TICK).await?;
        }
        Commands::Add { entry, duration } => {
            add::run(&mut stdout, &mut tracker, &entry.draft(), &duration).await?;
        }
        Commands::List {
            project,
            billable,
            non_billable,
            status,
            since,
            until,
            json,
        } => {
            let now = Utc::now();
            let filter = EntryFilter {
                project,
                billable: (billable || non_billable).then_some(billable),
                status,
                since: since
                    .as_deref()
                    .map(|s| util::parse_datetime(s, now))
                    .transpose()?,
                until: until
                    .as_deref()
                    .map(|s| util::parse_datetime(s, now))
                    .transpose()?,
            };
            list::run(&mut stdout, &mut tracker, &filter, json).await?;
        }
        Commands::Edit {
            id,
            project,
            task,
            duration,
            status,
            billable,
            description,
            timeframe,
        } => {
            let args = edit::EditArgs {
                project,
                task,
                duration,
                status,
                billable,
                description,
                timeframe,
            };
            edit::run(&mut stdout, &mut tracker, &id, args).await?;
        }
        Commands::Delete { id } => {
            delete::run(&mut stdout, &mut tracker, &id).await?;
        }
        Commands::Summary {
            week: _,
            last_week,
            day,
            last_day,
            all,
            target: _,
            json,
        } => {
            let period = if all {
                summary::Period::All
            } else if last_week {
                summary::Period::LastWeek
            } else if day {
                summary::Period::Day
            } else if last_day {
                summary::Period::LastDay
            } else {
                summary::Period::Week
            };
            let today = Local::now().date_naive();
            summary::run(&mut stdout, &mut tracker, period, today, json).await?;
        }
    }

    Ok(())
}
