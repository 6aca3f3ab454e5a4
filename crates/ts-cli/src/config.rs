//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use ts_core::DEFAULT_WEEKLY_TARGET_HOURS;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the timesheet backend, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    /// Hours that count as a full week on the dashboard.
    pub weekly_target_hours: f64,
    /// Per-request timeout for backend calls.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: ts_api::DEFAULT_BASE_URL.to_string(),
            weekly_target_hours: DEFAULT_WEEKLY_TARGET_HOURS,
            timeout_secs: ts_api::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let user_config = dirs_config_path().map(|dir| dir.join("config.toml"));
        figment(user_config.as_deref(), config_path).extract()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Layers defaults, the user config file, an explicit file, and `TS_*`
/// environment variables, later layers winning.
fn figment(user_config: Option<&Path>, config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(path) = user_config {
        figment = figment.merge(Toml::file(path));
    }

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed("TS_"))
}

/// Returns the platform-specific config directory for ts.
///
/// On Linux: `~/.config/ts`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ts"))
}
