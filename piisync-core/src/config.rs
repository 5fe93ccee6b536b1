//! Compiled-in job configuration.
//!
//! The job syncs exactly one file into exactly one table on a fixed schedule,
//! so every knob lives here as a constant. [`SyncConfig::default`] is the only
//! constructor the binary uses; tests build variants by struct update.
//!
//! # Storage layout
//!
//! ```text
//! ~/.piisync/
//!   patterns.db   (SQLite, table `pii_patterns`)
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const REPO_OWNER: &str = "Anish-Shobith";
pub const REPO_NAME: &str = "public-testing";
pub const FILE_PATH: &str = "pattern.json";

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const USER_AGENT: &str = concat!("piisync/", env!("CARGO_PKG_VERSION"));

/// Every minute.
pub const SCHEDULE: &str = "*/1 * * * *";

pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const HTTP_READ_TIMEOUT_SECS: u64 = 20;
pub const STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const ROOT_DIR: &str = ".piisync";
pub const DATABASE_FILE: &str = "patterns.db";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Where the pattern file lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl SourceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            owner: REPO_OWNER.to_string(),
            repo: REPO_NAME.to_string(),
            path: FILE_PATH.to_string(),
            user_agent: USER_AGENT.to_string(),
            connect_timeout_secs: HTTP_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: HTTP_READ_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: STORE_BUSY_TIMEOUT_MS,
        }
    }
}

/// Change-detection mode for the reconciler.
///
/// With `full_diff = false` (the default) a cycle only writes when the number
/// of patterns changed or a pattern was removed. A same-count, payload-only
/// edit is not picked up in that mode. `full_diff = true` also compares
/// payloads of retained patterns and rewrites only the ones that differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    pub full_diff: bool,
}

/// The complete job configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub schedule: String,
    pub reconcile: ReconcileOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            store: StoreConfig::default(),
            schedule: SCHEDULE.to_string(),
            reconcile: ReconcileOptions::default(),
        }
    }
}

impl SyncConfig {
    /// The schedule in the seconds-first form the scheduler accepts.
    pub fn scheduler_expression(&self) -> Result<String, CoreError> {
        normalize_schedule(&self.schedule)
    }

    /// Render the configuration for `piisync config`.
    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Convert a cron expression to six-field (seconds-first) form.
///
/// Five-field expressions fire at second zero. Six- and seven-field
/// expressions are passed through with whitespace collapsed.
pub fn normalize_schedule(expr: &str) -> Result<String, CoreError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => Err(CoreError::InvalidSchedule {
            expr: expr.to_string(),
            reason: format!("expected 5, 6 or 7 fields, found {n}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.piisync/`. Pure, no I/O.
pub fn root_dir_at(home: &Path) -> PathBuf {
    home.join(ROOT_DIR)
}

/// `<home>/.piisync/patterns.db`. Pure, no I/O.
pub fn database_path_at(home: &Path) -> PathBuf {
    root_dir_at(home).join(DATABASE_FILE)
}

/// `database_path_at` convenience wrapper using `dirs::home_dir()`.
pub fn database_path() -> Result<PathBuf, CoreError> {
    let home = dirs::home_dir().ok_or(CoreError::HomeNotFound)?;
    Ok(database_path_at(&home))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_pattern_file() {
        let config = SyncConfig::default();
        assert_eq!(config.source.owner, "Anish-Shobith");
        assert_eq!(config.source.repo, "public-testing");
        assert_eq!(config.source.path, "pattern.json");
        assert_eq!(config.schedule, "*/1 * * * *");
        assert!(!config.reconcile.full_diff);
    }

    #[test]
    fn default_schedule_normalizes_to_second_zero() {
        let expr = SyncConfig::default()
            .scheduler_expression()
            .expect("valid schedule");
        assert_eq!(expr, "0 */1 * * * *");
    }

    #[test]
    fn database_path_is_under_root_dir() {
        let home = Path::new("/home/test");
        assert_eq!(
            database_path_at(home),
            PathBuf::from("/home/test/.piisync/patterns.db")
        );
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let config = SyncConfig::default();
        assert_eq!(config.source.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.source.read_timeout(), Duration::from_secs(20));
        assert_eq!(config.store.busy_timeout(), Duration::from_millis(5_000));
    }
}
