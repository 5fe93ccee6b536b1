//! Error types for piisync-core.

use thiserror::Error;

/// Errors raised while building or rendering the job configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The cron expression does not have five, six or seven whitespace-separated fields.
    #[error("invalid schedule '{expr}': {reason}")]
    InvalidSchedule { expr: String, reason: String },

    /// `dirs::home_dir()` returned `None`, so `~/.piisync/` cannot be located.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// YAML serialization error while rendering the configuration.
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
