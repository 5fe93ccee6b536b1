use std::path::PathBuf;

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Error surface for the scheduler runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] piisync_core::CoreError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    #[error("signal handler failed: {0}")]
    Signal(#[source] std::io::Error),

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
