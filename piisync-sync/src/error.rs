//! Error types for piisync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use piisync_source::SourceError;

/// The store operation a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindMany,
    DeleteMany,
    UpdateMany,
    Create,
    Begin,
    Commit,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::FindMany => "findMany",
            StoreOp::DeleteMany => "deleteMany",
            StoreOp::UpdateMany => "updateMany",
            StoreOp::Create => "create",
            StoreOp::Begin => "begin",
            StoreOp::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// A persistent-store call failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O failure preparing the database location.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A store operation failed while reconciling; later operations were not issued.
#[derive(Debug, Error)]
#[error("{op} failed: {source}")]
pub struct ReconcileError {
    pub op: StoreOp,
    #[source]
    pub source: StoreError,
}

impl ReconcileError {
    pub(crate) fn at(op: StoreOp) -> impl FnOnce(StoreError) -> ReconcileError {
        move |source| ReconcileError { op, source }
    }
}

/// Anything that ends a sync cycle early.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}

impl CycleError {
    /// Short failure class for log fields: `retrieval`, `decode` or `reconcile`.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Source(SourceError::Retrieval(_)) => "retrieval",
            CycleError::Source(SourceError::Decode(_)) => "decode",
            CycleError::Reconcile(_) => "reconcile",
        }
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
