//! piisync core library: domain types, compiled-in configuration, errors.
//!
//! - [`types`]: pattern newtypes and records
//! - [`config`]: [`SyncConfig`] and on-disk path helpers
//! - [`error`]: [`CoreError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ReconcileOptions, SyncConfig};
pub use error::CoreError;
pub use types::{PatternName, PatternRecord, StoredPattern};
