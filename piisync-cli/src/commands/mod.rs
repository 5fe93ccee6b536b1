pub mod config;
#[cfg(feature = "dev-tools")]
pub mod once;
pub mod run;

use piisync_core::SyncConfig;

/// Compiled-in configuration with the command-line reconciler switch applied.
pub(crate) fn sync_config(full_diff: bool) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.reconcile.full_diff = full_diff;
    config
}
