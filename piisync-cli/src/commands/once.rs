//! `piisync once`: one cycle, no scheduler.

use anyhow::{Context, Result};
use clap::Args;

use piisync_core::config::database_path;
use piisync_daemon::init_tracing;
use piisync_source::GithubContentSource;
use piisync_sync::{pipeline, SqlitePatternStore};

#[derive(Args, Debug)]
pub struct OnceArgs {
    /// Also rewrite patterns whose fields changed while the count stayed the same.
    #[arg(long)]
    pub full_diff: bool,
}

impl OnceArgs {
    pub fn run(self) -> Result<()> {
        init_tracing();
        let config = super::sync_config(self.full_diff);
        let source = GithubContentSource::new(&config.source);
        let mut store = SqlitePatternStore::new(
            database_path().context("could not determine database path")?,
            config.store.busy_timeout(),
        );

        let report = pipeline::run_cycle(&source, &mut store, config.reconcile)
            .with_context(|| format!("sync cycle against {} failed", source.url()))?;

        if report.changed {
            println!(
                "updated {}: {} deleted, {} created, {} updated",
                store.path().display(),
                report.deleted,
                report.created,
                report.updated
            );
        } else {
            println!("no changes detected; {} not updated", store.path().display());
        }
        Ok(())
    }
}
