//! `piisync run`: scheduler in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use piisync_daemon::start_blocking;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Also rewrite patterns whose fields changed while the count stayed the same.
    #[arg(long)]
    pub full_diff: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = super::sync_config(self.full_diff);
        config
            .scheduler_expression()
            .context("compiled-in schedule is invalid")?;
        start_blocking(&config, &home).context("scheduler exited with error")
    }
}
