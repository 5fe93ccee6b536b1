//! `piisync config`: print the effective configuration.

use anyhow::{Context, Result};
use clap::Args;

use piisync_core::config::database_path;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show the configuration as `run --full-diff` would use it.
    #[arg(long)]
    pub full_diff: bool,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let config = super::sync_config(self.full_diff);
        let yaml = config.to_yaml().context("failed to render configuration")?;
        print!("{yaml}");

        let database = database_path().context("could not determine database path")?;
        println!("# database: {}", database.display());
        Ok(())
    }
}
