use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use pgrepo_config::ConfigFile;
use tokio_util::sync::CancellationToken;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct InspectCommand {
    /// Path to pgrepo.toml (defaults to ./pgrepo.toml)
    #[arg(short, long, default_value = "pgrepo.toml")]
    pub config: PathBuf,

    /// Print the generation plan instead of the raw snapshot
    #[arg(long)]
    pub plan: bool,
}

impl InspectCommand {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let file = ConfigFile::open(&self.config).unwrap_or_exit();
        let catalog = ops::connect(file.config()).await?;

        let target = if self.plan {
            ops::inspect::Target::Plan
        } else {
            ops::inspect::Target::Snapshot
        };
        let report = ops::inspect(&catalog, &file, target, cancel).await?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
