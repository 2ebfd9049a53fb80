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
pub struct CheckCommand {
    /// Path to pgrepo.toml (defaults to ./pgrepo.toml)
    #[arg(short, long, default_value = "pgrepo.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let file = ConfigFile::open(&self.config).unwrap_or_exit();
        let catalog = ops::connect(file.config()).await?;

        let report = ops::check(&catalog, &file, cancel).await?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
