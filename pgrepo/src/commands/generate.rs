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
pub struct GenerateCommand {
    /// Path to pgrepo.toml (defaults to ./pgrepo.toml)
    #[arg(short, long, default_value = "pgrepo.toml")]
    pub config: PathBuf,

    /// Output directory (overrides [output].dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let file = ConfigFile::open(&self.config).unwrap_or_exit();
        let catalog = ops::connect(file.config()).await?;

        let report = ops::generate(
            &catalog,
            &file,
            ops::generate::GenerateOptions {
                output_dir: self.output.as_deref(),
                dry_run: self.dry_run,
            },
            cancel,
        )
        .await?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
