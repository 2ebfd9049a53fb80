mod check;
mod generate;
mod inspect;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use eyre::Result;
use generate::GenerateCommand;
use inspect::InspectCommand;
use tokio_util::sync::CancellationToken;

/// Extension trait for exiting on config errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for pgrepo_config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "pgrepo")]
#[command(version)]
#[command(about = "Generate sqlx repositories from a PostgreSQL schema and annotated SQL")]
pub(crate) struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(cancel).await,
            Commands::Check(cmd) => cmd.run(cancel).await,
            Commands::Inspect(cmd) => cmd.run(cancel).await,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect the database and write the repository package
    Generate(GenerateCommand),

    /// Run the whole pipeline and report diagnostics without writing
    Check(CheckCommand),

    /// Print the gathered catalog snapshot (or generation plan) as JSON
    Inspect(InspectCommand),
}
