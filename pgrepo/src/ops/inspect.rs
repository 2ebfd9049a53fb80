//! Inspect operation - dump gathered metadata as JSON.

use eyre::{Context, Result};
use pgrepo_catalog::CatalogSource;
use pgrepo_config::ConfigFile;
use tokio_util::sync::CancellationToken;

use super::{compile, gather};
use crate::reports::InspectReport;

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The catalog snapshot as gathered.
    Snapshot,
    /// The plan the renderer would receive.
    Plan,
}

/// Execute the inspect operation.
pub async fn inspect(
    source: &dyn CatalogSource,
    file: &ConfigFile,
    target: Target,
    cancel: &CancellationToken,
) -> Result<InspectReport> {
    let snapshot = gather(source, file, cancel).await?;

    let json = match target {
        Target::Snapshot => serde_json::to_string_pretty(&snapshot),
        Target::Plan => {
            let plan = compile(snapshot)?.take_plan()?;
            serde_json::to_string_pretty(&plan)
        }
    }
    .wrap_err("Failed to serialize")?;

    Ok(InspectReport { json })
}
