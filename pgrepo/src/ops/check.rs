//! Check operation - run everything except the final write.

use eyre::Result;
use pgrepo_catalog::CatalogSource;
use pgrepo_codegen::{language::LanguageCodegen, pipeline::Severity};
use pgrepo_codegen_rust::Generator;
use pgrepo_config::ConfigFile;
use tokio_util::sync::CancellationToken;

use super::{compile, gather};
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Gathers and compiles like `generate`, renders in memory, and returns
/// the diagnostics together with the files a real run would produce.
pub async fn check(
    source: &dyn CatalogSource,
    file: &ConfigFile,
    cancel: &CancellationToken,
) -> Result<CheckReport> {
    let snapshot = gather(source, file, cancel).await?;
    let mut ctx = compile(snapshot)?;

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    for diag in &ctx.diagnostics {
        let msg = if let Some(loc) = &diag.location {
            format!("{}\n  --> {}", diag.message, loc)
        } else {
            diag.message.clone()
        };

        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    let plan = ctx.take_plan()?;
    let files = Generator::new(&plan)
        .with_package(&file.config().output.package)
        .preview()
        .into_iter()
        .map(|f| f.path().display().to_string())
        .collect();

    Ok(CheckReport {
        config_path: file.path().to_path_buf(),
        errors,
        warnings,
        infos,
        files,
    })
}
