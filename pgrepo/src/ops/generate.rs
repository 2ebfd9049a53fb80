//! Generate operation - introspect, compile and render the package.

use std::path::Path;

use eyre::{Context, Result};
use pgrepo_catalog::CatalogSource;
use pgrepo_codegen::language::LanguageCodegen;
use pgrepo_codegen_rust::{Generator, RetryDefaults};
use pgrepo_config::ConfigFile;
use tokio_util::sync::CancellationToken;

use super::{compile, gather};
use crate::reports::{
    GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult,
};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Overrides `[output].dir`.
    pub output_dir: Option<&'a Path>,
    /// Whether to preview without writing files.
    pub dry_run: bool,
}

/// Execute the generate operation.
///
/// Nothing is written when the pipeline reports an error or two units
/// resolve to the same file.
pub async fn generate(
    source: &dyn CatalogSource,
    file: &ConfigFile,
    opts: GenerateOptions<'_>,
    cancel: &CancellationToken,
) -> Result<GenerateReport> {
    let config = file.config();
    let snapshot = gather(source, file, cancel).await?;
    let mut ctx = compile(snapshot)?;

    let warnings: Vec<String> = ctx
        .warnings()
        .map(|d| match &d.location {
            Some(loc) => format!("{} ({})", d.message, loc),
            None => d.message.clone(),
        })
        .collect();

    let plan = ctx.take_plan()?;
    let planned_queries: usize = plan.query_sets.iter().map(|set| set.queries.len()).sum();
    let skipped = (ctx.snapshot.tables.len() - plan.entities.len())
        + ctx.snapshot.skipped.len()
        + (ctx.snapshot.query_count() - planned_queries);

    let retry = RetryDefaults {
        max_attempts: config.retry.max_attempts,
        base_delay_ms: config.retry.base_delay_ms,
        max_delay_ms: config.retry.max_delay_ms,
    };
    let generator = Generator::new(&plan)
        .with_package(&config.output.package)
        .with_retry(retry);

    let result = if opts.dry_run {
        let files = generator
            .preview()
            .into_iter()
            .map(|f| PreviewFile {
                path: f.path().display().to_string(),
                content: f.content().to_string(),
            })
            .collect();
        GenerationResult::Preview(PreviewResult { files })
    } else {
        let output_dir = match opts.output_dir {
            Some(dir) => dir.to_path_buf(),
            None => file.resolve(&config.output.dir),
        };
        let gen_result = generator
            .generate(&output_dir)
            .wrap_err("Failed to generate code")?;
        tracing::info!(
            written = gen_result.written.len(),
            unchanged = gen_result.unchanged.len(),
            dir = %output_dir.display(),
            "generated package"
        );

        GenerationResult::Written(WrittenResult {
            output_dir,
            written: gen_result.written,
            unchanged: gen_result.unchanged,
        })
    };

    Ok(GenerateReport {
        package: config.output.package.clone(),
        warnings,
        entities: plan.entities.iter().map(|e| e.entity.clone()).collect(),
        query_count: planned_queries,
        skipped,
        result,
    })
}
