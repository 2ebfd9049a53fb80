//! Steps shared by every command: connect, gather, compile.

use eyre::{Result, WrapErr};
use pgrepo_catalog::{CatalogSource, LoadOptions, PgCatalog, TableSelection, load_snapshot};
use pgrepo_codegen::pipeline::{CompilationContext, Pipeline, TracingPlugin};
use pgrepo_codegen_rust::rust_profile;
use pgrepo_config::{Config, ConfigFile};
use pgrepo_ir::CatalogSnapshot;
use tokio_util::sync::CancellationToken;

/// Open the catalog connection described by `[database]`.
pub async fn connect(config: &Config) -> Result<PgCatalog> {
    let url = config.database.resolve_url()?;
    let catalog = PgCatalog::connect(&url, config.database.connect_timeout())
        .await
        .wrap_err("Failed to connect to the database")?;
    Ok(catalog)
}

/// Introspect the configured schema and describe every annotated query.
pub async fn gather(
    source: &dyn CatalogSource,
    file: &ConfigFile,
    cancel: &CancellationToken,
) -> Result<CatalogSnapshot> {
    let config = file.config();
    let queries_dir = config.queries.dir.as_deref().map(|dir| file.resolve(dir));

    let options = LoadOptions {
        schema: &config.database.schema,
        selection: TableSelection::new(&config.tables.include, &config.tables.exclude),
        queries_dir: queries_dir.as_deref(),
    };

    load_snapshot(source, &options, cancel)
        .await
        .wrap_err("Failed to gather catalog metadata")
}

/// Run the pipeline for Rust output.
pub fn compile(snapshot: CatalogSnapshot) -> Result<CompilationContext<'static>> {
    Pipeline::new()
        .plugin(TracingPlugin::default())
        .run(snapshot, rust_profile())
        .wrap_err("Pipeline failed")
}

/// A token that is cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, aborting");
            token.cancel();
        }
    });
    cancel
}
