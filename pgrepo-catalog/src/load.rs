//! Gathering a complete [`CatalogSnapshot`] for one generation run.

use std::path::{Path, PathBuf};

use pgrepo_ir::{CatalogSnapshot, Query, QueryFile, SkippedUnit};
use tokio_util::sync::CancellationToken;

use crate::{
    CatalogError, Result,
    annotation::{AnnotatedQuery, parse_annotations},
    source::{CatalogSource, TableSelection},
};

/// What to gather.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions<'a> {
    pub schema: &'a str,
    pub selection: TableSelection<'a>,
    /// Directory of `*.sql` files; `None` means table-based generation only.
    pub queries_dir: Option<&'a Path>,
}

/// Introspect tables and describe every annotated query.
///
/// Queries the server refuses to prepare, or whose shape contradicts their
/// mode, are recorded in [`CatalogSnapshot::skipped`]. Everything else that
/// goes wrong aborts the load. Cancelling `cancel` aborts with
/// [`CatalogError::Cancelled`].
pub async fn load_snapshot(
    source: &dyn CatalogSource,
    options: &LoadOptions<'_>,
    cancel: &CancellationToken,
) -> Result<CatalogSnapshot> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = gather(source, options) => result,
    }
}

async fn gather(source: &dyn CatalogSource, options: &LoadOptions<'_>) -> Result<CatalogSnapshot> {
    let mut tables = source.list_tables(options.schema, options.selection).await?;
    if tables.is_empty() {
        return Err(CatalogError::SchemaNotFound {
            schema: options.schema.to_string(),
        });
    }
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::info!(schema = options.schema, tables = tables.len(), "introspected schema");

    let mut snapshot = CatalogSnapshot {
        schema: options.schema.to_string(),
        tables,
        ..Default::default()
    };

    let Some(dir) = options.queries_dir else {
        return Ok(snapshot);
    };

    for path in query_files(dir)? {
        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let annotated = parse_annotations(&path, &text)?;
        tracing::debug!(path = %path.display(), queries = annotated.len(), "parsed query file");

        let mut queries = Vec::with_capacity(annotated.len());
        for query in annotated {
            let name = query.name.clone();
            match describe_query(source, query).await? {
                Ok(query) => queries.push(query),
                Err(reason) => {
                    tracing::warn!(query = %name, %reason, "skipping query");
                    snapshot.skipped.push(SkippedUnit::query(name, reason));
                }
            }
        }

        snapshot.query_files.push(QueryFile {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.display().to_string(),
            queries,
        });
    }

    Ok(snapshot)
}

/// `*.sql` files directly under `dir`, sorted by path.
fn query_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Describe one query. The inner `Err` is a per-query skip reason.
async fn describe_query(
    source: &dyn CatalogSource,
    annotated: AnnotatedQuery,
) -> Result<std::result::Result<Query, String>> {
    let shape = match source.describe(&annotated.name, &annotated.sql).await {
        Ok(shape) => shape,
        Err(CatalogError::QueryPrepare { message, .. }) => return Ok(Err(message)),
        Err(err) => return Err(err),
    };

    if shape.params.len() != annotated.param_count {
        return Ok(Err(format!(
            "server reported {} parameters but the query uses {} placeholders",
            shape.params.len(),
            annotated.param_count
        )));
    }

    let mut columns = shape.columns;
    if annotated.mode.returns_rows() {
        if columns.is_empty() {
            return Ok(Err(format!(
                ":{} query returns no columns",
                annotated.mode
            )));
        }
    } else if !columns.is_empty() {
        tracing::info!(
            query = %annotated.name,
            columns = columns.len(),
            "ignoring result columns of :exec query"
        );
        columns.clear();
    }

    Ok(Ok(Query {
        name: annotated.name,
        mode: annotated.mode,
        sql: annotated.sql,
        params: shape.params,
        columns,
        line: annotated.line,
    }))
}
