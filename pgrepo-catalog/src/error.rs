use std::path::PathBuf;

/// Errors raised while gathering catalog metadata.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot connect to database")]
    Connection(#[source] sqlx::Error),

    #[error("schema '{schema}' has no matching tables")]
    SchemaNotFound { schema: String },

    #[error("{}:{line}: {message}", .path.display())]
    QuerySyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "{}:{line}: unsupported query mode ':{mode}' (expected :one, :many, :exec or :paginated)",
        .path.display()
    )]
    UnsupportedMode {
        path: PathBuf,
        line: usize,
        mode: String,
    },

    #[error("query '{name}' was rejected by the server: {message}")]
    QueryPrepare { name: String, message: String },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog query failed")]
    Database(#[from] sqlx::Error),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
