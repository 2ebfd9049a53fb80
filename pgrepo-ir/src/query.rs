//! Annotated query metadata.

use std::str::FromStr;

use serde::Serialize;

use crate::is_uuid_type;

/// Result cardinality declared by a `-- name: X :mode` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Exactly one row.
    One,
    /// Zero or more rows.
    Many,
    /// No rows; reports affected row count.
    Exec,
    /// Cursor-paginated rows.
    Paginated,
}

impl QueryMode {
    pub const ALL: [QueryMode; 4] = [
        QueryMode::One,
        QueryMode::Many,
        QueryMode::Exec,
        QueryMode::Paginated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::One => "one",
            QueryMode::Many => "many",
            QueryMode::Exec => "exec",
            QueryMode::Paginated => "paginated",
        }
    }

    /// Whether queries of this mode produce rows.
    pub fn returns_rows(&self) -> bool {
        !matches!(self, QueryMode::Exec)
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised mode token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl std::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported query mode ':{}'", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for QueryMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

/// A positional parameter (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// 1-based placeholder index.
    pub position: usize,
    /// Element type name reported by the server.
    pub db_type: String,
    pub is_array: bool,
}

/// A column of a query's result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultColumn {
    pub name: String,
    pub db_type: String,
    pub is_array: bool,
    /// Unknown nullability is reported as nullable.
    pub nullable: bool,
}

/// A fully described annotated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Identifier from the annotation (e.g. `GetUserByEmail`).
    pub name: String,
    pub mode: QueryMode,
    /// Trimmed SQL body.
    pub sql: String,
    /// Parameters ordered by position.
    pub params: Vec<Parameter>,
    /// Result columns in select-list order. Empty for `exec`.
    pub columns: Vec<ResultColumn>,
    /// 1-based line of the annotation in its file.
    pub line: usize,
}

impl Query {
    /// Index of the column used as the pagination key: the first non-null UUID.
    pub fn pagination_key(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| !c.nullable && !c.is_array && is_uuid_type(&c.db_type))
    }
}

/// All queries declared in one `.sql` file, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFile {
    /// File stem (e.g. `users` for `queries/users.sql`).
    pub name: String,
    /// Path as given to the parser.
    pub path: String,
    pub queries: Vec<Query>,
}
