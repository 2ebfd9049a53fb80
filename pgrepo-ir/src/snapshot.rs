//! The gathered metadata for a single generation run.

use serde::Serialize;

use crate::{QueryFile, Table};

/// What kind of unit was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Table,
    Query,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Table => write!(f, "table"),
            UnitKind::Query => write!(f, "query"),
        }
    }
}

/// A unit left out of generation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUnit {
    pub kind: UnitKind,
    pub name: String,
    pub reason: String,
}

impl SkippedUnit {
    pub fn query(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Query,
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn table(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Table,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Everything read from the database and the SQL files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSnapshot {
    pub schema: String,
    /// Tables sorted by name.
    pub tables: Vec<Table>,
    /// Query files sorted by name.
    pub query_files: Vec<QueryFile>,
    /// Units dropped while gathering (e.g. queries the server refused to prepare).
    pub skipped: Vec<SkippedUnit>,
}

impl CatalogSnapshot {
    /// Total number of described queries across all files.
    pub fn query_count(&self) -> usize {
        self.query_files.iter().map(|f| f.queries.len()).sum()
    }
}
