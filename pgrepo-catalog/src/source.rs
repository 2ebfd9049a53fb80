//! The seam between metadata gathering and the database.

use async_trait::async_trait;
use pgrepo_ir::{Parameter, ResultColumn, Table};

use crate::Result;

/// Include/exclude lists applied to base table names.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSelection<'a> {
    /// Empty means every base table.
    pub include: &'a [String],
    pub exclude: &'a [String],
}

impl<'a> TableSelection<'a> {
    pub fn new(include: &'a [String], exclude: &'a [String]) -> Self {
        Self { include, exclude }
    }

    pub fn matches(&self, table: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|t| t == table);
        included && !self.exclude.iter().any(|t| t == table)
    }
}

/// Parameter and result shapes of a statement, as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementShape {
    pub params: Vec<Parameter>,
    pub columns: Vec<ResultColumn>,
}

/// Read-only access to catalog metadata.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Base tables of `schema` passing `selection`, sorted by name, with
    /// columns in ordinal order.
    async fn list_tables(&self, schema: &str, selection: TableSelection<'_>) -> Result<Vec<Table>>;

    /// Ask the server for the shape of `sql` without executing it.
    ///
    /// A statement the server rejects fails with
    /// [`CatalogError::QueryPrepare`](crate::CatalogError::QueryPrepare) naming `name`.
    async fn describe(&self, name: &str, sql: &str) -> Result<StatementShape>;
}

/// Split a type name into its element name and array flag.
///
/// Accepts both catalog spellings (`_int4`) and driver spellings (`INT4[]`);
/// the element name is lowercased.
pub fn split_type_name(raw: &str) -> (String, bool) {
    let raw = raw.trim();
    if let Some(element) = raw.strip_suffix("[]") {
        return (element.to_ascii_lowercase(), true);
    }
    if let Some(element) = raw.strip_prefix('_') {
        return (element.to_ascii_lowercase(), true);
    }
    (raw.to_ascii_lowercase(), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_name() {
        assert_eq!(split_type_name("int4"), ("int4".to_string(), false));
        assert_eq!(split_type_name("_text"), ("text".to_string(), true));
        assert_eq!(split_type_name("TEXT[]"), ("text".to_string(), true));
        assert_eq!(split_type_name("TIMESTAMPTZ"), ("timestamptz".to_string(), false));
    }

    #[test]
    fn test_selection() {
        let include = vec!["users".to_string(), "posts".to_string()];
        let exclude = vec!["posts".to_string()];

        let selection = TableSelection::new(&include, &exclude);
        assert!(selection.matches("users"));
        assert!(!selection.matches("posts"));
        assert!(!selection.matches("comments"));

        let all = TableSelection::default();
        assert!(all.matches("comments"));
    }
}
