//! An in-memory [`CatalogSource`].
//!
//! Statements are looked up by their exact SQL text.

use std::collections::HashMap;

use async_trait::async_trait;
use pgrepo_ir::Table;

use crate::{
    CatalogError, Result,
    source::{CatalogSource, StatementShape, TableSelection},
};

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: Vec<Table>,
    statements: HashMap<String, std::result::Result<StatementShape, String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Register the shape the server would report for `sql`.
    pub fn with_statement(mut self, sql: impl Into<String>, shape: StatementShape) -> Self {
        self.statements.insert(sql.into(), Ok(shape));
        self
    }

    /// Register `sql` as a statement the server refuses to prepare.
    pub fn with_rejected(mut self, sql: impl Into<String>, message: impl Into<String>) -> Self {
        self.statements.insert(sql.into(), Err(message.into()));
        self
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn list_tables(&self, schema: &str, selection: TableSelection<'_>) -> Result<Vec<Table>> {
        let mut tables: Vec<Table> = self
            .tables
            .iter()
            .filter(|t| t.schema == schema && selection.matches(&t.name))
            .cloned()
            .collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tables)
    }

    async fn describe(&self, name: &str, sql: &str) -> Result<StatementShape> {
        match self.statements.get(sql) {
            Some(Ok(shape)) => Ok(shape.clone()),
            Some(Err(message)) => Err(CatalogError::QueryPrepare {
                name: name.to_string(),
                message: message.clone(),
            }),
            None => Err(CatalogError::QueryPrepare {
                name: name.to_string(),
                message: "statement not registered".to_string(),
            }),
        }
    }
}
