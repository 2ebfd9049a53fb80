//! Live introspection over a `sqlx` PostgreSQL pool.

use std::time::Duration;

use async_trait::async_trait;
use either::Either;
use pgrepo_ir::{Column, Parameter, ResultColumn, Table};
use sqlx::{
    Column as _, Executor, PgPool, Row, Statement as _, TypeInfo as _,
    postgres::{PgColumn, PgPoolOptions},
};

use crate::{
    CatalogError, Result,
    source::{CatalogSource, StatementShape, TableSelection, split_type_name},
};

const TABLES_SQL: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = $1 AND table_type = 'BASE TABLE'
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT column_name::text AS column_name,
       udt_name::text AS udt_name,
       is_nullable::text AS is_nullable,
       column_default IS NOT NULL AS has_default,
       is_identity::text AS is_identity,
       is_generated::text AS is_generated,
       ordinal_position::int4 AS ordinal
FROM information_schema.columns
WHERE table_schema = $1 AND table_name = $2
ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "\
SELECT kcu.column_name::text AS column_name
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON tc.constraint_name = kcu.constraint_name
 AND tc.table_schema = kcu.table_schema
 AND tc.table_name = kcu.table_name
WHERE tc.constraint_type = 'PRIMARY KEY'
  AND tc.table_schema = $1
  AND tc.table_name = $2
ORDER BY kcu.ordinal_position";

const NOT_NULL_SQL: &str = "\
SELECT attnotnull
FROM pg_catalog.pg_attribute
WHERE attrelid = $1 AND attnum = $2";

/// Catalog source backed by a live PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Connect with a small pool; generation issues queries sequentially.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .map_err(CatalogError::Connection)?;

        Ok(Self { pool })
    }

    async fn table(&self, schema: &str, name: String) -> Result<Table> {
        let column_rows = sqlx::query(COLUMNS_SQL)
            .bind(schema)
            .bind(&name)
            .fetch_all(&self.pool)
            .await?;

        let mut table = Table::new(schema, name);

        for row in column_rows {
            let udt_name: String = row.try_get("udt_name")?;
            let (db_type, is_array) = split_type_name(&udt_name);
            let is_nullable: String = row.try_get("is_nullable")?;
            let is_identity: String = row.try_get("is_identity")?;
            let is_generated: String = row.try_get("is_generated")?;

            table.columns.push(Column {
                name: row.try_get("column_name")?,
                db_type,
                is_array,
                nullable: is_nullable == "YES",
                has_default: row.try_get("has_default")?,
                is_identity: is_identity == "YES",
                is_generated: is_generated == "ALWAYS",
                ordinal: row.try_get("ordinal")?,
            });
        }

        table.primary_key = sqlx::query_scalar::<_, String>(PRIMARY_KEY_SQL)
            .bind(schema)
            .bind(&table.name)
            .fetch_all(&self.pool)
            .await?;

        Ok(table)
    }

    /// Nullability of a result column traced back to its table column.
    ///
    /// Computed columns have no origin and are reported as nullable.
    async fn column_nullable(&self, column: &PgColumn) -> Result<bool> {
        let (Some(relation), Some(attnum)) = (column.relation_id(), column.relation_attribute_no())
        else {
            return Ok(true);
        };

        let not_null = sqlx::query_scalar::<_, bool>(NOT_NULL_SQL)
            .bind(relation)
            .bind(attnum)
            .fetch_optional(&self.pool)
            .await?;

        Ok(!not_null.unwrap_or(false))
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn list_tables(&self, schema: &str, selection: TableSelection<'_>) -> Result<Vec<Table>> {
        let names = sqlx::query_scalar::<_, String>(TABLES_SQL)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;

        let mut tables = Vec::new();
        for name in names.into_iter().filter(|n| selection.matches(n)) {
            tracing::debug!(schema, table = %name, "introspecting table");
            tables.push(self.table(schema, name).await?);
        }

        Ok(tables)
    }

    async fn describe(&self, name: &str, sql: &str) -> Result<StatementShape> {
        let statement = match self.pool.prepare(sql).await {
            Ok(statement) => statement,
            Err(sqlx::Error::Database(db)) => {
                return Err(CatalogError::QueryPrepare {
                    name: name.to_string(),
                    message: db.message().to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let params = match statement.parameters() {
            Some(Either::Left(types)) => types
                .iter()
                .enumerate()
                .map(|(idx, ty)| {
                    let (db_type, is_array) = split_type_name(ty.name());
                    Parameter {
                        position: idx + 1,
                        db_type,
                        is_array,
                    }
                })
                .collect(),
            Some(Either::Right(count)) => (1..=count)
                .map(|position| Parameter {
                    position,
                    db_type: "unknown".to_string(),
                    is_array: false,
                })
                .collect(),
            None => Vec::new(),
        };

        let mut columns = Vec::with_capacity(statement.columns().len());
        for column in statement.columns() {
            let (db_type, is_array) = split_type_name(column.type_info().name());
            columns.push(ResultColumn {
                name: column.name().to_string(),
                db_type,
                is_array,
                nullable: self.column_nullable(column).await?,
            });
        }

        Ok(StatementShape { params, columns })
    }
}

