//! Catalog introspection and annotated query parsing for pgrepo.
//!
//! Everything the generator knows about the database comes through this
//! crate: base tables with their columns and primary keys, and the parameter
//! and result shapes of annotated queries as reported by the server.
//!
//! # Module Organization
//!
//! - [`annotation`] - `-- name: X :mode` block parsing and placeholder discovery
//! - [`source`] - the [`CatalogSource`] seam and its data types
//! - [`postgres`] - the live `sqlx` implementation
//! - [`memory`] - an in-memory implementation for tests and offline runs
//! - [`load`] - gathers a complete [`CatalogSnapshot`](pgrepo_ir::CatalogSnapshot)

pub mod annotation;
mod error;
pub mod load;
pub mod memory;
pub mod postgres;
pub mod source;

pub use annotation::{AnnotatedQuery, parse_annotations, placeholder_count};
pub use error::{CatalogError, Result};
pub use load::{LoadOptions, load_snapshot};
pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use source::{CatalogSource, StatementShape, TableSelection, split_type_name};
