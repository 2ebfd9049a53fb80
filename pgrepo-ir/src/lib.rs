//! Metadata types for the pgrepo repository generator.
//!
//! These types are the single source of truth handed from the catalog
//! introspector and query parser to the code generation pipeline.
//!
//! # Architecture
//!
//! ```text
//! live catalog + *.sql → pgrepo-catalog → pgrepo-ir (metadata) → codegen
//! ```
//!
//! Everything here is plain data: created fresh on every run and never
//! mutated once handed to the pipeline.

mod query;
mod snapshot;
mod table;

pub use query::{ParseModeError, Parameter, Query, QueryFile, QueryMode, ResultColumn};
pub use snapshot::{CatalogSnapshot, SkippedUnit, UnitKind};
pub use table::{Column, PrimaryKeyIssue, Table, quote_ident};

/// Whether a (normalised or raw) database type name denotes a UUID.
pub fn is_uuid_type(db_type: &str) -> bool {
    db_type.eq_ignore_ascii_case("uuid")
}
