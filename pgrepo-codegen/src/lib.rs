//! Language-agnostic code generation for pgrepo.
//!
//! - [`builder`] - indented text building
//! - [`PgType`] - normalised PostgreSQL type names
//! - [`language`] - naming, type mapping and renderer traits
//! - [`pipeline`] - snapshot → [`GenerationPlan`] with diagnostics
//! - [`sql`] - the statements behind table repositories

pub mod builder;
pub mod language;
mod pg_type;
pub mod pipeline;
mod plan;
pub mod sql;

#[cfg(test)]
mod testing;

pub use pg_type::PgType;
pub use plan::{EntityPlan, FieldPlan, GenerationPlan, ParamPlan, QueryPlan, QuerySetPlan};
