//! Built-in pipeline phases.
//!
//! - [`ValidatePhase`] - lints the snapshot, warning about skipped units
//! - [`LowerPhase`] - builds the generation plan
//! - [`AnalyzePhase`] - rejects plans with colliding identifiers

mod analyze;
mod lower;
mod validate;

pub use analyze::{AnalyzePhase, DuplicateIdentifierLint};
pub use lower::{LowerPhase, lower_snapshot};
pub use validate::{
    Lint, PaginationKeyLint, PrimaryKeyLint, SkippedUnitLint, UnknownTypeLint, ValidatePhase,
};
