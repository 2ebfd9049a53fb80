//! Compilation pipeline for code generation.
//!
//! A [`Pipeline`] takes a catalog snapshot to a generation plan:
//!
//! - Explicit phase boundaries (validate → lower → analyze)
//! - Plugin hooks before and after each phase
//! - Unified diagnostics collection in [`CompilationContext`]

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use plugin::{Plugin, TracingPlugin};
pub use runner::Pipeline;
