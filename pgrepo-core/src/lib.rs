//! Core utilities and types for the pgrepo repository generator.
//!
//! This crate provides the generated-file abstraction and the naming helpers
//! used by every other pgrepo crate.

mod file;
mod utils;

// File operations
pub use file::{File, FileRules, GeneratedFile, WriteResult, write_all};
// String utilities
pub use utils::{singularize, to_pascal_case, to_snake_case};

/// Header placed at the top of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by pgrepo. DO NOT EDIT.";
