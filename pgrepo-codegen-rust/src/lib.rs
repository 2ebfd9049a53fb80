//! Rust (sqlx) renderer for pgrepo.
//!
//! Turns a [`pgrepo_codegen::GenerationPlan`] into one package directory:
//! a file per table, a file per SQL query file, the shared `runtime.rs` and
//! the package `mod.rs`.

mod generator;
mod naming;
mod rust_file;
mod type_mapper;

pub mod ast;
pub mod files;

pub use ast::{Field, Fn, Impl, Param, Struct};
pub use files::RetryDefaults;
pub use generator::{Generator, SUPPORT_METHODS, SUPPORT_NAMES, rust_profile};
pub use naming::RUST_NAMING;
pub use pgrepo_codegen::language::{GenerateResult, LanguageCodegen};
pub use rust_file::{PubUse, RawCode, RustFile, Use, string_literal};
pub use type_mapper::RustTypeMapper;
