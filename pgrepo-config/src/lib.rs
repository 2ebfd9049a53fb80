//! Configuration loading for the pgrepo repository generator.
//!
//! Reads `pgrepo.toml`, validates it and reports problems as
//! [`miette`] diagnostics pointing into the file.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod error;
mod file;
mod validate;

pub use config::{
    Config, DatabaseConfig, OutputConfig, QueriesConfig, RetrySettings, TableFilter,
};
pub use error::{Error, Result};
pub use file::{ConfigFile, load_config};
