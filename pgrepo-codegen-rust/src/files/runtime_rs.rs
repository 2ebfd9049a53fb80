use std::path::{Path, PathBuf};

use pgrepo_core::GeneratedFile;

use super::GENERATED_HEADER;

/// Source of the runtime crate, shipped into every package.
pub const RUNTIME_SOURCE: &str = include_str!("../../../pgrepo-runtime/src/lib.rs");

/// The shared error, retry and pagination support file.
pub struct RuntimeRs;

impl GeneratedFile for RuntimeRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("runtime.rs")
    }

    fn render(&self) -> String {
        format!("{}\n\n{}", GENERATED_HEADER, RUNTIME_SOURCE)
    }
}
