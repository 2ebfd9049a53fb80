//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a check run.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    /// Files a generate run would produce, relative to the output directory.
    pub files: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        for info in &self.infos {
            out.preformatted(&format!("info: {}", info));
        }

        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        if self.is_valid() {
            out.section("Would generate");
            for file in &self.files {
                out.list_item(file);
            }
            out.newline();
            out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        }
    }
}
