//! Generate command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from code generation.
#[derive(Debug)]
pub struct GenerateReport {
    /// Package (module) name.
    pub package: String,

    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,

    /// Entity names, one per generated repository.
    pub entities: Vec<String>,

    /// Number of generated query methods.
    pub query_count: usize,

    /// Tables and queries left out of the package.
    pub skipped: usize,

    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Files created or rewritten.
    pub written: Vec<PathBuf>,
    /// Files that already had identical content.
    pub unchanged: Vec<PathBuf>,
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewResult {
    /// Files that would be generated.
    pub files: Vec<PreviewFile>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    /// Path relative to the output directory.
    pub path: String,
    pub content: String,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        if !self.warnings.is_empty() {
            out.newline();
        }

        out.section(&format!("Repositories ({})", self.entities.len()));
        for entity in &self.entities {
            out.list_item(entity);
        }
        out.newline();

        out.key_value("Query methods", &self.query_count.to_string());
        out.key_value("Skipped", &self.skipped.to_string());
        out.key_value("Generated", &written.output_dir.display().to_string());

        if !written.written.is_empty() {
            out.newline();
            out.section("Written");
            for path in &written.written {
                out.added_item(&path.display().to_string());
            }
        }
        if !written.unchanged.is_empty() {
            out.key_value("Unchanged", &written.unchanged.len().to_string());
        }

        out.newline();
        out.preformatted(&format!(
            "Mount the package with `pub mod {};` in the parent module.",
            self.package
        ));
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }

        out.divider("Summary");
        out.preformatted(&format!(
            "{} files would be generated ({} skipped units)",
            preview.files.len(),
            self.skipped
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::testing::Recorder;

    fn report(result: GenerationResult) -> GenerateReport {
        GenerateReport {
            package: "repo".to_string(),
            warnings: vec!["table 'events' skipped: no primary key".to_string()],
            entities: vec!["User".to_string()],
            query_count: 3,
            skipped: 1,
            result,
        }
    }

    #[test]
    fn test_render_written() {
        let mut out = Recorder::default();
        report(GenerationResult::Written(WrittenResult {
            output_dir: PathBuf::from("src/repo"),
            written: vec![PathBuf::from("src/repo/users.rs")],
            unchanged: vec![PathBuf::from("src/repo/mod.rs")],
        }))
        .render(&mut out);

        let text = out.text();
        assert!(text.contains("[warning] table 'events' skipped: no primary key"));
        assert!(text.contains("[section] Repositories (1)"));
        assert!(text.contains("[item] User"));
        assert!(text.contains("[kv] Skipped: 1"));
        assert!(text.contains("[added] src/repo/users.rs"));
        assert!(text.contains("[kv] Unchanged: 1"));
        assert!(text.contains("`pub mod repo;`"));
    }

    #[test]
    fn test_render_preview() {
        let mut out = Recorder::default();
        report(GenerationResult::Preview(PreviewResult {
            files: vec![PreviewFile {
                path: "mod.rs".to_string(),
                content: "pub mod users;".to_string(),
            }],
        }))
        .render(&mut out);

        assert_eq!(
            out.lines,
            vec![
                "[divider] mod.rs",
                "pub mod users;",
                "[divider] Summary",
                "1 files would be generated (1 skipped units)",
            ]
        );
    }
}
