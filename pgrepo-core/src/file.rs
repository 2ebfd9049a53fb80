use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// Trait for types that represent a generated file
pub trait GeneratedFile {
    /// Get the file path relative to the base directory
    fn path(&self, base: &Path) -> PathBuf;

    /// Get the rules for writing this file
    fn rules(&self) -> FileRules {
        FileRules::default()
    }

    /// Render the file content
    fn render(&self) -> String;

    /// Write the file to disk
    fn write(&self, base: &Path) -> Result<WriteResult> {
        let path = self.path(base);
        let content = self.render();
        write_checked(&path, &content, &self.rules())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}

fn write_checked(path: &Path, content: &str, rules: &FileRules) -> Result<WriteResult> {
    if rules.skip_unchanged && std::fs::read_to_string(path).is_ok_and(|old| old == content) {
        return Ok(WriteResult::Unchanged);
    }
    write_file(path, content)?;
    Ok(WriteResult::Written)
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had identical content and was left untouched
    Unchanged,
}

/// A file to be generated, fully rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
    content: String,
    rules: FileRules,
}

impl File {
    /// Create a new file with the given path and content (default rules)
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            rules: FileRules::default(),
        }
    }

    /// Override the write rules.
    pub fn with_rules(mut self, rules: FileRules) -> Self {
        self.rules = rules;
        self
    }

    /// Move a relative file under `base`.
    pub fn under(mut self, base: &Path) -> Self {
        self.path = base.join(&self.path);
        self
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Write the file according to its rules
    pub fn write(&self) -> Result<WriteResult> {
        write_checked(&self.path, &self.content, &self.rules)
    }
}

/// Write a batch of already-rendered files.
///
/// Nothing is written unless every path is distinct.
pub fn write_all(files: &[File]) -> Result<Vec<WriteResult>> {
    let mut seen = std::collections::HashSet::new();
    for file in files {
        if !seen.insert(file.path()) {
            eyre::bail!("refusing to write '{}' twice", file.path().display());
        }
    }
    files.iter().map(File::write).collect()
}

/// Rules that determine how a file should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRules {
    /// Leave the file alone when its content is already identical.
    pub skip_unchanged: bool,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            skip_unchanged: true,
        }
    }
}
