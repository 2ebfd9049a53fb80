//! RustFile abstraction for structured Rust file generation.
//!
//! Provides a high-level API for generating Rust files with
//! organized imports and body content.

use pgrepo_codegen::builder::{CodeBuilder, CodeFragment, Indent, Renderable};

/// A Rust use statement.
#[derive(Debug, Clone)]
pub struct Use {
    module: String,
    symbols: Vec<String>,
}

impl Use {
    /// Create a use statement for a module.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
        }
    }

    /// Add a symbol to import from the module.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    /// Add multiple symbols to import.
    pub fn symbols(mut self, symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    /// Make this a `pub use`.
    pub fn public(self) -> PubUse {
        PubUse(self)
    }

    fn format(&self) -> String {
        if self.symbols.is_empty() {
            format!("use {};", self.module)
        } else if self.symbols.len() == 1 {
            format!("use {}::{};", self.module, self.symbols[0])
        } else {
            format!("use {}::{{{}}};", self.module, self.symbols.join(", "))
        }
    }
}

impl Renderable for Use {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::Line(self.format())]
    }
}

/// A `pub use` re-export.
#[derive(Debug, Clone)]
pub struct PubUse(Use);

impl Renderable for PubUse {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::Line(format!("pub {}", self.0.format()))]
    }
}

/// A structured representation of a Rust file.
///
/// Organizes code into imports and body sections.
///
/// # Example
///
/// ```ignore
/// let file = RustFile::new()
///     .use_stmt(Use::new("super::runtime").symbol("RepoError"))
///     .add(row_struct)
///     .add(repository_impl)
///     .render_with_header(GENERATED_HEADER);
/// ```
#[derive(Default)]
pub struct RustFile {
    uses: Vec<Use>,
    body: Vec<Vec<CodeFragment>>,
}

impl RustFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_stmt(mut self, use_stmt: Use) -> Self {
        self.uses.push(use_stmt);
        self
    }

    /// Add a body element (any Renderable).
    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Renderable>(mut self, node: R) -> Self {
        self.body.push(node.to_fragments());
        self
    }

    /// Add multiple body elements.
    pub fn add_all<R: Renderable>(mut self, nodes: impl IntoIterator<Item = R>) -> Self {
        for node in nodes {
            self.body.push(node.to_fragments());
        }
        self
    }

    /// Render the file with Rust indentation (4 spaces).
    pub fn render(&self) -> String {
        self.render_with_indent(Indent::RUST)
    }

    /// Render the file with a header comment.
    pub fn render_with_header(&self, header: &str) -> String {
        let content = self.render();
        if content.is_empty() {
            format!("{}\n", header)
        } else {
            format!("{}\n\n{}", header, content)
        }
    }

    /// Render the file with custom indentation.
    pub fn render_with_indent(&self, indent: Indent) -> String {
        let mut builder = CodeBuilder::new(indent);

        for use_stmt in &self.uses {
            builder.emit(use_stmt);
        }

        if !self.uses.is_empty() && !self.body.is_empty() {
            builder.push_blank();
        }

        // Blank line between body elements
        for (i, fragments) in self.body.iter().enumerate() {
            if i > 0 {
                builder.push_blank();
            }
            builder.emit(fragments.as_slice());
        }

        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.uses.is_empty() && self.body.is_empty()
    }
}

/// Raw code lines added to a file as-is.
#[derive(Debug, Clone)]
pub struct RawCode(String);

impl RawCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Create a raw code fragment from multiple lines.
    pub fn lines(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            lines
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

impl Renderable for RawCode {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.0
            .lines()
            .map(|line| CodeFragment::Line(line.to_string()))
            .collect()
    }
}

/// A Rust string literal for `text`, raw when that keeps it readable.
///
/// Multi-line SQL stays multi-line: `r#"..."#` with enough hashes that the
/// text cannot close it early.
pub fn string_literal(text: &str) -> String {
    if !text.contains(['"', '\\', '\n']) {
        return format!("\"{}\"", text);
    }
    if text.contains('\r') {
        return format!("{:?}", text);
    }

    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in text.chars() {
        run = match (c, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n);
        }
    }

    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}
