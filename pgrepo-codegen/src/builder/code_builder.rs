//! Indented text builder.

use super::{CodeFragment, Indent, Renderable};

/// Fluent API for building indented code.
///
/// Consuming methods (returning `Self`) chain; `push_*` methods work through
/// `&mut self` for loops and helpers.
///
/// ```
/// use pgrepo_codegen::builder::CodeBuilder;
///
/// let code = CodeBuilder::rust()
///     .block_with_close("impl Repo {", "}", |b| b.line("fn get(&self) {}"))
///     .build();
///
/// assert_eq!(code, "impl Repo {\n    fn get(&self) {}\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct CodeBuilder {
    indent_level: usize,
    indent: Indent,
    buffer: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            indent_level: 0,
            indent,
            buffer: String::new(),
        }
    }

    /// Four-space indentation.
    pub fn rust() -> Self {
        Self::new(Indent::RUST)
    }

    // =========================================================================
    // Mutable API
    // =========================================================================

    /// Add a line with current indentation. Empty input writes a bare newline.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        if !s.is_empty() {
            self.write_indent();
            self.buffer.push_str(s);
        }
        self.buffer.push('\n');
        self
    }

    /// Add each line of `text` at the current indentation.
    pub fn push_lines(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.push_line(line);
        }
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn push_raw(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(s);
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Add `/// text`, one doc line per line of `text`.
    pub fn push_doc(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.write_indent();
            if line.is_empty() {
                self.buffer.push_str("///\n");
            } else {
                self.buffer.push_str("/// ");
                self.buffer.push_str(line);
                self.buffer.push('\n');
            }
        }
        self
    }

    /// Render an AST node.
    pub fn emit(&mut self, node: &(impl Renderable + ?Sized)) -> &mut Self {
        for fragment in node.to_fragments() {
            self.apply_fragment(fragment);
        }
        self
    }

    pub fn apply_fragment(&mut self, fragment: CodeFragment) {
        match fragment {
            CodeFragment::Line(s) => {
                self.push_line(&s);
            }
            CodeFragment::Blank => {
                self.push_blank();
            }
            CodeFragment::Raw(s) => {
                self.push_raw(&s);
            }
            CodeFragment::Block {
                header,
                body,
                close,
            } => {
                self.push_line(&header);
                self.push_indent();
                for f in body {
                    self.apply_fragment(f);
                }
                self.push_dedent();
                if let Some(c) = close {
                    self.push_line(&c);
                }
            }
            CodeFragment::Indent(fragments) => {
                self.push_indent();
                for f in fragments {
                    self.apply_fragment(f);
                }
                self.push_dedent();
            }
            CodeFragment::Sequence(fragments) => {
                for f in fragments {
                    self.apply_fragment(f);
                }
            }
            CodeFragment::Doc(text) => {
                self.push_doc(&text);
            }
        }
    }

    // =========================================================================
    // Consuming API
    // =========================================================================

    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    pub fn lines(mut self, text: &str) -> Self {
        self.push_lines(text);
        self
    }

    pub fn blank(mut self) -> Self {
        self.push_blank();
        self
    }

    pub fn raw(mut self, s: &str) -> Self {
        self.push_raw(s);
        self
    }

    pub fn indent(mut self) -> Self {
        self.push_indent();
        self
    }

    pub fn dedent(mut self) -> Self {
        self.push_dedent();
        self
    }

    pub fn doc(mut self, text: &str) -> Self {
        self.push_doc(text);
        self
    }

    pub fn node(mut self, node: &(impl Renderable + ?Sized)) -> Self {
        self.emit(node);
        self
    }

    /// `header`, the indented body produced by `f`, then `close`.
    pub fn block_with_close<F>(self, header: &str, close: &str, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let builder = self.line(header).indent();
        f(builder).dedent().line(close)
    }

    /// Conditionally add content.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition { f(self) } else { self }
    }

    /// Add content for each item.
    pub fn each<T, I, F>(mut self, items: I, f: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(Self, T) -> Self,
    {
        for item in items {
            self = f(self, item);
        }
        self
    }

    pub fn build(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(self.indent.as_str());
        }
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::rust()
    }
}
