//! Output trait for rendering reports to different formats.

use std::io::{self, Stderr, Stdout, Write};

/// Target output for reports.
///
/// Reports describe *what* to output using these semantic methods.
/// Implementations decide *how* to render.
pub trait Output {
    /// Start a new section with a heading.
    fn section(&mut self, name: &str);

    /// Render a key-value pair.
    fn key_value(&mut self, key: &str, value: &str);

    /// Render a bullet list item.
    fn list_item(&mut self, text: &str);

    /// Render an added item (e.g., new file).
    fn added_item(&mut self, text: &str);

    /// Render a warning message.
    fn warning(&mut self, msg: &str);

    /// Render an error message.
    fn error(&mut self, msg: &str);

    /// Render a separator/divider with a label.
    fn divider(&mut self, label: &str);

    /// Render a block of preformatted text.
    fn preformatted(&mut self, text: &str);

    /// Render a blank line.
    fn newline(&mut self);
}

/// A report that can render itself to an output.
pub trait Report {
    /// Render this report to the given output.
    fn render(&self, out: &mut dyn Output);
}

/// Plain-text output: normal lines to `out`, warnings and errors to `err`.
///
/// Write failures (e.g. a closed pipe) are ignored.
pub struct TerminalOutput<O = Stdout, E = Stderr> {
    out: O,
    err: E,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write, E: Write> TerminalOutput<O, E> {
    pub fn with_writers(out: O, err: E) -> Self {
        Self { out, err }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> Output for TerminalOutput<O, E> {
    fn section(&mut self, name: &str) {
        let _ = writeln!(self.out, "{}:", name);
    }

    fn key_value(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.out, "{}: {}", key, value);
    }

    fn list_item(&mut self, text: &str) {
        let _ = writeln!(self.out, "  - {}", text);
    }

    fn added_item(&mut self, text: &str) {
        let _ = writeln!(self.out, "  + {}", text);
    }

    fn warning(&mut self, msg: &str) {
        let _ = writeln!(self.err, "warning: {}", msg);
    }

    fn error(&mut self, msg: &str) {
        let _ = writeln!(self.err, "error: {}", msg);
    }

    fn divider(&mut self, label: &str) {
        let _ = writeln!(self.out, "── {} ──", label);
    }

    fn preformatted(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn newline(&mut self) {
        let _ = writeln!(self.out);
    }
}
