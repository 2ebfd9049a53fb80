//! Intermediate fragments between AST nodes and text.

/// A piece of generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFragment {
    /// A line at the current indentation.
    Line(String),
    Blank,
    /// Text written as-is, without indentation or newline.
    Raw(String),
    /// `header`, indented `body`, then `close` at the header's level.
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
    /// Fragments one level deeper.
    Indent(Vec<CodeFragment>),
    Sequence(Vec<CodeFragment>),
    /// A `///` doc comment; multi-line text becomes several doc lines.
    Doc(String),
}

impl CodeFragment {
    pub fn line(s: impl Into<String>) -> Self {
        Self::Line(s.into())
    }

    pub fn block(header: impl Into<String>, body: Vec<CodeFragment>, close: impl Into<String>) -> Self {
        Self::Block {
            header: header.into(),
            body,
            close: Some(close.into()),
        }
    }

    pub fn doc(s: impl Into<String>) -> Self {
        Self::Doc(s.into())
    }
}

/// Something that renders to code fragments.
pub trait Renderable {
    fn to_fragments(&self) -> Vec<CodeFragment>;
}

impl Renderable for CodeFragment {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![self.clone()]
    }
}

impl<T: Renderable> Renderable for [T] {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.iter().flat_map(Renderable::to_fragments).collect()
    }
}
