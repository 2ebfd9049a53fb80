//! Rust function builder.

use pgrepo_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

/// Signatures longer than this put one parameter per line.
const MAX_SIGNATURE_WIDTH: usize = 100;

/// A parameter in a Rust function.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// `&self`
    pub fn self_ref() -> Self {
        Self::new("&self", "")
    }

    fn format(&self) -> String {
        if self.ty.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.ty)
        }
    }
}

/// Builder for Rust functions.
#[derive(Debug, Clone)]
pub struct Fn {
    name: String,
    doc: Option<String>,
    attrs: Vec<String>,
    is_public: bool,
    is_async: bool,
    params: Vec<Param>,
    return_type: Option<String>,
    body: Vec<String>,
}

impl Fn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            attrs: Vec::new(),
            is_public: true,
            is_async: false,
            params: Vec::new(),
            return_type: None,
            body: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attrs.push(attr.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn async_(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Add a line to the function body.
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// Add raw body content (can contain multiple lines).
    pub fn body(mut self, content: impl Into<String>) -> Self {
        for line in content.into().lines() {
            self.body.push(line.to_string());
        }
        self
    }

    /// Build the function as a string.
    pub fn build(&self) -> String {
        CodeBuilder::rust().node(self).build()
    }

    fn signature(&self) -> Vec<String> {
        let vis = if self.is_public { "pub " } else { "" };
        let async_kw = if self.is_async { "async " } else { "" };
        let ret = self
            .return_type
            .as_ref()
            .map(|ret| format!(" -> {}", ret))
            .unwrap_or_default();
        let head = format!("{}{}fn {}(", vis, async_kw, self.name);

        let params: Vec<String> = self.params.iter().map(Param::format).collect();
        let single = format!("{}{}){} {{", head, params.join(", "), ret);
        if single.len() <= MAX_SIGNATURE_WIDTH {
            return vec![single];
        }

        let mut lines = vec![head];
        lines.extend(params.into_iter().map(|p| format!("    {},", p)));
        lines.push(format!("){} {{", ret));
        lines
    }
}

impl Renderable for Fn {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = Vec::new();

        if let Some(doc) = &self.doc {
            fragments.push(CodeFragment::doc(doc));
        }
        for attr in &self.attrs {
            fragments.push(CodeFragment::Line(format!("#[{}]", attr)));
        }

        let mut signature = self.signature();
        let header = signature.pop().unwrap_or_default();
        fragments.extend(signature.into_iter().map(CodeFragment::Line));
        fragments.push(CodeFragment::block(
            header,
            self.body.iter().map(CodeFragment::line).collect(),
            "}",
        ));

        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fn() {
        let f = Fn::new("list").build();
        assert_eq!(f, "pub fn list() {\n}\n");
    }

    #[test]
    fn test_fn_with_params() {
        let f = Fn::new("get")
            .param(Param::self_ref())
            .param(Param::new("id", "sqlx::types::Uuid"))
            .returns("Option<User>")
            .body_line("None")
            .build();
        assert_eq!(
            f,
            "pub fn get(&self, id: sqlx::types::Uuid) -> Option<User> {\n    None\n}\n"
        );
    }

    #[test]
    fn test_async_fn() {
        let f = Fn::new("fetch").async_().returns("Result<String, RepoError>").build();
        assert!(f.contains("pub async fn fetch() -> Result<String, RepoError> {"));
    }

    #[test]
    fn test_private_fn_with_doc() {
        let f = Fn::new("helper").private().doc("Helps.").build();
        assert!(f.starts_with("/// Helps.\nfn helper() {"));
    }

    #[test]
    fn test_long_signature_wraps() {
        let f = Fn::new("list_posts_by_author_with_retry")
            .async_()
            .param(Param::self_ref())
            .param(Param::new("arg1", "sqlx::types::Uuid"))
            .param(Param::new("request", "&PageRequest"))
            .param(Param::new("cancel", "&tokio_util::sync::CancellationToken"))
            .returns("Result<Page<ListPostsByAuthorRow>, RepoError>")
            .build();

        assert!(f.starts_with(
            "pub async fn list_posts_by_author_with_retry(\n    &self,\n    arg1: sqlx::types::Uuid,\n"
        ));
        assert!(f.contains("\n) -> Result<Page<ListPostsByAuthorRow>, RepoError> {\n"));
    }

    #[test]
    fn test_multiline_body_keeps_relative_indent() {
        let f = Fn::new("run").body("if ok {\n    go();\n}").build();
        assert_eq!(f, "pub fn run() {\n    if ok {\n        go();\n    }\n}\n");
    }
}
