//! Rust impl block builder.

use pgrepo_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use super::Fn;

/// Builder for Rust impl blocks.
#[derive(Debug, Clone)]
pub struct Impl {
    type_name: String,
    trait_name: Option<String>,
    methods: Vec<Fn>,
}

impl Impl {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            trait_name: None,
            methods: Vec::new(),
        }
    }

    /// Create an impl block for a trait.
    pub fn for_trait(mut self, trait_name: impl Into<String>) -> Self {
        self.trait_name = Some(trait_name.into());
        self
    }

    pub fn method(mut self, method: Fn) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = Fn>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Build the impl block as a string.
    pub fn build(&self) -> String {
        CodeBuilder::rust().node(self).build()
    }

    fn format_header(&self) -> String {
        match &self.trait_name {
            Some(trait_name) => format!("impl {} for {} {{", trait_name, self.type_name),
            None => format!("impl {} {{", self.type_name),
        }
    }

    fn methods_to_fragments(&self) -> Vec<CodeFragment> {
        self.methods
            .iter()
            .enumerate()
            .flat_map(|(i, method)| {
                let mut fragments = Vec::new();
                if i > 0 {
                    fragments.push(CodeFragment::Blank);
                }
                fragments.extend(method.to_fragments());
                fragments
            })
            .collect()
    }
}

impl Renderable for Impl {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::block(
            self.format_header(),
            self.methods_to_fragments(),
            "}",
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Param;

    #[test]
    fn test_empty_impl() {
        assert_eq!(Impl::new("Foo").build(), "impl Foo {\n}\n");
    }

    #[test]
    fn test_impl_with_methods_separated_by_blank_line() {
        let i = Impl::new("UserRepository")
            .method(Fn::new("list").param(Param::self_ref()))
            .method(Fn::new("get").param(Param::self_ref()))
            .build();
        assert_eq!(
            i,
            "impl UserRepository {\n    pub fn list(&self) {\n    }\n\n    pub fn get(&self) {\n    }\n}\n"
        );
    }

    #[test]
    fn test_impl_for_trait() {
        let i = Impl::new("User").for_trait("Default").build();
        assert!(i.contains("impl Default for User {"));
    }
}
