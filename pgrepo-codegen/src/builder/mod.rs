//! Code generation building blocks.
//!
//! - [`CodeBuilder`] - indented text with a fluent API
//! - [`CodeFragment`] / [`Renderable`] - composition of AST nodes
//! - [`Indent`] - indentation unit

mod code_builder;
mod indent;
mod renderable;

pub use code_builder::CodeBuilder;
pub use indent::Indent;
pub use renderable::{CodeFragment, Renderable};
