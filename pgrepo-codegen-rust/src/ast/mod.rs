//! Rust AST builders for generating structs, impls and functions.
//!
//! These provide a high-level API for constructing Rust syntax,
//! which can then be rendered via `CodeBuilder`.

mod fns;
mod impls;
mod structs;

pub use fns::{Fn, Param};
pub use impls::Impl;
pub use structs::{Field, Struct};
