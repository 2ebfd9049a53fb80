//! Target-language abstractions.
//!
//! - [`NamingConvention`] - identifiers, reserved words and escaping
//! - [`TypeMapper`] - database types to target types
//! - [`LanguageCodegen`] - renders a plan into files

mod naming;
mod traits;

pub use naming::NamingConvention;
pub use traits::{
    BaseType, GenerateResult, GeneratedUnit, LanguageCodegen, LanguageProfile, TypeDescriptor,
    TypeMapper, UnitRole,
};
