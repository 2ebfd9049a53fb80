//! Language-agnostic code generation traits.

use std::path::{Path, PathBuf};

use eyre::Result;
use pgrepo_core::{File, WriteResult, write_all};
use serde::Serialize;

use super::NamingConvention;
use crate::PgType;

/// How one known element type is spelled in the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseType {
    pub name: &'static str,
    /// Driver feature the generated code needs for this type, if any.
    pub requires: Option<&'static str>,
    /// Whether values are trivially copyable.
    pub copy: bool,
}

impl BaseType {
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            requires: None,
            copy: false,
        }
    }

    pub const fn with_feature(name: &'static str, feature: &'static str) -> Self {
        Self {
            name,
            requires: Some(feature),
            copy: false,
        }
    }

    pub const fn copyable(mut self) -> Self {
        self.copy = true;
        self
    }
}

/// A fully mapped column or parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeDescriptor {
    /// Complete type expression, wrappers included (`Option<Vec<String>>`).
    pub type_name: String,
    /// Driver feature required by the element type.
    pub requires: Option<&'static str>,
    pub nullable: bool,
    pub is_array: bool,
    /// Whether values of this type can key cursor pagination.
    pub pagination_key: bool,
    /// Whether the complete type is trivially copyable.
    pub copy: bool,
    /// Set when the database type was unknown and the opaque fallback was used.
    /// The value travels as the UTF-8 bytes of its text form, arrays included.
    pub fallback: bool,
}

/// Maps database types to target-language types.
///
/// Implementors supply the element table and the wrappers; [`map_type`]
/// composes them. Nullability wraps outermost so that a nullable array is an
/// optional sequence, and a non-null column never shares a representation
/// with its nullable counterpart.
///
/// [`map_type`]: TypeMapper::map_type
pub trait TypeMapper: Send + Sync {
    /// The target language name
    fn language(&self) -> &'static str;

    /// Element type for a known database type, `None` when unsupported.
    fn base_type(&self, ty: &PgType) -> Option<BaseType>;

    /// Representation used for unknown types.
    fn opaque_type(&self) -> BaseType;

    /// `Vec<T>` in Rust.
    fn array_of(&self, element: &str) -> String;

    /// `Option<T>` in Rust.
    fn optional_of(&self, inner: &str) -> String;

    fn map_type(&self, db_type: &str, nullable: bool, is_array: bool) -> TypeDescriptor {
        let ty = PgType::parse(db_type);
        let (base, fallback) = match self.base_type(&ty) {
            Some(base) => (base, false),
            None => (self.opaque_type(), true),
        };

        let mut type_name = base.name.to_string();
        if is_array && !fallback {
            type_name = self.array_of(&type_name);
        }
        if nullable {
            type_name = self.optional_of(&type_name);
        }

        TypeDescriptor {
            type_name,
            requires: base.requires,
            nullable,
            is_array,
            pagination_key: !nullable && !is_array && ty.is_pagination_key(),
            copy: base.copy && !is_array,
            fallback,
        }
    }
}

/// The naming and typing rules of one target language.
#[derive(Clone, Copy)]
pub struct LanguageProfile<'a> {
    pub naming: NamingConvention,
    pub mapper: &'a dyn TypeMapper,
    /// Module and type names the support files already take.
    pub support_names: &'static [&'static str],
    /// Methods every generated query set defines besides its queries.
    pub support_methods: &'static [&'static str],
}

impl std::fmt::Debug for LanguageProfile<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageProfile")
            .field("language", &self.mapper.language())
            .finish()
    }
}

/// What a generated unit was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    /// A table repository.
    Entity,
    /// The methods of one query file.
    QuerySet,
    /// Package module and shared runtime.
    Support,
}

/// One rendered output file plus what it contains.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub role: UnitRole,
    /// Entity, query set or support file name.
    pub name: String,
    /// Generated method names in emission order.
    pub operations: Vec<String>,
    /// Path relative to the package directory.
    pub file: File,
}

/// Result of code generation
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Files created or rewritten
    pub written: Vec<PathBuf>,
    /// Files whose content was already identical
    pub unchanged: Vec<PathBuf>,
}

/// Trait for language-specific code generators.
pub trait LanguageCodegen {
    /// Language identifier (e.g., "rust")
    fn language(&self) -> &'static str;

    /// File extension for generated source files (e.g., "rs")
    fn file_extension(&self) -> &'static str;

    /// Render every unit in memory, sorted by file path.
    fn units(&self) -> Vec<GeneratedUnit>;

    /// Preview generated files without writing to disk
    fn preview(&self) -> Vec<File> {
        self.units().into_iter().map(|unit| unit.file).collect()
    }

    /// Render everything, then write it under `output_dir`.
    ///
    /// Nothing is written if two units resolve to the same path.
    fn generate(&self, output_dir: &Path) -> Result<GenerateResult> {
        let files: Vec<File> = self
            .preview()
            .into_iter()
            .map(|file| file.under(output_dir))
            .collect();

        let mut result = GenerateResult::default();
        for (file, outcome) in files.iter().zip(write_all(&files)?) {
            let path = file.path().to_path_buf();
            match outcome {
                WriteResult::Written => result.written.push(path),
                WriteResult::Unchanged => result.unchanged.push(path),
            }
        }

        Ok(result)
    }
}
