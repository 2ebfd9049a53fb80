//! The naming and typing model handed to language renderers.
//!
//! A [`GenerationPlan`] is the snapshot with every decision made: which
//! tables and queries survive, what every identifier is called and what
//! every column maps to. Renderers only format it.

use std::collections::BTreeSet;

use pgrepo_ir::QueryMode;
use serde::Serialize;

use crate::language::TypeDescriptor;

/// A column or result field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPlan {
    /// Name in the database.
    pub column: String,
    /// Identifier in generated code, possibly escaped.
    pub ident: String,
    /// Database type as written in a cast, `[]` included for arrays.
    pub sql_type: String,
    pub ty: TypeDescriptor,
}

impl FieldPlan {
    /// Whether the identifier differs from the column name, raw prefix included.
    pub fn is_renamed(&self) -> bool {
        self.ident != self.column
    }
}

/// Everything generated for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityPlan {
    pub table: String,
    /// Quoted `"schema"."table"` for SQL.
    pub qualified_name: String,
    pub entity: String,
    pub repository: String,
    pub create_params: String,
    pub update_params: String,
    /// Module identifier in the package module file.
    pub module: String,
    /// File name without extension.
    pub file_stem: String,
    /// In ordinal order.
    pub fields: Vec<FieldPlan>,
    /// Index of the primary key in `fields`.
    pub key: usize,
    /// Indices of caller-supplied insert columns.
    pub insertable: Vec<usize>,
    /// Indices of columns `update` writes.
    pub updatable: Vec<usize>,
}

impl EntityPlan {
    pub fn key_field(&self) -> &FieldPlan {
        &self.fields[self.key]
    }

    pub fn insertable_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.insertable.iter().map(|&i| &self.fields[i])
    }

    pub fn updatable_fields(&self) -> impl Iterator<Item = &FieldPlan> {
        self.updatable.iter().map(|&i| &self.fields[i])
    }
}

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamPlan {
    pub position: usize,
    /// `arg1`, `arg2`, ...
    pub ident: String,
    pub ty: TypeDescriptor,
}

/// One annotated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub name: String,
    pub method: String,
    /// Name of the retrying variant of `method`.
    pub retry_method: String,
    pub mode: QueryMode,
    pub sql: String,
    pub params: Vec<ParamPlan>,
    /// Result struct name; `None` for `exec`.
    pub row: Option<String>,
    pub fields: Vec<FieldPlan>,
    /// Index of the pagination key in `fields` for `paginated`.
    pub key: Option<usize>,
}

impl QueryPlan {
    pub fn key_field(&self) -> Option<&FieldPlan> {
        self.key.map(|i| &self.fields[i])
    }
}

/// All queries of one SQL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySetPlan {
    /// File stem of the SQL file.
    pub name: String,
    /// Path of the SQL file.
    pub source: String,
    pub type_name: String,
    pub module: String,
    pub file_stem: String,
    /// In declaration order.
    pub queries: Vec<QueryPlan>,
}

/// The complete, renderer-ready model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    /// Sorted by table name.
    pub entities: Vec<EntityPlan>,
    /// Sorted by file name.
    pub query_sets: Vec<QuerySetPlan>,
}

impl GenerationPlan {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.query_sets.is_empty()
    }

    /// Every field and parameter type used anywhere in the plan.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        let entity_types = self
            .entities
            .iter()
            .flat_map(|e| e.fields.iter().map(|f| &f.ty));
        let query_types = self.query_sets.iter().flat_map(|set| {
            set.queries.iter().flat_map(|q| {
                q.fields
                    .iter()
                    .map(|f| &f.ty)
                    .chain(q.params.iter().map(|p| &p.ty))
            })
        });
        entity_types.chain(query_types)
    }

    /// Driver features the generated code depends on, sorted.
    pub fn required_features(&self) -> BTreeSet<&'static str> {
        self.types().filter_map(|ty| ty.requires).collect()
    }
}
