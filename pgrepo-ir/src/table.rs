//! Table and column metadata.

use serde::Serialize;

use crate::is_uuid_type;

/// A column of an introspected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name as declared in the catalog.
    pub name: String,
    /// Element type name (`udt_name` without the array marker, e.g. `int4`).
    pub db_type: String,
    /// Whether the column is an array of `db_type`.
    pub is_array: bool,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column has a default expression.
    pub has_default: bool,
    /// Whether the column is an identity column.
    pub is_identity: bool,
    /// Whether the column is `GENERATED ALWAYS AS (...) STORED`.
    pub is_generated: bool,
    /// 1-based ordinal position.
    pub ordinal: i32,
}

impl Column {
    /// Create a non-null column with no default.
    pub fn new(name: impl Into<String>, db_type: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            is_array: false,
            nullable: false,
            has_default: false,
            is_identity: false,
            is_generated: false,
            ordinal,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    /// Columns the caller supplies on insert.
    ///
    /// Default-only, identity and generated columns are filled by the database.
    pub fn is_insertable(&self) -> bool {
        !self.has_default && !self.is_identity && !self.is_generated
    }

    /// Whether the column is a single UUID value.
    pub fn is_uuid(&self) -> bool {
        !self.is_array && is_uuid_type(&self.db_type)
    }
}

/// Why a table cannot be used for CRUD and pagination generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PrimaryKeyIssue {
    /// The table declares no primary key.
    Missing,
    /// The primary key spans more than one column.
    Composite(Vec<String>),
    /// The key column is not a UUID.
    NotUuid { column: String, db_type: String },
    /// The constraint names a column that was not introspected.
    UnknownColumn(String),
}

impl std::fmt::Display for PrimaryKeyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryKeyIssue::Missing => write!(f, "no primary key"),
            PrimaryKeyIssue::Composite(columns) => {
                write!(f, "composite primary key ({})", columns.join(", "))
            }
            PrimaryKeyIssue::NotUuid { column, db_type } => {
                write!(f, "primary key '{}' has type '{}', expected uuid", column, db_type)
            }
            PrimaryKeyIssue::UnknownColumn(column) => {
                write!(f, "primary key column '{}' not found", column)
            }
        }
    }
}

/// An introspected base table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<Column>,
    /// Primary-key columns as reported by the constraint catalog.
    pub primary_key: Vec<String>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key.push(column.into());
        self
    }

    /// `schema.table`, quoted where needed so it can be pasted into SQL.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    /// The single UUID primary-key column, or why there isn't one.
    pub fn key_column(&self) -> Result<&Column, PrimaryKeyIssue> {
        let name = match self.primary_key.as_slice() {
            [] => return Err(PrimaryKeyIssue::Missing),
            [name] => name,
            many => return Err(PrimaryKeyIssue::Composite(many.to_vec())),
        };

        let column = self
            .columns
            .iter()
            .find(|c| &c.name == name)
            .ok_or_else(|| PrimaryKeyIssue::UnknownColumn(name.clone()))?;

        if !column.is_uuid() {
            return Err(PrimaryKeyIssue::NotUuid {
                column: column.name.clone(),
                db_type: column.db_type.clone(),
            });
        }

        Ok(column)
    }

    /// Columns supplied on insert, in ordinal order.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_insertable())
    }

    /// Columns written by an update: everything but the key and generated columns.
    pub fn updatable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| !self.primary_key.contains(&c.name) && !c.is_generated)
    }
}

/// PostgreSQL reserved key words; these never work unquoted as column names.
const SQL_RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
    "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
    "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
    "returning", "select", "session_user", "some", "symmetric", "system_user", "table",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic", "when",
    "where", "window", "with",
];

/// Quote an identifier for SQL if it isn't a plain, unreserved lowercase name.
pub fn quote_ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !SQL_RESERVED.contains(&name);

    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
