//! Normalisation of PostgreSQL type names.
//!
//! The catalog reports `udt_name`s (`int4`, `timestamptz`), the driver
//! reports its own spellings (`INT4`) and users write SQL aliases
//! (`integer`, `character varying`). All of them resolve to one [`PgType`].

/// A PostgreSQL element type known to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PgType {
    Text,
    Varchar,
    Bpchar,
    /// The single-byte internal `"char"`.
    Char,
    Name,
    Citext,
    Int2,
    Int4,
    Int8,
    Numeric,
    Float4,
    Float8,
    Bool,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Interval,
    Uuid,
    Json,
    Jsonb,
    Inet,
    Cidr,
    Macaddr,
    Bytea,
    Xml,
    /// Anything else (enums, domains, extension types).
    Other(String),
}

impl PgType {
    /// Resolve a type name. Array markers must already be stripped.
    pub fn parse(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        let base = strip_modifiers(&lowered);

        match base {
            "text" => PgType::Text,
            "varchar" | "character varying" => PgType::Varchar,
            "bpchar" | "character" => PgType::Bpchar,
            "char" if base != lowered => PgType::Bpchar,
            "char" => PgType::Char,
            "name" => PgType::Name,
            "citext" => PgType::Citext,
            "int2" | "smallint" | "smallserial" => PgType::Int2,
            "int4" | "int" | "integer" | "serial" => PgType::Int4,
            "int8" | "bigint" | "bigserial" => PgType::Int8,
            "numeric" | "decimal" => PgType::Numeric,
            "float4" | "real" => PgType::Float4,
            "float8" | "double precision" => PgType::Float8,
            "bool" | "boolean" => PgType::Bool,
            "date" => PgType::Date,
            "time" | "time without time zone" => PgType::Time,
            "timestamp" | "timestamp without time zone" => PgType::Timestamp,
            "timestamptz" | "timestamp with time zone" => PgType::Timestamptz,
            "interval" => PgType::Interval,
            "uuid" => PgType::Uuid,
            "json" => PgType::Json,
            "jsonb" => PgType::Jsonb,
            "inet" => PgType::Inet,
            "cidr" => PgType::Cidr,
            "macaddr" => PgType::Macaddr,
            "bytea" => PgType::Bytea,
            "xml" => PgType::Xml,
            other => PgType::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PgType::Other(_))
    }

    /// Whether values of this type can serve as a pagination key.
    pub fn is_pagination_key(&self) -> bool {
        matches!(self, PgType::Uuid)
    }

    /// Canonical catalog spelling.
    pub fn as_str(&self) -> &str {
        match self {
            PgType::Text => "text",
            PgType::Varchar => "varchar",
            PgType::Bpchar => "bpchar",
            PgType::Char => "char",
            PgType::Name => "name",
            PgType::Citext => "citext",
            PgType::Int2 => "int2",
            PgType::Int4 => "int4",
            PgType::Int8 => "int8",
            PgType::Numeric => "numeric",
            PgType::Float4 => "float4",
            PgType::Float8 => "float8",
            PgType::Bool => "bool",
            PgType::Date => "date",
            PgType::Time => "time",
            PgType::Timestamp => "timestamp",
            PgType::Timestamptz => "timestamptz",
            PgType::Interval => "interval",
            PgType::Uuid => "uuid",
            PgType::Json => "json",
            PgType::Jsonb => "jsonb",
            PgType::Inet => "inet",
            PgType::Cidr => "cidr",
            PgType::Macaddr => "macaddr",
            PgType::Bytea => "bytea",
            PgType::Xml => "xml",
            PgType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for PgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `varchar(255)` -> `varchar`, `numeric(10, 2)` -> `numeric`.
fn strip_modifiers(name: &str) -> &str {
    match name.find('(') {
        Some(idx) => name[..idx].trim_end(),
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        assert_eq!(PgType::parse("int4"), PgType::Int4);
        assert_eq!(PgType::parse("timestamptz"), PgType::Timestamptz);
        assert_eq!(PgType::parse("bpchar"), PgType::Bpchar);
    }

    #[test]
    fn test_driver_names_are_case_insensitive() {
        assert_eq!(PgType::parse("INT8"), PgType::Int8);
        assert_eq!(PgType::parse("JSONB"), PgType::Jsonb);
        assert_eq!(PgType::parse("UUID"), PgType::Uuid);
    }

    #[test]
    fn test_sql_aliases() {
        assert_eq!(PgType::parse("character varying"), PgType::Varchar);
        assert_eq!(PgType::parse("integer"), PgType::Int4);
        assert_eq!(PgType::parse("double precision"), PgType::Float8);
        assert_eq!(PgType::parse("timestamp with time zone"), PgType::Timestamptz);
        assert_eq!(PgType::parse("varchar(64)"), PgType::Varchar);
        assert_eq!(PgType::parse("numeric(10, 2)"), PgType::Numeric);
    }

    #[test]
    fn test_unknown_types_are_kept() {
        let ty = PgType::parse("mood");
        assert_eq!(ty, PgType::Other("mood".to_string()));
        assert!(!ty.is_known());
        assert_eq!(ty.as_str(), "mood");
    }

    #[test]
    fn test_single_byte_char_is_not_bpchar() {
        assert_eq!(PgType::parse("bpchar"), PgType::Bpchar);
        assert_eq!(PgType::parse("character(3)"), PgType::Bpchar);
        assert_eq!(PgType::parse("char(2)"), PgType::Bpchar);
        assert_eq!(PgType::parse("char"), PgType::Char);
    }

    #[test]
    fn test_only_uuid_is_pagination_key() {
        assert!(PgType::parse("uuid").is_pagination_key());
        assert!(!PgType::parse("int8").is_pagination_key());
    }
}
