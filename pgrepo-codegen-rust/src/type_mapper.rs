//! PostgreSQL to Rust (`sqlx`) type mapping.

use pgrepo_codegen::{
    PgType,
    language::{BaseType, TypeMapper},
};

/// Maps PostgreSQL types to the Rust types `sqlx` decodes them into.
///
/// Types outside the standard set come back as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeMapper;

impl TypeMapper for RustTypeMapper {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn base_type(&self, ty: &PgType) -> Option<BaseType> {
        let base = match ty {
            PgType::Text
            | PgType::Varchar
            | PgType::Bpchar
            | PgType::Name
            | PgType::Citext
            | PgType::Xml => BaseType::plain("String"),
            PgType::Char => BaseType::plain("i8").copyable(),
            PgType::Int2 => BaseType::plain("i16").copyable(),
            PgType::Int4 => BaseType::plain("i32").copyable(),
            PgType::Int8 => BaseType::plain("i64").copyable(),
            PgType::Float4 => BaseType::plain("f32").copyable(),
            PgType::Float8 => BaseType::plain("f64").copyable(),
            PgType::Bool => BaseType::plain("bool").copyable(),
            PgType::Numeric => {
                BaseType::with_feature("sqlx::types::Decimal", "rust_decimal").copyable()
            }
            PgType::Date => {
                BaseType::with_feature("sqlx::types::chrono::NaiveDate", "chrono").copyable()
            }
            PgType::Time => {
                BaseType::with_feature("sqlx::types::chrono::NaiveTime", "chrono").copyable()
            }
            PgType::Timestamp => {
                BaseType::with_feature("sqlx::types::chrono::NaiveDateTime", "chrono").copyable()
            }
            PgType::Timestamptz => BaseType::with_feature(
                "sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>",
                "chrono",
            )
            .copyable(),
            PgType::Interval => BaseType::plain("sqlx::postgres::types::PgInterval"),
            PgType::Uuid => BaseType::with_feature("sqlx::types::Uuid", "uuid").copyable(),
            PgType::Json | PgType::Jsonb => BaseType::with_feature("sqlx::types::JsonValue", "json"),
            PgType::Inet | PgType::Cidr => {
                BaseType::with_feature("sqlx::types::ipnetwork::IpNetwork", "ipnetwork").copyable()
            }
            PgType::Macaddr => {
                BaseType::with_feature("sqlx::types::mac_address::MacAddress", "mac_address")
                    .copyable()
            }
            PgType::Bytea => BaseType::plain("Vec<u8>"),
            PgType::Other(_) => return None,
        };
        Some(base)
    }

    fn opaque_type(&self) -> BaseType {
        BaseType::plain("Vec<u8>")
    }

    fn array_of(&self, element: &str) -> String {
        format!("Vec<{}>", element)
    }

    fn optional_of(&self, inner: &str) -> String {
        format!("Option<{}>", inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(db_type: &str, nullable: bool, is_array: bool) -> String {
        RustTypeMapper.map_type(db_type, nullable, is_array).type_name
    }

    #[test]
    fn test_scalars() {
        assert_eq!(map("text", false, false), "String");
        assert_eq!(map("int4", false, false), "i32");
        assert_eq!(map("bigint", false, false), "i64");
        assert_eq!(map("bool", false, false), "bool");
        assert_eq!(map("uuid", false, false), "sqlx::types::Uuid");
        assert_eq!(map("bytea", false, false), "Vec<u8>");
    }

    #[test]
    fn test_single_byte_char_is_i8() {
        assert_eq!(map("char", false, false), "i8");
        assert_eq!(map("bpchar", false, false), "String");
        assert_eq!(map("character(8)", true, false), "Option<String>");
    }

    #[test]
    fn test_nullable_is_option() {
        assert_eq!(map("text", true, false), "Option<String>");
        assert_ne!(map("int8", true, false), map("int8", false, false));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(map("text", false, true), "Vec<String>");
        assert_eq!(map("int4", true, true), "Option<Vec<i32>>");
    }

    #[test]
    fn test_feature_types() {
        let ty = RustTypeMapper.map_type("timestamptz", false, false);
        assert_eq!(
            ty.type_name,
            "sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>"
        );
        assert_eq!(ty.requires, Some("chrono"));
        assert_eq!(RustTypeMapper.map_type("jsonb", false, false).requires, Some("json"));
        assert_eq!(RustTypeMapper.map_type("numeric", false, false).requires, Some("rust_decimal"));
    }

    #[test]
    fn test_unknown_type_is_bytes() {
        let ty = RustTypeMapper.map_type("tsvector", true, false);
        assert_eq!(ty.type_name, "Option<Vec<u8>>");
        assert!(ty.fallback);
    }

    #[test]
    fn test_mapping_is_pure() {
        for name in ["text", "int2", "numeric", "date", "interval", "inet", "macaddr", "xml"] {
            for nullable in [false, true] {
                assert_eq!(
                    RustTypeMapper.map_type(name, nullable, false),
                    RustTypeMapper.map_type(name, nullable, false)
                );
            }
        }
    }
}
