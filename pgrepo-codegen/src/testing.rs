//! Fixtures shared by unit tests.

use pgrepo_core::{to_pascal_case, to_snake_case};
use pgrepo_ir::{
    CatalogSnapshot, Column, Parameter, Query, QueryFile, QueryMode, ResultColumn, Table,
};

use crate::{
    PgType,
    language::{BaseType, LanguageProfile, NamingConvention, TypeMapper},
};

pub(crate) struct TestMapper;

impl TypeMapper for TestMapper {
    fn language(&self) -> &'static str {
        "test"
    }

    fn base_type(&self, ty: &PgType) -> Option<BaseType> {
        match ty {
            PgType::Text | PgType::Varchar => Some(BaseType::plain("String")),
            PgType::Int4 => Some(BaseType::plain("i32").copyable()),
            PgType::Int8 => Some(BaseType::plain("i64").copyable()),
            PgType::Uuid => Some(BaseType::with_feature("Uuid", "uuid").copyable()),
            PgType::Timestamptz => Some(BaseType::with_feature("DateTime", "chrono").copyable()),
            _ => None,
        }
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

fn escape(name: &str) -> String {
    format!("r#{}", name)
}

pub(crate) fn test_profile(mapper: &dyn TypeMapper) -> LanguageProfile<'_> {
    LanguageProfile {
        naming: NamingConvention {
            to_type: to_pascal_case,
            to_member: to_snake_case,
            reserved_words: &["type", "fn"],
            escape_reserved: escape,
        },
        mapper,
        support_names: &["mod", "runtime", "Page", "RepoError"],
        support_methods: &["new", "pool"],
    }
}

pub(crate) fn users() -> Table {
    Table::new("public", "users")
        .column(Column::new("id", "uuid", 1).with_default())
        .column(Column::new("email", "text", 2))
        .column(Column::new("type", "text", 3).nullable())
        .column(Column::new("created_at", "timestamptz", 4).with_default())
        .primary_key("id")
}

pub(crate) fn uuid_column(name: &str, nullable: bool) -> ResultColumn {
    ResultColumn {
        name: name.to_string(),
        db_type: "uuid".to_string(),
        is_array: false,
        nullable,
    }
}

pub(crate) fn text_column(name: &str) -> ResultColumn {
    ResultColumn {
        name: name.to_string(),
        db_type: "text".to_string(),
        is_array: false,
        nullable: false,
    }
}

pub(crate) fn query(name: &str, mode: QueryMode, columns: Vec<ResultColumn>) -> Query {
    Query {
        name: name.to_string(),
        mode,
        sql: "SELECT 1".to_string(),
        params: vec![Parameter {
            position: 1,
            db_type: "text".to_string(),
            is_array: false,
        }],
        columns,
        line: 1,
    }
}

pub(crate) fn snapshot(tables: Vec<Table>, queries: Vec<Query>) -> CatalogSnapshot {
    let query_files = if queries.is_empty() {
        Vec::new()
    } else {
        vec![QueryFile {
            name: "users".to_string(),
            path: "queries/users.sql".to_string(),
            queries,
        }]
    };

    CatalogSnapshot {
        schema: "public".to_string(),
        tables,
        query_files,
        skipped: Vec::new(),
    }
}
