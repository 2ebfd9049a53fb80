use std::path::{Path, PathBuf};

use pgrepo_codegen::{FieldPlan, QueryPlan, QuerySetPlan, sql};
use pgrepo_core::GeneratedFile;
use pgrepo_ir::QueryMode;

use super::{GENERATED_HEADER, operation_name, retry_variant, sql_const, uses};
use crate::{Field, Fn, Impl, Param, RawCode, RustFile, Struct};

/// The methods generated from one SQL file.
pub struct QueriesRs<'a> {
    plan: &'a QuerySetPlan,
}

impl<'a> QueriesRs<'a> {
    pub fn new(plan: &'a QuerySetPlan) -> Self {
        Self { plan }
    }

    /// Query methods in declaration order, retrying variants last.
    pub fn operations(&self) -> Vec<String> {
        let methods = self.plan.queries.iter().map(|q| q.method.clone());
        let retries = self.plan.queries.iter().map(|q| q.retry_method.clone());
        methods.chain(retries).collect()
    }

    fn has_paginated(&self) -> bool {
        self.plan
            .queries
            .iter()
            .any(|q| q.mode == QueryMode::Paginated)
    }

    fn const_name(query: &QueryPlan) -> String {
        format!("{}_SQL", operation_name(&query.method).to_ascii_uppercase())
    }

    fn statement(query: &QueryPlan) -> String {
        match query.key_field() {
            Some(key) if query.mode == QueryMode::Paginated => {
                sql::paginate_query(&query.sql, &key.column, query.params.len())
            }
            _ => query.sql.clone(),
        }
    }

    fn consts(&self) -> RawCode {
        let mut lines = vec![
            format!("const ENTITY: &str = \"{}\";", self.plan.type_name),
            String::new(),
        ];
        for query in &self.plan.queries {
            lines.push(format!("/// `{}` ({}).", query.name, self.plan.source));
            lines.push(sql_const(&Self::const_name(query), &Self::statement(query)));
        }
        RawCode::lines(lines)
    }

    fn field(field: &FieldPlan) -> Field {
        let f = Field::new(&field.ident, &field.ty.type_name);
        if field.is_renamed() {
            f.attr(format!("sqlx(rename = \"{}\")", field.column))
        } else {
            f
        }
    }

    fn row_structs(&self) -> Vec<Struct> {
        self.plan
            .queries
            .iter()
            .filter_map(|query| {
                let row = query.row.as_ref()?;
                Some(
                    Struct::new(row)
                        .doc(format!("Result row of `{}`.", query.name))
                        .derive("Debug, Clone, sqlx::FromRow")
                        .fields(query.fields.iter().map(Self::field)),
                )
            })
            .collect()
    }

    fn set_struct(&self) -> Struct {
        Struct::new(&self.plan.type_name)
            .doc(format!("Queries declared in `{}`.", self.plan.source))
            .derive("Debug, Clone")
            .field(Field::new("pool", "sqlx::PgPool").private())
            .field(Field::new("retry", "RetryConfig").private())
    }

    fn constructor(&self) -> Vec<Fn> {
        vec![
            Fn::new("new")
                .param(Param::new("pool", "sqlx::PgPool"))
                .param(Param::new("retry", "RetryConfig"))
                .returns("Self")
                .body_line("Self { pool, retry }"),
            Fn::new("pool")
                .param(Param::self_ref())
                .returns("&sqlx::PgPool")
                .body_line("&self.pool"),
        ]
    }

    fn params(query: &QueryPlan) -> Vec<Param> {
        let mut params: Vec<Param> = query
            .params
            .iter()
            .map(|p| Param::new(&p.ident, &p.ty.type_name))
            .collect();
        if query.mode == QueryMode::Paginated {
            params.push(Param::new("request", "&PageRequest"));
        }
        params
    }

    fn return_type(query: &QueryPlan) -> String {
        let row = query.row.as_deref().unwrap_or("()");
        let ty = match query.mode {
            QueryMode::One => row.to_string(),
            QueryMode::Many => format!("Vec<{}>", row),
            QueryMode::Exec => "u64".to_string(),
            QueryMode::Paginated => format!("Page<{}>", row),
        };
        format!("Result<{}, RepoError>", ty)
    }

    fn method(query: &QueryPlan) -> Fn {
        let op = operation_name(&query.method);
        let sql = Self::const_name(query);
        let binds = query.params.iter().map(|p| format!(".bind({})", p.ident));
        let map_err = format!("    .map_err(|err| RepoError::from_sqlx(\"{}\", ENTITY, err))", op);
        let row = query.row.as_deref().unwrap_or("()");

        let body: Vec<String> = match query.mode {
            QueryMode::One | QueryMode::Many => {
                let fetch = if query.mode == QueryMode::One {
                    "fetch_one"
                } else {
                    "fetch_all"
                };
                std::iter::once(format!("sqlx::query_as::<_, {}>({})", row, sql))
                    .chain(binds.map(|b| format!("    {}", b)))
                    .chain([
                        format!("    .{}(&self.pool)", fetch),
                        "    .await".to_string(),
                        map_err,
                    ])
                    .collect()
            }
            QueryMode::Exec => std::iter::once(format!("sqlx::query({})", sql))
                .chain(binds.map(|b| format!("    {}", b)))
                .chain([
                    "    .execute(&self.pool)".to_string(),
                    "    .await".to_string(),
                    "    .map(|result| result.rows_affected())".to_string(),
                    map_err,
                ])
                .collect(),
            QueryMode::Paginated => {
                let key = query.key_field().map(|k| k.ident.as_str()).unwrap_or("id");
                [
                    "let pool = &self.pool;".to_string(),
                    "paginate(".to_string(),
                    "    request,".to_string(),
                    format!("    \"{}\",", op),
                    "    ENTITY,".to_string(),
                    format!("    |row: &{}| row.{},", row, key),
                    "    move |after, probe| {".to_string(),
                    format!("        sqlx::query_as::<_, {}>({})", row, sql),
                ]
                .into_iter()
                .chain(binds.map(|b| format!("            {}", b)))
                .chain([
                    "            .bind(after)".to_string(),
                    "            .bind(probe)".to_string(),
                    "            .fetch_all(pool)".to_string(),
                    "    },".to_string(),
                    ")".to_string(),
                    ".await".to_string(),
                ])
                .collect()
            }
        };

        let doc = match query.mode {
            QueryMode::One => format!("Run `{}`. No row is `ErrorKind::NotFound`.", query.name),
            QueryMode::Many => format!("Run `{}`.", query.name),
            QueryMode::Exec => format!("Run `{}` and return the affected row count.", query.name),
            QueryMode::Paginated => format!(
                "One page of `{}`, in ascending `{}` order.",
                query.name,
                query.key_field().map(|k| k.column.as_str()).unwrap_or_default()
            ),
        };

        Fn::new(&query.method)
            .doc(doc)
            .async_()
            .param(Param::self_ref())
            .params(Self::params(query))
            .returns(Self::return_type(query))
            .body(body.join("\n"))
    }

    fn retry_method(query: &QueryPlan) -> Fn {
        let mut args: Vec<String> = query
            .params
            .iter()
            .map(|p| {
                if p.ty.copy {
                    p.ident.clone()
                } else {
                    format!("{}.clone()", p.ident)
                }
            })
            .collect();
        if query.mode == QueryMode::Paginated {
            args.push("request".to_string());
        }

        retry_variant(
            &query.method,
            &query.retry_method,
            Self::params(query),
            &args,
            &Self::return_type(query),
        )
    }

    fn set_impl(&self) -> Impl {
        let queries = &self.plan.queries;
        Impl::new(&self.plan.type_name)
            .methods(self.constructor())
            .methods(queries.iter().map(Self::method))
            .methods(queries.iter().map(Self::retry_method))
    }
}

impl GeneratedFile for QueriesRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(format!("{}.rs", self.plan.file_stem))
    }

    fn render(&self) -> String {
        let imports = if self.has_paginated() {
            uses::runtime([
                "Page",
                "PageRequest",
                "RepoError",
                "RetryConfig",
                "paginate",
                "with_retry",
            ])
        } else {
            uses::runtime(["RepoError", "RetryConfig", "with_retry"])
        };

        RustFile::new()
            .use_stmt(imports)
            .add(self.consts())
            .add_all(self.row_structs())
            .add(self.set_struct())
            .add(self.set_impl())
            .render_with_header(GENERATED_HEADER)
    }
}
