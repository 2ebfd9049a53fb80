use std::path::{Path, PathBuf};

use pgrepo_codegen::{EntityPlan, FieldPlan, sql};
use pgrepo_core::GeneratedFile;

use super::{GENERATED_HEADER, retry_variant, sql_const, uses};
use crate::{Field, Fn, Impl, Param, RawCode, RustFile, Struct};

/// One table: row struct, params structs and the repository.
pub struct EntityRs<'a> {
    plan: &'a EntityPlan,
}

impl<'a> EntityRs<'a> {
    pub fn new(plan: &'a EntityPlan) -> Self {
        Self { plan }
    }

    fn has_update(&self) -> bool {
        !self.plan.updatable.is_empty()
    }

    /// Repository methods in emission order, retrying variants last.
    pub fn operations(&self) -> Vec<String> {
        let base: Vec<&str> = ["create", "get", "update", "delete", "list", "list_paginated"]
            .into_iter()
            .filter(|op| *op != "update" || self.has_update())
            .collect();

        base.iter()
            .map(|op| op.to_string())
            .chain(base.iter().map(|op| format!("{}_with_retry", op)))
            .collect()
    }

    fn result(&self, ty: &str) -> String {
        format!("Result<{}, RepoError>", ty)
    }

    fn key(&self) -> &FieldPlan {
        self.plan.key_field()
    }

    fn key_param(&self) -> Param {
        Param::new(&self.key().ident, &self.key().ty.type_name)
    }

    fn map_err(op: &str) -> String {
        format!(
            "    .map_err(|err| RepoError::from_sqlx(\"{}\", ENTITY, err))",
            op
        )
    }

    fn consts(&self) -> RawCode {
        let plan = self.plan;
        let mut lines = vec![format!("const ENTITY: &str = \"{}\";", plan.entity)];
        let mut statements = vec![
            ("INSERT_SQL", sql::insert(plan)),
            ("SELECT_SQL", sql::select_by_key(plan)),
        ];
        if self.has_update() {
            statements.push(("UPDATE_SQL", sql::update(plan)));
        }
        statements.extend([
            ("DELETE_SQL", sql::delete(plan)),
            ("LIST_SQL", sql::list(plan)),
            ("LIST_PAGE_SQL", sql::list_page(plan)),
        ]);

        lines.push(String::new());
        for (name, statement) in statements {
            lines.push(sql_const(name, &statement));
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

    fn row_struct(&self) -> Struct {
        Struct::new(&self.plan.entity)
            .doc(format!("A row of `{}`.", self.plan.qualified_name))
            .derive("Debug, Clone, sqlx::FromRow")
            .fields(self.plan.fields.iter().map(Self::field))
    }

    fn create_params(&self) -> Struct {
        Struct::new(&self.plan.create_params)
            .doc("Columns supplied on insert. The rest take their database defaults.")
            .derive("Debug, Clone")
            .fields(
                self.plan
                    .insertable_fields()
                    .map(|f| Field::new(&f.ident, &f.ty.type_name)),
            )
    }

    fn update_params(&self) -> Struct {
        Struct::new(&self.plan.update_params)
            .doc("Columns written by `update`.")
            .derive("Debug, Clone")
            .fields(
                self.plan
                    .updatable_fields()
                    .map(|f| Field::new(&f.ident, &f.ty.type_name)),
            )
    }

    fn repository_struct(&self) -> Struct {
        Struct::new(&self.plan.repository)
            .doc(format!("CRUD and pagination over `{}`.", self.plan.qualified_name))
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

    /// `sqlx::query_as::<_, Entity>(SQL)` followed by `.bind(...)` lines.
    fn query_as(&self, sql: &str, binds: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut lines = vec![format!("sqlx::query_as::<_, {}>({})", self.plan.entity, sql)];
        lines.extend(binds.into_iter().map(|b| format!("    .bind({})", b)));
        lines
    }

    fn create(&self) -> Fn {
        let params_name = if self.plan.insertable.is_empty() {
            "_params"
        } else {
            "params"
        };
        let mut body = self.query_as(
            "INSERT_SQL",
            self.plan
                .insertable_fields()
                .map(|f| format!("&params.{}", f.ident)),
        );
        body.extend([
            "    .fetch_one(&self.pool)".to_string(),
            "    .await".to_string(),
            Self::map_err("create"),
        ]);

        Fn::new("create")
            .doc("Insert a row and return it as stored.")
            .async_()
            .param(Param::self_ref())
            .param(Param::new(
                params_name,
                format!("&{}", self.plan.create_params),
            ))
            .returns(self.result(&self.plan.entity))
            .body(body.join("\n"))
    }

    fn get(&self) -> Fn {
        let mut body = self.query_as("SELECT_SQL", [self.key().ident.clone()]);
        body.extend([
            "    .fetch_one(&self.pool)".to_string(),
            "    .await".to_string(),
            Self::map_err("get"),
        ]);

        Fn::new("get")
            .doc("Fetch one row by primary key. A missing row is `ErrorKind::NotFound`.")
            .async_()
            .param(Param::self_ref())
            .param(self.key_param())
            .returns(self.result(&self.plan.entity))
            .body(body.join("\n"))
    }

    fn update(&self) -> Fn {
        let binds = std::iter::once(self.key().ident.clone()).chain(
            self.plan
                .updatable_fields()
                .map(|f| format!("&params.{}", f.ident)),
        );
        let mut body = self.query_as("UPDATE_SQL", binds);
        body.extend([
            "    .fetch_one(&self.pool)".to_string(),
            "    .await".to_string(),
            Self::map_err("update"),
        ]);

        Fn::new("update")
            .doc("Overwrite the updatable columns of one row and return it.")
            .async_()
            .param(Param::self_ref())
            .param(self.key_param())
            .param(Param::new(
                "params",
                format!("&{}", self.plan.update_params),
            ))
            .returns(self.result(&self.plan.entity))
            .body(body.join("\n"))
    }

    fn delete(&self) -> Fn {
        let body = [
            "let result = sqlx::query(DELETE_SQL)".to_string(),
            format!("    .bind({})", self.key().ident),
            "    .execute(&self.pool)".to_string(),
            "    .await".to_string(),
            format!("{}?;", Self::map_err("delete")),
            "if result.rows_affected() == 0 {".to_string(),
            "    return Err(RepoError::not_found(\"delete\", ENTITY));".to_string(),
            "}".to_string(),
            "Ok(())".to_string(),
        ];

        Fn::new("delete")
            .doc("Delete one row by primary key. Deleting nothing is `ErrorKind::NotFound`.")
            .async_()
            .param(Param::self_ref())
            .param(self.key_param())
            .returns(self.result("()"))
            .body(body.join("\n"))
    }

    fn list(&self) -> Fn {
        let mut body = self.query_as("LIST_SQL", []);
        body.extend([
            "    .fetch_all(&self.pool)".to_string(),
            "    .await".to_string(),
            Self::map_err("list"),
        ]);

        Fn::new("list")
            .doc("Every row, in ascending primary key order.")
            .async_()
            .param(Param::self_ref())
            .returns(self.result(&format!("Vec<{}>", self.plan.entity)))
            .body(body.join("\n"))
    }

    fn list_paginated(&self) -> Fn {
        let entity = &self.plan.entity;
        let body = [
            "let pool = &self.pool;".to_string(),
            "paginate(".to_string(),
            "    request,".to_string(),
            "    \"list_paginated\",".to_string(),
            "    ENTITY,".to_string(),
            format!("    |row: &{}| row.{},", entity, self.key().ident),
            "    move |after, probe| {".to_string(),
            format!("        sqlx::query_as::<_, {}>(LIST_PAGE_SQL)", entity),
            "            .bind(after)".to_string(),
            "            .bind(probe)".to_string(),
            "            .fetch_all(pool)".to_string(),
            "    },".to_string(),
            ")".to_string(),
            ".await".to_string(),
        ];

        Fn::new("list_paginated")
            .doc(
                "One page in ascending primary key order.\n\n\
                 Pages chain through `Page::next_cursor`. A malformed cursor is\n\
                 `ErrorKind::InvalidCursor`.",
            )
            .async_()
            .param(Param::self_ref())
            .param(Param::new("request", "&PageRequest"))
            .returns(self.result(&format!("Page<{}>", entity)))
            .body(body.join("\n"))
    }

    fn retry_variants(&self) -> Vec<Fn> {
        let entity = &self.plan.entity;
        let key = self.key().ident.clone();
        let create_params = format!("&{}", self.plan.create_params);
        let update_params = format!("&{}", self.plan.update_params);

        let mut fns = vec![
            retry_variant(
                "create",
                "create_with_retry",
                vec![Param::new("params", &create_params)],
                &["params".to_string()],
                &self.result(entity),
            ),
            retry_variant(
                "get",
                "get_with_retry",
                vec![self.key_param()],
                std::slice::from_ref(&key),
                &self.result(entity),
            ),
        ];
        if self.has_update() {
            fns.push(retry_variant(
                "update",
                "update_with_retry",
                vec![self.key_param(), Param::new("params", &update_params)],
                &[key.clone(), "params".to_string()],
                &self.result(entity),
            ));
        }
        fns.extend([
            retry_variant(
                "delete",
                "delete_with_retry",
                vec![self.key_param()],
                std::slice::from_ref(&key),
                &self.result("()"),
            ),
            retry_variant(
                "list",
                "list_with_retry",
                Vec::new(),
                &[],
                &self.result(&format!("Vec<{}>", entity)),
            ),
            retry_variant(
                "list_paginated",
                "list_paginated_with_retry",
                vec![Param::new("request", "&PageRequest")],
                &["request".to_string()],
                &self.result(&format!("Page<{}>", entity)),
            ),
        ]);
        fns
    }

    fn repository_impl(&self) -> Impl {
        let mut methods = self.constructor();
        methods.push(self.create());
        methods.push(self.get());
        if self.has_update() {
            methods.push(self.update());
        }
        methods.extend([self.delete(), self.list(), self.list_paginated()]);
        methods.extend(self.retry_variants());

        Impl::new(&self.plan.repository).methods(methods)
    }
}

impl GeneratedFile for EntityRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(format!("{}.rs", self.plan.file_stem))
    }

    fn render(&self) -> String {
        let mut file = RustFile::new()
            .use_stmt(uses::runtime([
                "Page",
                "PageRequest",
                "RepoError",
                "RetryConfig",
                "paginate",
                "with_retry",
            ]))
            .add(self.consts())
            .add(self.row_struct())
            .add(self.create_params());
        if self.has_update() {
            file = file.add(self.update_params());
        }
        file.add(self.repository_struct())
            .add(self.repository_impl())
            .render_with_header(GENERATED_HEADER)
    }
}
