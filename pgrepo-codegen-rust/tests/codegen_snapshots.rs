//! Snapshot and shape tests for Rust code generation.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use pgrepo_codegen::{GenerationPlan, pipeline::Pipeline};
use pgrepo_codegen_rust::{Generator, LanguageCodegen, RetryDefaults, rust_profile};
use pgrepo_ir::{
    CatalogSnapshot, Column, Parameter, Query, QueryFile, QueryMode, ResultColumn, Table,
};
use tempfile::TempDir;

fn users() -> Table {
    Table::new("public", "users")
        .column(Column::new("id", "uuid", 1).with_default())
        .column(Column::new("email", "text", 2))
        .column(Column::new("display_name", "text", 3).nullable())
        .column(Column::new("type", "text", 4).nullable())
        .column(Column::new("created_at", "timestamptz", 5).with_default())
        .primary_key("id")
}

fn posts() -> Table {
    Table::new("public", "posts")
        .column(Column::new("id", "uuid", 1))
        .column(Column::new("author_id", "uuid", 2))
        .column(Column::new("title", "text", 3))
        .column(Column::new("tags", "text", 4).array())
        .column(Column::new("published", "bool", 5).with_default())
        .primary_key("id")
}

fn audit_log() -> Table {
    Table::new("public", "audit_log")
        .column(Column::new("id", "int8", 1).identity())
        .column(Column::new("message", "text", 2))
        .primary_key("id")
}

fn param(position: usize, db_type: &str) -> Parameter {
    Parameter {
        position,
        db_type: db_type.to_string(),
        is_array: false,
    }
}

fn column(name: &str, db_type: &str, nullable: bool) -> ResultColumn {
    ResultColumn {
        name: name.to_string(),
        db_type: db_type.to_string(),
        is_array: false,
        nullable,
    }
}

fn user_queries() -> QueryFile {
    QueryFile {
        name: "users".to_string(),
        path: "queries/users.sql".to_string(),
        queries: vec![
            Query {
                name: "GetUserByEmail".to_string(),
                mode: QueryMode::One,
                sql: "SELECT id, email FROM users WHERE email = $1".to_string(),
                params: vec![param(1, "text")],
                columns: vec![column("id", "uuid", false), column("email", "text", false)],
                line: 1,
            },
            Query {
                name: "ListRecentUsers".to_string(),
                mode: QueryMode::Many,
                sql: "SELECT id, created_at\nFROM users\nORDER BY created_at DESC".to_string(),
                params: Vec::new(),
                columns: vec![
                    column("id", "uuid", false),
                    column("created_at", "timestamptz", true),
                ],
                line: 4,
            },
            Query {
                name: "DeactivateUser".to_string(),
                mode: QueryMode::Exec,
                sql: "UPDATE users SET type = 'inactive' WHERE id = $1".to_string(),
                params: vec![param(1, "uuid")],
                columns: Vec::new(),
                line: 9,
            },
            Query {
                name: "SearchUsers".to_string(),
                mode: QueryMode::Paginated,
                sql: "SELECT id, email FROM users WHERE email LIKE $1".to_string(),
                params: vec![param(1, "text")],
                columns: vec![column("id", "uuid", false), column("email", "text", false)],
                line: 12,
            },
        ],
    }
}

fn snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        schema: "public".to_string(),
        tables: vec![audit_log(), posts(), users()],
        query_files: vec![user_queries()],
        skipped: Vec::new(),
    }
}

fn plan(snapshot: CatalogSnapshot) -> GenerationPlan {
    Pipeline::new()
        .run(snapshot, rust_profile())
        .expect("pipeline failed")
        .take_plan()
        .expect("no plan")
}

fn retry() -> RetryDefaults {
    RetryDefaults {
        max_attempts: 5,
        base_delay_ms: 50,
        max_delay_ms: 2000,
    }
}

/// Rendered files as `(path, content)`, in generator order.
fn render(plan: &GenerationPlan) -> Vec<(String, String)> {
    Generator::new(plan)
        .with_retry(retry())
        .preview()
        .into_iter()
        .map(|f| (f.path().display().to_string(), f.content().to_string()))
        .collect()
}

fn get_file<'a>(files: &'a [(String, String)], path: &str) -> &'a str {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
        .unwrap_or_else(|| panic!("{} not generated", path))
}

#[test]
fn test_package_layout() {
    let files = render(&plan(snapshot()));
    let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();

    assert_eq!(
        paths,
        vec!["mod.rs", "posts.rs", "runtime.rs", "users.rs", "users_queries.rs"]
    );
    for (path, content) in &files {
        assert!(
            content.starts_with("// Code generated by pgrepo. DO NOT EDIT.\n"),
            "{} lacks the generated header",
            path
        );
    }
}

#[test]
fn test_package_mod() {
    let files = render(&plan(snapshot()));
    insta::assert_snapshot!("package_mod", get_file(&files, "mod.rs"));
}

#[test]
fn test_package_mod_lists_derive_feature_for_from_row() {
    let files = render(&plan(snapshot()));
    let module = get_file(&files, "mod.rs");

    assert!(get_file(&files, "users.rs").contains("sqlx::FromRow"));
    let features = module
        .lines()
        .find(|line| line.starts_with("//! Requires `sqlx` with features"))
        .expect("feature line");
    assert!(features.contains("`derive`"), "{}", features);
}

#[test]
fn test_entity_file() {
    let files = render(&plan(snapshot()));
    let users = get_file(&files, "users.rs");

    assert!(users.contains(
        "use super::runtime::{Page, PageRequest, RepoError, RetryConfig, paginate, with_retry};"
    ));
    assert!(users.contains("const ENTITY: &str = \"User\";"));
    assert!(users.contains(
        "const INSERT_SQL: &str = \"INSERT INTO public.users (email, display_name, type) \
         VALUES ($1, $2, $3) RETURNING id, email, display_name, type, created_at\";"
    ));
    assert!(users.contains(
        "const LIST_PAGE_SQL: &str = \"SELECT id, email, display_name, type, created_at \
         FROM public.users WHERE ($1::uuid IS NULL OR id > $1) ORDER BY id ASC LIMIT $2\";"
    ));
    assert!(users.contains("#[derive(Debug, Clone, sqlx::FromRow)]\npub struct User {"));
    assert!(users.contains("    #[sqlx(rename = \"type\")]\n    pub r#type: Option<String>,\n"));
    assert!(users.contains(
        "    pub created_at: sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>,\n"
    ));
    assert!(users.contains("pub struct CreateUserParams {\n    pub email: String,\n"));
    assert!(users.contains("pub struct UserRepository {\n    pool: sqlx::PgPool,\n    retry: RetryConfig,\n}"));
    assert!(users.contains(
        "    pub async fn get(&self, id: sqlx::types::Uuid) -> Result<User, RepoError> {\n"
    ));
    assert!(users.contains(
        "        if result.rows_affected() == 0 {\n            \
         return Err(RepoError::not_found(\"delete\", ENTITY));\n"
    ));
    assert!(users.contains("            |row: &User| row.id,\n"));
    assert!(users.contains("    pub async fn list_paginated_with_retry(\n"));
}

#[test]
fn test_entity_methods_in_order() {
    let plan = plan(snapshot());
    let units = Generator::new(&plan).units();
    let posts = units.iter().find(|u| u.name == "Post").expect("Post unit");

    assert_eq!(
        posts.operations,
        vec![
            "create",
            "get",
            "update",
            "delete",
            "list",
            "list_paginated",
            "create_with_retry",
            "get_with_retry",
            "update_with_retry",
            "delete_with_retry",
            "list_with_retry",
            "list_paginated_with_retry",
        ]
    );
}

#[test]
fn test_array_column_and_caller_supplied_key() {
    let files = render(&plan(snapshot()));
    let posts = get_file(&files, "posts.rs");

    assert!(posts.contains("    pub tags: Vec<String>,\n"));
    assert!(posts.contains(
        "pub struct CreatePostParams {\n    pub id: sqlx::types::Uuid,\n    pub author_id: sqlx::types::Uuid,\n"
    ));
    assert!(posts.contains(
        "\"UPDATE public.posts SET author_id = $2, title = $3, tags = $4, published = $5 WHERE id = $1"
    ));
}

#[test]
fn test_query_file() {
    let files = render(&plan(snapshot()));
    let queries = get_file(&files, "users_queries.rs");

    assert!(queries.contains("const ENTITY: &str = \"UsersQueries\";"));
    assert!(queries.contains("pub struct GetUserByEmailRow {"));
    assert!(!queries.contains("DeactivateUserRow"));
    assert!(queries.contains(
        "    pub async fn get_user_by_email(&self, arg1: String) -> Result<GetUserByEmailRow, RepoError> {\n"
    ));
    assert!(queries.contains("const LIST_RECENT_USERS_SQL: &str = r#\"SELECT id, created_at\nFROM users\nORDER BY created_at DESC\"#;"));
    assert!(queries.contains("    pub created_at: Option<sqlx::types::chrono::DateTime<sqlx::types::chrono::Utc>>,\n"));
    assert!(queries.contains("            .map(|result| result.rows_affected())\n"));
    assert!(queries.contains("WHERE ($2::uuid IS NULL OR page.id > $2)\nORDER BY page.id ASC\nLIMIT $3"));
    assert!(queries.contains("                .bind(arg1)\n                .bind(after)\n"));
    assert!(queries.contains("|| self.get_user_by_email(arg1.clone())"));
    assert!(queries.contains("|| self.deactivate_user(arg1))"));
    assert!(queries.contains("|| self.search_users(arg1.clone(), request))"));
}

#[test]
fn test_invalid_key_table_is_not_generated() {
    let mut ctx = Pipeline::new()
        .run(snapshot(), rust_profile())
        .expect("pipeline failed");

    assert!(ctx.warnings().any(|d| d.message.contains("audit_log")));
    let plan = ctx.take_plan().expect("no plan");

    let files = render(&plan);
    assert!(files.iter().all(|(path, content)| {
        !path.contains("audit_log") && !content.contains("AuditLog")
    }));
}

#[test]
fn test_generation_is_deterministic() {
    let first = render(&plan(snapshot()));
    let second = render(&plan(snapshot()));
    assert_eq!(first, second);
}

#[test]
fn test_name_collision_fails_before_writing() {
    let mut snapshot = snapshot();
    snapshot.tables.push(
        Table::new("public", "user")
            .column(Column::new("id", "uuid", 1))
            .primary_key("id"),
    );

    let err = Pipeline::new()
        .run(snapshot, rust_profile())
        .err()
        .expect("collision must fail");
    assert!(format!("{:#}", err).contains("collides"));
}

#[test]
fn test_generate_writes_then_skips_unchanged() {
    let temp = TempDir::new().unwrap();
    let plan = plan(snapshot());
    let generator = Generator::new(&plan);

    let first = generator.generate(temp.path()).unwrap();
    assert_eq!(first.written.len(), 5);
    assert!(first.unchanged.is_empty());
    assert!(temp.path().join("users_queries.rs").exists());

    let second = generator.generate(temp.path()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.unchanged.len(), 5);
}

#[test]
fn test_query_named_after_constructor_fails_before_writing() {
    let mut snapshot = snapshot();
    snapshot.query_files[0].queries.push(Query {
        name: "New".to_string(),
        mode: QueryMode::Exec,
        sql: "DELETE FROM users".to_string(),
        params: Vec::new(),
        columns: Vec::new(),
        line: 15,
    });

    let err = Pipeline::new()
        .run(snapshot, rust_profile())
        .err()
        .expect("a query method named `new` must fail");
    assert!(format!("{:#}", err).contains("method 'new'"));
}

#[test]
fn test_unknown_type_column_round_trips_as_text_bytes() {
    let mut snapshot = snapshot();
    snapshot.tables = vec![
        Table::new("public", "moods")
            .column(Column::new("id", "uuid", 1).with_default())
            .column(Column::new("mood", "mood", 2).nullable())
            .primary_key("id"),
    ];
    snapshot.query_files.clear();

    let files = render(&plan(snapshot));
    let moods = get_file(&files, "moods.rs");

    assert!(moods.contains("    pub mood: Option<Vec<u8>>,\n"));
    assert!(moods.contains(
        "const INSERT_SQL: &str = \"INSERT INTO public.moods (mood) \
         VALUES (convert_from($1, 'UTF8')::mood) \
         RETURNING id, convert_to(mood::text, 'UTF8') AS mood\";"
    ));
    assert!(moods.contains(
        "const SELECT_SQL: &str = \"SELECT id, convert_to(mood::text, 'UTF8') AS mood \
         FROM public.moods WHERE id = $1\";"
    ));
}
