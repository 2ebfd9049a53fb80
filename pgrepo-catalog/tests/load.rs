//! Snapshot loading against an in-memory catalog.

use std::{fs, path::Path};

use pgrepo_catalog::{
    CatalogError, LoadOptions, MemoryCatalog, StatementShape, TableSelection, load_snapshot,
};
use pgrepo_ir::{Column, Parameter, QueryMode, ResultColumn, Table, UnitKind};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn users() -> Table {
    Table::new("public", "users")
        .column(Column::new("id", "uuid", 1).with_default())
        .column(Column::new("email", "text", 2))
        .column(Column::new("bio", "text", 3).nullable())
        .primary_key("id")
}

fn posts() -> Table {
    Table::new("public", "posts")
        .column(Column::new("id", "uuid", 1))
        .column(Column::new("title", "text", 2))
        .primary_key("id")
}

fn uuid_param(position: usize) -> Parameter {
    Parameter {
        position,
        db_type: "uuid".to_string(),
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

fn options<'a>(queries_dir: Option<&'a Path>) -> LoadOptions<'a> {
    LoadOptions {
        schema: "public",
        selection: TableSelection::default(),
        queries_dir,
    }
}

#[tokio::test]
async fn test_tables_are_sorted_and_filtered() {
    let catalog = MemoryCatalog::new()
        .with_table(users())
        .with_table(posts())
        .with_table(Table::new("audit", "events"));
    let exclude = vec!["posts".to_string()];

    let snapshot = load_snapshot(
        &catalog,
        &LoadOptions {
            schema: "public",
            selection: TableSelection::new(&[], &exclude),
            queries_dir: None,
        },
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let names: Vec<_> = snapshot.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["users"]);
    assert_eq!(snapshot.schema, "public");
}

#[tokio::test]
async fn test_empty_schema_is_fatal() {
    let catalog = MemoryCatalog::new().with_table(users());

    let err = load_snapshot(
        &catalog,
        &LoadOptions {
            schema: "billing",
            selection: TableSelection::default(),
            queries_dir: None,
        },
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CatalogError::SchemaNotFound { schema } if schema == "billing"));
}

#[tokio::test]
async fn test_queries_are_described_in_file_and_declaration_order() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("users.sql"),
        "-- name: GetUser :one\nSELECT id, email FROM users WHERE id = $1;\n\n\
         -- name: DeleteUser :exec\nDELETE FROM users WHERE id = $1\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("posts.sql"),
        "-- name: ListPosts :many\nSELECT id, title FROM posts\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "-- name: Ignored :one\nSELECT 1\n").unwrap();

    let catalog = MemoryCatalog::new()
        .with_table(users())
        .with_table(posts())
        .with_statement(
            "SELECT id, email FROM users WHERE id = $1",
            StatementShape {
                params: vec![uuid_param(1)],
                columns: vec![column("id", "uuid", false), column("email", "text", false)],
            },
        )
        .with_statement(
            "DELETE FROM users WHERE id = $1",
            StatementShape {
                params: vec![uuid_param(1)],
                columns: Vec::new(),
            },
        )
        .with_statement(
            "SELECT id, title FROM posts",
            StatementShape {
                params: Vec::new(),
                columns: vec![column("id", "uuid", false), column("title", "text", true)],
            },
        );

    let snapshot = load_snapshot(&catalog, &options(Some(dir.path())), &CancellationToken::new())
        .await
        .unwrap();

    let files: Vec<_> = snapshot.query_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(files, vec!["posts", "users"]);

    let users = &snapshot.query_files[1];
    assert_eq!(users.queries.len(), 2);
    assert_eq!(users.queries[0].name, "GetUser");
    assert_eq!(users.queries[0].mode, QueryMode::One);
    assert_eq!(users.queries[0].params, vec![uuid_param(1)]);
    assert_eq!(users.queries[1].mode, QueryMode::Exec);
    assert!(snapshot.skipped.is_empty());
    assert_eq!(snapshot.query_count(), 3);
}

#[tokio::test]
async fn test_rejected_query_is_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("users.sql"),
        "-- name: Broken :many\nSELECT nope FROM users\n\
         -- name: CountUsers :one\nSELECT count(*) AS total FROM users\n",
    )
    .unwrap();

    let catalog = MemoryCatalog::new()
        .with_table(users())
        .with_rejected("SELECT nope FROM users", "column \"nope\" does not exist")
        .with_statement(
            "SELECT count(*) AS total FROM users",
            StatementShape {
                params: Vec::new(),
                columns: vec![column("total", "int8", true)],
            },
        );

    let snapshot = load_snapshot(&catalog, &options(Some(dir.path())), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.query_count(), 1);
    assert_eq!(snapshot.skipped.len(), 1);
    assert_eq!(snapshot.skipped[0].kind, UnitKind::Query);
    assert_eq!(snapshot.skipped[0].name, "Broken");
    assert!(snapshot.skipped[0].reason.contains("does not exist"));
}

#[tokio::test]
async fn test_row_query_without_columns_is_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("users.sql"),
        "-- name: Touch :many\nUPDATE users SET email = email\n",
    )
    .unwrap();

    let catalog = MemoryCatalog::new()
        .with_table(users())
        .with_statement("UPDATE users SET email = email", StatementShape::default());

    let snapshot = load_snapshot(&catalog, &options(Some(dir.path())), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.query_count(), 0);
    assert!(snapshot.skipped[0].reason.contains("returns no columns"));
}

#[tokio::test]
async fn test_exec_result_columns_are_dropped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("users.sql"),
        "-- name: ArchiveUser :exec\nDELETE FROM users WHERE id = $1 RETURNING id\n",
    )
    .unwrap();

    let catalog = MemoryCatalog::new().with_table(users()).with_statement(
        "DELETE FROM users WHERE id = $1 RETURNING id",
        StatementShape {
            params: vec![uuid_param(1)],
            columns: vec![column("id", "uuid", false)],
        },
    );

    let snapshot = load_snapshot(&catalog, &options(Some(dir.path())), &CancellationToken::new())
        .await
        .unwrap();

    assert!(snapshot.query_files[0].queries[0].columns.is_empty());
}

#[tokio::test]
async fn test_unsupported_mode_aborts_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("users.sql"), "-- name: GetUser :first\nSELECT 1\n").unwrap();

    let catalog = MemoryCatalog::new().with_table(users());

    let err = load_snapshot(&catalog, &options(Some(dir.path())), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::UnsupportedMode { .. }));
}

#[tokio::test]
async fn test_missing_queries_dir_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let catalog = MemoryCatalog::new().with_table(users());

    let err = load_snapshot(&catalog, &options(Some(&missing)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Io { .. }));
}

#[tokio::test]
async fn test_cancelled_token_aborts() {
    let catalog = MemoryCatalog::new().with_table(users());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = load_snapshot(&catalog, &options(None), &cancel).await.unwrap_err();
    assert!(matches!(err, CatalogError::Cancelled));
}
