//! SQL statements behind the generated repository methods.
//!
//! Every statement is fixed at generation time; only values are bound at
//! run time, in the order the helpers document.
//!
//! Columns of unknown type are read and written through their text form:
//! selected as `convert_to(col::text, 'UTF8')` and bound as
//! `convert_from($n, 'UTF8')::type`, so the opaque bytes decode on both sides.

use pgrepo_ir::quote_ident;

use crate::plan::{EntityPlan, FieldPlan};

fn column_list<'a>(fields: impl IntoIterator<Item = &'a FieldPlan>) -> String {
    fields
        .into_iter()
        .map(|f| quote_ident(&f.column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Columns as selected or returned.
fn select_list<'a>(fields: impl IntoIterator<Item = &'a FieldPlan>) -> String {
    fields
        .into_iter()
        .map(|f| {
            let column = quote_ident(&f.column);
            if f.ty.fallback {
                format!("convert_to({column}::text, 'UTF8') AS {column}")
            } else {
                column
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholder(field: &FieldPlan, position: usize) -> String {
    if field.ty.fallback {
        format!("convert_from(${}, 'UTF8')::{}", position, field.sql_type)
    } else {
        format!("${}", position)
    }
}

fn key(entity: &EntityPlan) -> String {
    quote_ident(&entity.key_field().column)
}

/// Binds: insertable columns in order.
pub fn insert(entity: &EntityPlan) -> String {
    let returning = select_list(&entity.fields);
    if entity.insertable.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            entity.qualified_name, returning
        );
    }

    let placeholders: Vec<String> = entity
        .insertable_fields()
        .enumerate()
        .map(|(i, f)| placeholder(f, i + 1))
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        entity.qualified_name,
        column_list(entity.insertable_fields()),
        placeholders.join(", "),
        returning
    )
}

/// Binds: key.
pub fn select_by_key(entity: &EntityPlan) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_list(&entity.fields),
        entity.qualified_name,
        key(entity)
    )
}

/// Binds: key, then updatable columns in order.
pub fn update(entity: &EntityPlan) -> String {
    let assignments: Vec<String> = entity
        .updatable_fields()
        .enumerate()
        .map(|(i, f)| format!("{} = {}", quote_ident(&f.column), placeholder(f, i + 2)))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = $1 RETURNING {}",
        entity.qualified_name,
        assignments.join(", "),
        key(entity),
        select_list(&entity.fields)
    )
}

/// Binds: key.
pub fn delete(entity: &EntityPlan) -> String {
    format!("DELETE FROM {} WHERE {} = $1", entity.qualified_name, key(entity))
}

/// No binds.
pub fn list(entity: &EntityPlan) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {} ASC",
        select_list(&entity.fields),
        entity.qualified_name,
        key(entity)
    )
}

/// Binds: key to resume after (nullable), probe size.
pub fn list_page(entity: &EntityPlan) -> String {
    let key = key(entity);
    format!(
        "SELECT {} FROM {} WHERE ($1::uuid IS NULL OR {key} > $1) ORDER BY {key} ASC LIMIT $2",
        select_list(&entity.fields),
        entity.qualified_name,
    )
}

/// Wrap a custom query so it can be scanned page by page on `key_column`.
///
/// Binds: the query's own `param_count` parameters, then the key to resume
/// after (nullable), then the probe size.
pub fn paginate_query(sql: &str, key_column: &str, param_count: usize) -> String {
    let after = param_count + 1;
    let limit = param_count + 2;
    let key = format!("page.{}", quote_ident(key_column));
    format!(
        "SELECT * FROM (\n{sql}\n) AS page\nWHERE (${after}::uuid IS NULL OR {key} > ${after})\nORDER BY {key} ASC\nLIMIT ${limit}"
    )
}
