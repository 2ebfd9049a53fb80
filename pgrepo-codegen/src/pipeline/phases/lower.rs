//! Lower phase - turns the snapshot into a [`GenerationPlan`].
//!
//! Every name and type decision is made here, once, so that lints and
//! renderers see the same identifiers.

use eyre::Result;
use pgrepo_ir::{CatalogSnapshot, Column, Query, QueryFile, Table};

use crate::{
    language::LanguageProfile,
    pipeline::{CompilationContext, Phase},
    plan::{EntityPlan, FieldPlan, GenerationPlan, ParamPlan, QueryPlan, QuerySetPlan},
};

/// Phase that builds the generation plan.
///
/// Tables without a usable primary key and `:paginated` queries without a
/// key column are left out; `ValidatePhase` has already warned about them.
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Build the generation plan"
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()> {
        let plan = lower_snapshot(&ctx.snapshot, &ctx.profile);
        tracing::debug!(
            entities = plan.entities.len(),
            query_sets = plan.query_sets.len(),
            "lowered snapshot"
        );
        ctx.plan = Some(plan);
        Ok(())
    }
}

/// Lower a snapshot into a plan.
pub fn lower_snapshot(snapshot: &CatalogSnapshot, profile: &LanguageProfile<'_>) -> GenerationPlan {
    GenerationPlan {
        entities: snapshot
            .tables
            .iter()
            .filter_map(|table| lower_table(table, profile))
            .collect(),
        query_sets: snapshot
            .query_files
            .iter()
            .filter_map(|file| lower_query_file(file, profile))
            .collect(),
    }
}

fn field(
    profile: &LanguageProfile<'_>,
    name: &str,
    db_type: &str,
    nullable: bool,
    is_array: bool,
) -> FieldPlan {
    FieldPlan {
        column: name.to_string(),
        ident: profile.naming.member_name(name),
        sql_type: if is_array {
            format!("{}[]", db_type)
        } else {
            db_type.to_string()
        },
        ty: profile.mapper.map_type(db_type, nullable, is_array),
    }
}

fn lower_table(table: &Table, profile: &LanguageProfile<'_>) -> Option<EntityPlan> {
    let key_name = table.key_column().ok()?.name.clone();
    let naming = &profile.naming;
    let entity = naming.entity_name(&table.name);

    let fields = table
        .columns
        .iter()
        .map(|c| field(profile, &c.name, &c.db_type, c.nullable, c.is_array))
        .collect();
    let key = table.columns.iter().position(|c| c.name == key_name)?;
    let position = |column: &Column| table.columns.iter().position(|c| c.name == column.name);
    let insertable = table.insertable_columns().filter_map(position).collect();
    let updatable = table.updatable_columns().filter_map(position).collect();

    Some(EntityPlan {
        table: table.name.clone(),
        qualified_name: table.qualified_name(),
        repository: naming.type_name(&format!("{}Repository", entity)),
        create_params: naming.type_name(&format!("Create{}Params", entity)),
        update_params: naming.type_name(&format!("Update{}Params", entity)),
        module: naming.member_name(&table.name),
        file_stem: naming.file_stem(&table.name),
        entity,
        fields,
        key,
        insertable,
        updatable,
    })
}

fn lower_query_file(file: &QueryFile, profile: &LanguageProfile<'_>) -> Option<QuerySetPlan> {
    let queries: Vec<QueryPlan> = file
        .queries
        .iter()
        .filter_map(|query| lower_query(query, profile))
        .collect();
    if queries.is_empty() {
        return None;
    }

    let naming = &profile.naming;
    let base = format!("{}_queries", file.name);
    Some(QuerySetPlan {
        name: file.name.clone(),
        source: file.path.clone(),
        type_name: naming.type_name(&base),
        module: naming.member_name(&base),
        file_stem: naming.file_stem(&base),
        queries,
    })
}

fn lower_query(query: &Query, profile: &LanguageProfile<'_>) -> Option<QueryPlan> {
    let key = query.pagination_key();
    if query.mode == pgrepo_ir::QueryMode::Paginated && key.is_none() {
        return None;
    }

    let naming = &profile.naming;
    let method = naming.file_stem(&query.name);
    let params = query
        .params
        .iter()
        .map(|p| ParamPlan {
            position: p.position,
            ident: format!("arg{}", p.position),
            // Describe never reports parameter nullability.
            ty: profile.mapper.map_type(&p.db_type, false, p.is_array),
        })
        .collect();
    let fields = query
        .columns
        .iter()
        .map(|c| field(profile, &c.name, &c.db_type, c.nullable, c.is_array))
        .collect();

    Some(QueryPlan {
        name: query.name.clone(),
        method: naming.safe_name(&method),
        retry_method: naming.safe_name(&format!("{}_with_retry", method)),
        mode: query.mode,
        sql: query.sql.clone(),
        params,
        row: query
            .mode
            .returns_rows()
            .then(|| naming.type_name(&format!("{}Row", query.name))),
        fields,
        key,
    })
}
