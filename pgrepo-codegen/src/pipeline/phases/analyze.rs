//! Analyze phase - checks the plan for identifier collisions.

use eyre::Result;
use indexmap::IndexMap;

use super::validate::{Lint, run_lints};
use crate::{
    pipeline::{CompilationContext, Diagnostic, Phase},
    plan::FieldPlan,
};

/// Phase that lints the lowered plan. Any error here aborts the run before
/// a single file is written.
///
/// Must run after `LowerPhase`.
pub struct AnalyzePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl AnalyzePhase {
    pub fn new() -> Self {
        Self {
            lints: vec![Box::new(DuplicateIdentifierLint)],
        }
    }
}

impl Default for AnalyzePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn description(&self) -> &'static str {
        "Reject plans whose generated names collide"
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()> {
        if ctx.plan.is_none() {
            eyre::bail!("generation plan not set - AnalyzePhase must run after LowerPhase");
        }
        run_lints("analysis", &self.lints, ctx)
    }
}

/// Names claimed within one scope, with who claimed them first.
struct Scope<'d> {
    what: &'static str,
    claimed: IndexMap<String, String>,
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl<'d> Scope<'d> {
    fn new(what: &'static str, diagnostics: &'d mut Vec<Diagnostic>) -> Self {
        Self {
            what,
            claimed: IndexMap::new(),
            diagnostics,
        }
    }

    fn reserve(&mut self, names: &[&str], owner: &str) {
        for name in names {
            self.claimed.insert(name.to_string(), owner.to_string());
        }
    }

    fn claim(&mut self, name: &str, owner: String) {
        if let Some(first) = self.claimed.get(name) {
            self.diagnostics.push(
                Diagnostic::error(
                    "analyze",
                    format!(
                        "{} '{}' for {} collides with {}",
                        self.what, name, owner, first
                    ),
                )
                .at(owner),
            );
        } else {
            self.claimed.insert(name.to_string(), owner);
        }
    }

    fn claim_fields(&mut self, fields: &[FieldPlan], owner: &str) {
        for field in fields {
            self.claim(&field.ident, format!("column '{}' of {}", field.column, owner));
        }
    }
}

/// Reports two units that would produce the same generated identifier.
///
/// Scopes checked: package-level type and module names (including names the
/// support files take), fields of each record, and methods of each query set.
pub struct DuplicateIdentifierLint;

impl Lint for DuplicateIdentifierLint {
    fn name(&self) -> &'static str {
        "duplicate-identifier"
    }

    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let Some(plan) = &ctx.plan else {
            return;
        };
        let support = ctx.profile.support_names;

        let mut modules = Scope::new("module", diagnostics);
        modules.reserve(support, "a support file");
        for entity in &plan.entities {
            modules.claim(&entity.file_stem, format!("table '{}'", entity.table));
        }
        for set in &plan.query_sets {
            modules.claim(&set.file_stem, format!("query file '{}'", set.source));
        }

        let mut types = Scope::new("type", diagnostics);
        types.reserve(support, "the runtime");
        for entity in &plan.entities {
            let owner = format!("table '{}'", entity.table);
            for name in [
                &entity.entity,
                &entity.repository,
                &entity.create_params,
                &entity.update_params,
            ] {
                types.claim(name, owner.clone());
            }
        }
        for set in &plan.query_sets {
            types.claim(&set.type_name, format!("query file '{}'", set.source));
            for query in &set.queries {
                if let Some(row) = &query.row {
                    types.claim(row, format!("query '{}'", query.name));
                }
            }
        }

        for entity in &plan.entities {
            Scope::new("field", diagnostics)
                .claim_fields(&entity.fields, &format!("table '{}'", entity.table));
        }

        for set in &plan.query_sets {
            let mut methods = Scope::new("method", diagnostics);
            methods.reserve(ctx.profile.support_methods, "a generated method");
            for query in &set.queries {
                let owner = format!("query '{}' in {}", query.name, set.source);
                methods.claim(&query.method, owner.clone());
                methods.claim(&query.retry_method, owner);
            }

            for query in &set.queries {
                Scope::new("field", diagnostics)
                    .claim_fields(&query.fields, &format!("query '{}'", query.name));
            }
        }
    }
}
