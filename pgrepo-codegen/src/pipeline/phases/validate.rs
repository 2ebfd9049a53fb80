//! Validate phase - runs lints on the catalog snapshot.

use eyre::{Result, bail};
use pgrepo_ir::QueryMode;

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// A lint that inspects the compilation context for issues.
pub trait Lint: Send + Sync {
    /// The name of this lint.
    fn name(&self) -> &'static str;

    /// Check the context and add any diagnostics.
    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>);
}

/// Run `lints` and fail if any of them reported an error.
pub(crate) fn run_lints(
    phase: &str,
    lints: &[Box<dyn Lint>],
    ctx: &mut CompilationContext<'_>,
) -> Result<()> {
    let mut diagnostics = Vec::new();
    for lint in lints {
        lint.check(ctx, &mut diagnostics);
    }
    ctx.diagnostics.extend(diagnostics);

    if ctx.has_errors() {
        let messages: Vec<String> = ctx.errors().map(|d| format!("  {}", d)).collect();
        bail!(
            "{} failed with {} error(s):\n{}",
            phase,
            ctx.error_count(),
            messages.join("\n")
        );
    }

    Ok(())
}

/// Phase that lints the snapshot.
///
/// The built-in lints only warn: tables and queries they flag are left out
/// of the plan by `LowerPhase`.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Create a new validate phase with default lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(SkippedUnitLint),
                Box::new(PrimaryKeyLint),
                Box::new(PaginationKeyLint),
                Box::new(UnknownTypeLint),
            ],
        }
    }

    /// Create a validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    /// Add a custom lint to the validation phase.
    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check tables and queries can be generated"
    }

    fn run(&self, ctx: &mut CompilationContext<'_>) -> Result<()> {
        run_lints("validation", &self.lints, ctx)
    }
}

// ============================================================================
// Built-in lints
// ============================================================================

/// Reports units the catalog loader already dropped.
pub struct SkippedUnitLint;

impl Lint for SkippedUnitLint {
    fn name(&self) -> &'static str {
        "skipped-unit"
    }

    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for unit in &ctx.snapshot.skipped {
            diagnostics.push(
                Diagnostic::warning(
                    "validate",
                    format!("{} '{}' skipped: {}", unit.kind, unit.name, unit.reason),
                )
                .at(&unit.name),
            );
        }
    }
}

/// Warns about tables without a single-column UUID primary key.
pub struct PrimaryKeyLint;

impl Lint for PrimaryKeyLint {
    fn name(&self) -> &'static str {
        "primary-key"
    }

    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for table in &ctx.snapshot.tables {
            if let Err(issue) = table.key_column() {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!("table '{}' skipped: {}", table.name, issue),
                    )
                    .at(format!("{}.{}", table.schema, table.name)),
                );
            }
        }
    }
}

/// Warns about `:paginated` queries with no column to page by.
pub struct PaginationKeyLint;

impl Lint for PaginationKeyLint {
    fn name(&self) -> &'static str {
        "pagination-key"
    }

    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for file in &ctx.snapshot.query_files {
            for query in &file.queries {
                if query.mode == QueryMode::Paginated && query.pagination_key().is_none() {
                    diagnostics.push(
                        Diagnostic::warning(
                            "validate",
                            format!(
                                "query '{}' skipped: :paginated queries need a non-null uuid result column",
                                query.name
                            ),
                        )
                        .at(format!("{}:{}", file.path, query.line)),
                    );
                }
            }
        }
    }
}

/// Warns about types that fall back to the opaque representation.
pub struct UnknownTypeLint;

impl UnknownTypeLint {
    fn report(
        ctx: &CompilationContext<'_>,
        what: String,
        db_type: &str,
        location: String,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if !ctx.profile.mapper.map_type(db_type, false, false).fallback {
            return;
        }
        let opaque = ctx.profile.mapper.opaque_type().name;
        tracing::warn!(%what, db_type, opaque, "unknown database type");
        diagnostics.push(
            Diagnostic::warning(
                "validate",
                format!("{} has unknown type '{}', mapped to {}", what, db_type, opaque),
            )
            .at(location),
        );
    }
}

impl Lint for UnknownTypeLint {
    fn name(&self) -> &'static str {
        "unknown-type"
    }

    fn check(&self, ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for table in ctx.snapshot.tables.iter().filter(|t| t.key_column().is_ok()) {
            for column in &table.columns {
                Self::report(
                    ctx,
                    format!("column '{}.{}'", table.name, column.name),
                    &column.db_type,
                    format!("{}.{}", table.schema, table.name),
                    diagnostics,
                );
            }
        }

        for file in &ctx.snapshot.query_files {
            for query in &file.queries {
                let location = format!("{}:{}", file.path, query.line);
                for param in &query.params {
                    Self::report(
                        ctx,
                        format!("parameter ${} of '{}'", param.position, query.name),
                        &param.db_type,
                        location.clone(),
                        diagnostics,
                    );
                }
                for column in &query.columns {
                    Self::report(
                        ctx,
                        format!("result column '{}' of '{}'", column.name, query.name),
                        &column.db_type,
                        location.clone(),
                        diagnostics,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pgrepo_ir::{Column, SkippedUnit, Table};

    use super::*;
    use crate::testing::{TestMapper, query, snapshot, test_profile, text_column, users, uuid_column};

    fn check(lint: &dyn Lint, ctx: &CompilationContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        lint.check(ctx, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_primary_key_lint() {
        let composite = Table::new("public", "memberships")
            .column(Column::new("user_id", "uuid", 1))
            .column(Column::new("group_id", "uuid", 2))
            .primary_key("user_id")
            .primary_key("group_id");
        let serial = Table::new("public", "legacy")
            .column(Column::new("id", "int8", 1))
            .primary_key("id");
        let ctx = CompilationContext::new(
            snapshot(vec![composite, serial, users()], Vec::new()),
            test_profile(&TestMapper),
        );

        let diagnostics = check(&PrimaryKeyLint, &ctx);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.severity.is_warning()));
        assert!(diagnostics[0].message.contains("composite primary key (user_id, group_id)"));
        assert!(diagnostics[1].message.contains("expected uuid"));
        assert_eq!(diagnostics[1].location.as_deref(), Some("public.legacy"));
    }

    #[test]
    fn test_pagination_key_lint() {
        let ctx = CompilationContext::new(
            snapshot(
                vec![users()],
                vec![
                    query("ListEmails", QueryMode::Paginated, vec![text_column("email")]),
                    query("ListIds", QueryMode::Paginated, vec![uuid_column("id", false)]),
                ],
            ),
            test_profile(&TestMapper),
        );

        let diagnostics = check(&PaginationKeyLint, &ctx);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("ListEmails"));
        assert_eq!(diagnostics[0].location.as_deref(), Some("queries/users.sql:1"));
    }

    #[test]
    fn test_unknown_type_lint() {
        let table = users().column(Column::new("mood", "mood", 5));
        let ctx = CompilationContext::new(snapshot(vec![table], Vec::new()), test_profile(&TestMapper));

        let diagnostics = check(&UnknownTypeLint, &ctx);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "column 'users.mood' has unknown type 'mood', mapped to Vec<u8>"
        );
    }

    #[test]
    fn test_skipped_units_become_warnings() {
        let mut snap = snapshot(vec![users()], Vec::new());
        snap.skipped.push(SkippedUnit::query("Broken", "column \"nope\" does not exist"));
        let ctx = CompilationContext::new(snap, test_profile(&TestMapper));

        let diagnostics = check(&SkippedUnitLint, &ctx);

        assert_eq!(
            diagnostics[0].message,
            "query 'Broken' skipped: column \"nope\" does not exist"
        );
    }

    #[test]
    fn test_validate_phase_with_errors() {
        struct AlwaysErrorLint;
        impl Lint for AlwaysErrorLint {
            fn name(&self) -> &'static str {
                "always-error"
            }
            fn check(&self, _ctx: &CompilationContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::error("test", "forced error"));
            }
        }

        let mut ctx = CompilationContext::new(snapshot(vec![users()], Vec::new()), test_profile(&TestMapper));

        let result = ValidatePhase::empty().with_lint(AlwaysErrorLint).run(&mut ctx);

        let message = result.unwrap_err().to_string();
        assert!(message.contains("1 error(s)"));
        assert!(message.contains("forced error"));
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_validate_phase_warnings_allowed() {
        let mut ctx = CompilationContext::new(
            snapshot(vec![users(), Table::new("public", "logs")], Vec::new()),
            test_profile(&TestMapper),
        );

        ValidatePhase::new().run(&mut ctx).unwrap();

        assert!(ctx.has_warnings());
        assert!(!ctx.has_errors());
    }
}
