//! Compilation context passed through pipeline phases.

use eyre::{Result, eyre};
use pgrepo_ir::CatalogSnapshot;

use super::diagnostic::{Diagnostic, Severity};
use crate::{language::LanguageProfile, plan::GenerationPlan};

/// Context passed through all pipeline phases.
///
/// Carries the snapshot being compiled, the target language rules, the plan
/// once lowered, and every diagnostic produced so far.
#[derive(Debug)]
pub struct CompilationContext<'a> {
    pub snapshot: CatalogSnapshot,
    pub profile: LanguageProfile<'a>,
    /// Populated by `LowerPhase`.
    pub plan: Option<GenerationPlan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CompilationContext<'a> {
    pub fn new(snapshot: CatalogSnapshot, profile: LanguageProfile<'a>) -> Self {
        Self {
            snapshot,
            profile,
            plan: None,
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    /// Add a diagnostic with a location.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// Take the plan out of the context.
    ///
    /// # Errors
    ///
    /// Fails if `LowerPhase` has not run.
    pub fn take_plan(&mut self) -> Result<GenerationPlan> {
        self.plan
            .take()
            .ok_or_else(|| eyre!("generation plan not set - did LowerPhase run?"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestMapper, test_profile};

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(CatalogSnapshot::default(), test_profile(&TestMapper));

        assert!(ctx.plan.is_none());
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = CompilationContext::new(CatalogSnapshot::default(), test_profile(&TestMapper));

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");
        ctx.add_info("test", "just info");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_take_plan_before_lowering_fails() {
        let mut ctx = CompilationContext::new(CatalogSnapshot::default(), test_profile(&TestMapper));
        assert!(ctx.take_plan().is_err());
    }
}
