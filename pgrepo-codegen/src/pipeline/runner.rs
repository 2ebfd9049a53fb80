//! Pipeline orchestrator.

use eyre::Result;
use pgrepo_ir::CatalogSnapshot;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{AnalyzePhase, LowerPhase, ValidatePhase},
};
use crate::language::LanguageProfile;

/// The compilation pipeline orchestrator.
///
/// Runs the built-in phases (validate, lower, analyze) followed by any
/// user phases, calling plugin hooks before and after each phase.
///
/// # Example
///
/// ```ignore
/// let ctx = Pipeline::new()
///     .plugin(TracingPlugin::default())
///     .run(snapshot, profile)?;
///
/// let plan = ctx.take_plan()?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with default built-in phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Compile a snapshot for one target language.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally, including when lints
    /// report errors.
    pub fn run<'a>(
        &self,
        snapshot: CatalogSnapshot,
        profile: LanguageProfile<'a>,
    ) -> Result<CompilationContext<'a>> {
        let mut ctx = CompilationContext::new(snapshot, profile);

        // Built-in phases in execution order
        let builtin_phases: Vec<Box<dyn Phase>> = vec![
            Box::new(ValidatePhase::new()),
            Box::new(LowerPhase),
            Box::new(AnalyzePhase::new()),
        ];

        for phase in builtin_phases.iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext<'_>) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
