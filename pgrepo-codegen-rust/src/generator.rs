use std::path::Path;

use pgrepo_codegen::{
    GenerationPlan,
    language::{GeneratedUnit, LanguageCodegen, LanguageProfile, UnitRole},
};
use pgrepo_core::{File, GeneratedFile};

use crate::{
    RUST_NAMING, RustTypeMapper,
    files::{EntityRs, ModRs, QueriesRs, RetryDefaults, RuntimeRs},
};

/// Module and type names the package root already takes.
pub const SUPPORT_NAMES: &[&str] = &[
    "mod",
    "runtime",
    "ErrorKind",
    "InvalidCursor",
    "Page",
    "PageRequest",
    "RepoError",
    "RetryConfig",
];

/// Methods the repository and query-set impls define themselves.
pub const SUPPORT_METHODS: &[&str] = &["new", "pool"];

/// Naming and type rules for Rust output.
pub fn rust_profile() -> LanguageProfile<'static> {
    LanguageProfile {
        naming: RUST_NAMING,
        mapper: &RustTypeMapper,
        support_names: SUPPORT_NAMES,
        support_methods: SUPPORT_METHODS,
    }
}

/// Rust code generator that renders sqlx repositories from a plan.
pub struct Generator<'a> {
    plan: &'a GenerationPlan,
    package: String,
    retry: RetryDefaults,
}

impl<'a> Generator<'a> {
    pub fn new(plan: &'a GenerationPlan) -> Self {
        Self {
            plan,
            package: "repo".to_string(),
            retry: RetryDefaults::default(),
        }
    }

    /// Module name the package is mounted under.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryDefaults) -> Self {
        self.retry = retry;
        self
    }

    fn unit(
        role: UnitRole,
        name: &str,
        operations: Vec<String>,
        file: &dyn GeneratedFile,
    ) -> GeneratedUnit {
        let file = File::new(file.path(Path::new("")), file.render()).with_rules(file.rules());
        tracing::debug!(path = %file.path().display(), ?role, "rendered unit");
        GeneratedUnit {
            role,
            name: name.to_string(),
            operations,
            file,
        }
    }
}

impl LanguageCodegen for Generator<'_> {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn units(&self) -> Vec<GeneratedUnit> {
        let mut units = Vec::new();

        for entity in &self.plan.entities {
            let file = EntityRs::new(entity);
            units.push(Self::unit(
                UnitRole::Entity,
                &entity.entity,
                file.operations(),
                &file,
            ));
        }

        for set in &self.plan.query_sets {
            let file = QueriesRs::new(set);
            units.push(Self::unit(
                UnitRole::QuerySet,
                &set.type_name,
                file.operations(),
                &file,
            ));
        }

        units.push(Self::unit(
            UnitRole::Support,
            "mod",
            Vec::new(),
            &ModRs::new(self.plan, &self.package, self.retry),
        ));
        units.push(Self::unit(UnitRole::Support, "runtime", Vec::new(), &RuntimeRs));

        units.sort_by(|a, b| a.file.path().cmp(b.file.path()));
        units
    }
}
