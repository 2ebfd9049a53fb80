use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use pgrepo_codegen::GenerationPlan;
use pgrepo_core::GeneratedFile;

use super::GENERATED_HEADER;
use crate::{RawCode, RustFile};

/// Runtime items re-exported from the package root.
pub const RUNTIME_EXPORTS: &[&str] = &[
    "DEFAULT_PAGE_LIMIT",
    "ErrorKind",
    "InvalidCursor",
    "MAX_PAGE_LIMIT",
    "Page",
    "PageRequest",
    "RepoError",
    "RetryConfig",
    "with_deadline",
    "with_retry",
];

/// sqlx features every package needs, whatever its column types.
const BASE_FEATURES: &[&str] = &["derive", "postgres", "runtime-tokio", "uuid"];

/// Longest `pub use` kept on one line.
const MAX_LINE_WIDTH: usize = 100;

/// Values baked into the package's `DEFAULT_RETRY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDefaults {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

/// The package `mod.rs`: module tree, re-exports and retry defaults.
pub struct ModRs<'a> {
    plan: &'a GenerationPlan,
    package: &'a str,
    retry: RetryDefaults,
}

impl<'a> ModRs<'a> {
    pub fn new(plan: &'a GenerationPlan, package: &'a str, retry: RetryDefaults) -> Self {
        Self {
            plan,
            package,
            retry,
        }
    }

    /// `(module, exported types)` for every generated module, sorted.
    fn modules(&self) -> Vec<(&str, Vec<&str>)> {
        let mut modules: Vec<(&str, Vec<&str>)> = Vec::new();

        for entity in &self.plan.entities {
            let mut types = vec![entity.create_params.as_str()];
            if !entity.updatable.is_empty() {
                types.push(entity.update_params.as_str());
            }
            types.extend([entity.entity.as_str(), entity.repository.as_str()]);
            modules.push((entity.module.as_str(), types));
        }

        for set in &self.plan.query_sets {
            let mut types: Vec<&str> = set
                .queries
                .iter()
                .filter_map(|q| q.row.as_deref())
                .collect();
            types.push(set.type_name.as_str());
            modules.push((set.module.as_str(), types));
        }

        modules.push(("runtime", Vec::new()));
        modules.sort_by(|a, b| a.0.cmp(b.0));
        for (_, types) in &mut modules {
            types.sort_unstable();
        }
        modules
    }

    fn docs(&self) -> RawCode {
        let features: BTreeSet<&str> = BASE_FEATURES
            .iter()
            .copied()
            .chain(self.plan.required_features())
            .collect();
        let features: Vec<String> = features.iter().map(|f| format!("`{}`", f)).collect();

        RawCode::lines([
            format!("//! `{}`: PostgreSQL repositories.", self.package),
            "//!".to_string(),
            format!("//! Requires `sqlx` with features {},", features.join(", ")),
            "//! plus `base64`, `tokio` (`time`), `tokio-util`, `tracing` and `uuid`.".to_string(),
        ])
    }

    fn pub_use(module: &str, symbols: &[&str]) -> Vec<String> {
        let line = match symbols {
            [single] => format!("pub use {}::{};", module, single),
            _ => format!("pub use {}::{{{}}};", module, symbols.join(", ")),
        };
        if line.len() <= MAX_LINE_WIDTH || symbols.len() < 2 {
            return vec![line];
        }

        let mut lines = vec![format!("pub use {}::{{", module)];
        lines.extend(symbols.iter().map(|s| format!("    {},", s)));
        lines.push("};".to_string());
        lines
    }

    fn default_retry(&self) -> RawCode {
        let RetryDefaults {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        } = self.retry;

        RawCode::lines([
            "/// Retry policy configured at generation time.".to_string(),
            "pub const DEFAULT_RETRY: RetryConfig = RetryConfig::new(".to_string(),
            format!("    {},", max_attempts),
            format!("    std::time::Duration::from_millis({}),", base_delay_ms),
            format!("    std::time::Duration::from_millis({}),", max_delay_ms),
            ");".to_string(),
        ])
    }
}

impl GeneratedFile for ModRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("mod.rs")
    }

    fn render(&self) -> String {
        let modules = self.modules();

        let mods = RawCode::lines(modules.iter().map(|(module, _)| format!("pub mod {};", module)));

        let mut reexports = Self::pub_use("runtime", RUNTIME_EXPORTS);
        for (module, types) in &modules {
            if !types.is_empty() {
                reexports.extend(Self::pub_use(module, types));
            }
        }

        RustFile::new()
            .add(self.docs())
            .add(mods)
            .add(RawCode::lines(reexports))
            .add(self.default_retry())
            .render_with_header(GENERATED_HEADER)
    }
}
