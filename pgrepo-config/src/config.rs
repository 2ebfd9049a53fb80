//! Configuration types for pgrepo.toml.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::{Error, Result};

/// Root configuration for pgrepo.toml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection and schema settings
    pub database: DatabaseConfig,

    /// Which tables take part in table-based generation
    #[serde(default)]
    pub tables: TableFilter,

    /// Where annotated SQL files live
    #[serde(default)]
    pub queries: QueriesConfig,

    /// Output package
    pub output: OutputConfig,

    /// Defaults baked into the generated `DEFAULT_RETRY`
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string; takes precedence over `url_env`
    pub url: Option<String>,

    /// Environment variable holding the connection string
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Schema to introspect
    #[serde(default = "default_schema")]
    pub schema: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Resolve the connection string from the file or the environment.
    pub fn resolve_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        std::env::var(&self.url_env).map_err(|_| {
            Box::new(Error::MissingDatabaseUrl {
                env: self.url_env.clone(),
            })
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_url_env() -> String {
    "DATABASE_URL".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

/// Include/exclude lists of table names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableFilter {
    /// Tables to generate; empty means every base table in the schema
    #[serde(default)]
    pub include: Vec<String>,

    /// Tables to leave out
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl TableFilter {
    /// Whether a table passes the filter.
    pub fn matches(&self, table: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|t| t == table);
        included && !self.exclude.iter().any(|t| t == table)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueriesConfig {
    /// Directory scanned for `*.sql` files
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving the generated package
    pub dir: PathBuf,

    /// Package (module) name
    #[serde(default = "default_package")]
    pub package: String,
}

fn default_package() -> String {
    "repo".to_string()
}

/// Retry defaults for generated repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Total attempts including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5000
}
