//! Configuration management for Enterprise Brain.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`BRAIN__` prefix, `__` separator, e.g. `BRAIN__STORE__URI`)
//! 2. Config file (`brain.toml` by default)
//! 3. Defaults

use serde::Deserialize;

use crate::error::{BrainError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrainConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Which graph store backend to use.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Neo4j,
    /// Process-local store; contents are lost on exit.
    Memory,
}

/// Graph store connection settings (`[store]`).
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    /// Upper bound for a single store round trip.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

/// Engine tuning (`[engine]`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum gaps closed per enrichment rule per run.
    #[serde(default = "default_enrich_limit")]
    pub enrich_limit: usize,

    /// Depth bound for causal explanations.
    #[serde(default = "default_explain_max_hops")]
    pub explain_max_hops: usize,

    /// Directory for the provenance journal. Journaling is off when unset.
    #[serde(default)]
    pub journal_dir: Option<String>,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "brain-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_query_timeout() -> u64 {
    10
}

fn default_enrich_limit() -> usize {
    5
}

fn default_explain_max_hops() -> usize {
    2
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enrich_limit: default_enrich_limit(),
            explain_max_hops: default_explain_max_hops(),
            journal_dir: None,
        }
    }
}

impl BrainConfig {
    /// Load from `{file_prefix}.toml` (optional) and `BRAIN__*` env vars.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("BRAIN")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .map_err(|e| BrainError::Config(e.to_string()))?;
        let loaded: BrainConfig = cfg
            .try_deserialize()
            .map_err(|e| BrainError::Config(e.to_string()))?;

        tracing::debug!(
            backend = ?loaded.store.backend,
            uri = %loaded.store.uri,
            enrich_limit = loaded.engine.enrich_limit,
            "Configuration loaded"
        );
        Ok(loaded)
    }
}
