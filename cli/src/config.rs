use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tm_filter::{StrategyDef, StrategyRegistry, DEFAULT_PER_PAGE};
use tracing::debug;

pub const ENDPOINT_ENV: &str = "TM_SEARCH_ENDPOINT";
pub const PER_PAGE_ENV: &str = "TM_SEARCH_PER_PAGE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Extra or overriding strategy definitions
    #[serde(default)]
    pub strategies: Vec<StrategyDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Config file if present (defaults otherwise), then environment overrides.
    pub fn resolve(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV) {
            self.backend.endpoint = endpoint;
        }
        if let Some(per_page) = lookup(PER_PAGE_ENV) {
            self.search.per_page = per_page
                .trim()
                .parse()
                .with_context(|| format!("{} must be a positive number", PER_PAGE_ENV))?;
        }
        Ok(())
    }

    /// Built-in strategies with the configured ones layered on top.
    pub fn registry(&self) -> StrategyRegistry {
        let mut registry = StrategyRegistry::builtin();
        registry.extend(self.strategies.iter().cloned());
        registry
    }
}

// Default functions
fn default_endpoint() -> String {
    "http://localhost:5001".to_string()
}

fn default_timeout() -> u64 {
    25
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}
