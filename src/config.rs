//! TOML configuration.
//!
//! Every section is optional; a missing section takes its defaults, so an
//! empty file is a valid configuration (with embeddings disabled).
//!
//! ```toml
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-ada-002"
//! dims = 1536
//!
//! [recommend]
//! per_bottle_limit = 5
//! final_limit = 6
//! failure_policy = "all_or_nothing"
//!
//! [cache]
//! capacity = 10000
//!
//! [catalog]
//! path = "./data/bottles.json"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::recommend::FailurePolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Defaults only, for commands that run without a config file.
    pub fn minimal() -> Self {
        Self::default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// API key for hosted providers. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override (OpenAI-compatible endpoint or Ollama host).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            api_key: None,
            url: None,
            max_retries: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendConfig {
    #[serde(default = "default_per_bottle_limit")]
    pub per_bottle_limit: usize,
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            per_bottle_limit: default_per_bottle_limit(),
            final_limit: default_final_limit(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_per_bottle_limit() -> usize {
    5
}
fn default_final_limit() -> usize {
    6
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Maximum cached vectors. `0` disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./data/bottles.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct BarConfig {
    #[serde(default = "default_bar_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            base_url: default_bar_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bar_url() -> String {
    "https://services.baxus.co".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.recommend.per_bottle_limit == 0 {
        anyhow::bail!("recommend.per_bottle_limit must be >= 1");
    }
    if config.recommend.final_limit == 0 {
        anyhow::bail!("recommend.final_limit must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }

    if config.embedding.provider == "ollama" && config.embedding.model.is_none() {
        anyhow::bail!("embedding.model must be specified when provider is 'ollama'");
    }
    if config.embedding.dims == Some(0) {
        anyhow::bail!("embedding.dims must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.embedding.provider, "disabled");
        assert!(!cfg.embedding.is_enabled());
        assert_eq!(cfg.embedding.max_retries, 0);
        assert_eq!(cfg.recommend.per_bottle_limit, 5);
        assert_eq!(cfg.recommend.final_limit, 6);
        assert_eq!(cfg.recommend.failure_policy, FailurePolicy::AllOrNothing);
        assert_eq!(cfg.cache.capacity, 10_000);
        assert_eq!(cfg.bar.base_url, "https://services.baxus.co");
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
[embedding]
provider = "ollama"
model = "nomic-embed-text"
url = "http://localhost:11434"
max_retries = 2

[recommend]
per_bottle_limit = 3
final_limit = 4
failure_policy = "partial"

[cache]
capacity = 0
"#,
        )
        .unwrap();
        assert!(cfg.embedding.is_enabled());
        assert_eq!(cfg.embedding.model.as_deref(), Some("nomic-embed-text"));
        assert_eq!(cfg.embedding.max_retries, 2);
        assert_eq!(cfg.recommend.per_bottle_limit, 3);
        assert_eq!(cfg.recommend.failure_policy, FailurePolicy::Partial);
        assert_eq!(cfg.cache.capacity, 0);
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse_config("[embedding]\nprovider = \"magic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(parse_config("[recommend]\nper_bottle_limit = 0\n").is_err());
        assert!(parse_config("[recommend]\nfinal_limit = 0\n").is_err());
    }

    #[test]
    fn test_ollama_requires_model() {
        assert!(parse_config("[embedding]\nprovider = \"ollama\"\n").is_err());
    }

    #[test]
    fn test_example_config_parses_without_retries() {
        let cfg = parse_config(include_str!("../config/dram.example.toml")).unwrap();
        assert_eq!(cfg.embedding.provider, "openai");
        assert_eq!(cfg.embedding.max_retries, 0);
        assert_eq!(cfg.recommend.failure_policy, FailurePolicy::AllOrNothing);
    }
}
