//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: always fails; recommendations fall back to the static set.
//! - **[`OpenAIProvider`]**: calls an OpenAI-compatible `/embeddings` endpoint.
//! - **[`OllamaProvider`]**: calls a local Ollama instance's `/api/embed` endpoint.
//!
//! Providers are built once by [`create_provider`] and shared by `Arc`. The
//! [`EmbeddingResolver`] turns a [`Bottle`](crate::models::Bottle) into
//! descriptive text and asks the provider for its vector, optionally through
//! an [`EmbeddingCache`].
//!
//! # Retry Strategy
//!
//! `max_retries` defaults to 0: a failed call fails the request. When raised,
//! the HTTP providers back off exponentially on transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

mod cache;
mod resolver;

pub use cache::EmbeddingCache;
pub use resolver::{bottle_description, EmbeddingResolver};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_DEFAULT_MODEL: &str = "text-embedding-ada-002";
const OPENAI_DEFAULT_DIMS: usize = 1536;
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// A text → vector capability.
///
/// One call embeds one text. Implementations must be safe to call
/// concurrently; the matcher fans out one call per catalog candidate.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-ada-002"`).
    fn model_name(&self) -> &str;
    /// Returns the expected vector length, or `0` when not known up front.
    fn dims(&self) -> usize;
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

// ============ Disabled Provider ============

/// Used when `embedding.provider = "disabled"`. Every call fails.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::provider("embedding provider is disabled"))
    }
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST {url}/embeddings`. The key comes from `embedding.api_key` or
/// the `OPENAI_API_KEY` environment variable and is held by this client
/// only.
pub struct OpenAIProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => std::env::var("OPENAI_API_KEY").map_err(|_| {
                anyhow::anyhow!("embedding.api_key not set and OPENAI_API_KEY not in environment")
            })?,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config
                .url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            dims: config.dims.unwrap_or(OPENAI_DEFAULT_DIMS),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let json = post_json(
            &self.client,
            &url,
            Some(&self.api_key),
            &body,
            self.max_retries,
            "OpenAI",
        )
        .await?;
        parse_openai_response(&json)
    }
}

/// Pull the single `data[0].embedding` array out of an OpenAI response.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| Error::provider("Invalid OpenAI response: missing data array"))?;

    if data.len() != 1 {
        return Err(Error::provider(format!(
            "Invalid OpenAI response: expected 1 embedding, got {}",
            data.len()
        )));
    }

    let embedding = data[0]
        .get("embedding")
        .ok_or_else(|| Error::provider("Invalid OpenAI response: missing embedding"))?;
    to_vector(embedding, "OpenAI")
}

// ============ Ollama Provider ============

/// Embedding provider using a local Ollama instance.
///
/// Calls `POST /api/embed` on the configured URL (default: `http://localhost:11434`).
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for Ollama provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config
                .url
                .clone()
                .unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            model,
            dims: config.dims.unwrap_or(0),
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });
        let url = format!("{}/api/embed", self.url.trim_end_matches('/'));
        let json = post_json(&self.client, &url, None, &body, self.max_retries, "Ollama").await?;
        parse_ollama_response(&json)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| Error::provider("Invalid Ollama response: missing embeddings array"))?;

    match embeddings.as_slice() {
        [only] => to_vector(only, "Ollama"),
        other => Err(Error::provider(format!(
            "Invalid Ollama response: expected 1 embedding, got {}",
            other.len()
        ))),
    }
}

// ============ Shared HTTP plumbing ============

fn to_vector(value: &serde_json::Value, label: &str) -> Result<Vec<f32>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::provider(format!("Invalid {label} response: embedding is not an array")))?;

    items
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| Error::provider(format!("Invalid {label} response: non-numeric value")))
        })
        .collect()
}

/// POST a JSON body and return the parsed JSON response, retrying
/// transient failures up to `max_retries` times.
async fn post_json(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
    max_retries: u32,
    label: &str,
) -> Result<serde_json::Value> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, 8s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tracing::warn!(attempt, ?delay, provider = label, "retrying embedding request");
            tokio::time::sleep(delay).await;
        }

        let mut req = client.post(url).json(body);
        if let Some(key) = bearer {
            req = req.bearer_auth(key);
        }

        match req.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response.json::<serde_json::Value>().await.map_err(|e| {
                        Error::provider(format!("Invalid {label} response: {e}"))
                    });
                }

                let body_text = response.text().await.unwrap_or_default();
                let err = Error::provider(format!("{label} API error {status}: {body_text}"));

                // Rate limited or server error, retry
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(err);
                    continue;
                }

                return Err(err);
            }
            Err(e) => {
                last_err = Some(Error::provider(format!("{label} request failed: {e}")));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::provider("Embedding failed after retries")))
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
/// | `"ollama"` | [`OllamaProvider`] |
///
/// ```rust
/// # use dram::config::EmbeddingConfig;
/// # use dram::embedding::create_provider;
/// let config = EmbeddingConfig::default(); // provider = "disabled"
/// let provider = create_provider(&config).unwrap();
/// assert_eq!(provider.model_name(), "disabled");
/// ```
pub fn create_provider(config: &EmbeddingConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        other => anyhow::bail!("Unknown embedding provider: {}", other),
    }
}
