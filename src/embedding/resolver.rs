//! Bottle → embedding vector.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::Bottle;

use super::{EmbeddingCache, EmbeddingProvider};

/// Text summary that gets embedded for a bottle.
///
/// `"{name} {spirit_type} {proof}proof ${avg_msrp}"`, with `unknown` for a
/// missing proof or price.
///
/// ```rust
/// use dram::embedding::bottle_description;
/// use dram::models::Bottle;
///
/// let b = Bottle {
///     proof: Some(107.0),
///     avg_msrp: Some(56.35),
///     ..Bottle::new(158, "Weller Antique 107", "Bourbon")
/// };
/// assert_eq!(bottle_description(&b), "Weller Antique 107 Bourbon 107proof $56.35");
/// ```
pub fn bottle_description(bottle: &Bottle) -> String {
    format!(
        "{} {} {}proof ${}",
        bottle.name,
        bottle.spirit_type,
        fmt_unknown(bottle.proof),
        fmt_unknown(bottle.avg_msrp)
    )
}

fn fmt_unknown(v: Option<f64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "unknown".to_string(),
    }
}

/// Resolves bottles to vectors through a shared provider.
///
/// Holds the provider explicitly; there is no global client. Attach an
/// [`EmbeddingCache`] with [`with_cache`](Self::with_cache) to avoid
/// re-embedding the same bottle within and across requests.
#[derive(Clone)]
pub struct EmbeddingResolver {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<EmbeddingCache>,
}

impl EmbeddingResolver {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Embed `bottle`'s description.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`] when the provider fails or returns a vector of
    /// the wrong length.
    pub async fn resolve(&self, bottle: &Bottle) -> Result<Vec<f32>> {
        let text = bottle_description(bottle);
        match &self.cache {
            Some(cache) => {
                let key = EmbeddingCache::key(bottle, &text);
                cache.get_or_embed(key, self.embed_text(bottle.id, &text)).await
            }
            None => self.embed_text(bottle.id, &text).await,
        }
    }

    async fn embed_text(&self, bottle_id: i64, text: &str) -> Result<Vec<f32>> {
        tracing::debug!(bottle_id, model = self.provider.model_name(), "embedding bottle");
        let vector = self.provider.embed(text).await?;

        let expected = self.provider.dims();
        if expected > 0 && vector.len() != expected {
            return Err(Error::provider(format!(
                "expected {} dimensions from {}, got {}",
                expected,
                self.provider.model_name(),
                vector.len()
            )));
        }
        Ok(vector)
    }
}
