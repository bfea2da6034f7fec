//! Bounded in-memory embedding cache.
//!
//! Keys combine the bottle id with a SHA-256 of the text that was embedded,
//! so a bottle whose name, proof, or price changes gets a fresh vector.
//! Concurrent lookups of the same key share a single provider call.

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::future::Future;

use crate::error::Result;
use crate::models::Bottle;

/// Process-wide text → vector memo with bounded capacity.
///
/// Cheap to clone; clones share the same storage.
#[derive(Clone)]
pub struct EmbeddingCache {
    inner: Cache<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Cache key for `bottle` embedded as `text`.
    pub fn key(bottle: &Bottle, text: &str) -> String {
        let digest = Sha256::digest(text.as_bytes());
        format!("{}:{}", bottle.id, hex::encode(digest))
    }

    #[cfg(test)]
    async fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.inner.get(key).await
    }

    /// Return the cached vector for `key`, or run `init` and cache its
    /// result. Failures are not cached.
    pub async fn get_or_embed<F>(&self, key: String, init: F) -> Result<Vec<f32>>
    where
        F: Future<Output = Result<Vec<f32>>>,
    {
        self.inner
            .try_get_with(key, init)
            .await
            .map_err(|e| (*e).clone())
    }
}
