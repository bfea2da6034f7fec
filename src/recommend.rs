//! Recommendation aggregation across a user's whole collection.
//!
//! # Algorithm
//!
//! 1. For every user bottle, concurrently run
//!    [`find_similar_bottles`] against the catalog minus that bottle.
//! 2. Concatenate the per-bottle lists in collection order.
//! 3. Deduplicate by bottle id. A repeated id keeps the position of its
//!    first appearance but takes the value (and reason) of its last.
//! 4. Truncate to `final_limit` and drop the similarity scores.
//!
//! [`Recommender::recommend`] never fails: any error from the pipeline
//! swaps the whole answer for [`fallback_recommendations`].

use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{Config, RecommendConfig};
use crate::embedding::{create_provider, EmbeddingCache, EmbeddingResolver};
use crate::error::Result;
use crate::fallback::fallback_recommendations;
use crate::matcher::{find_similar_bottles, DEFAULT_LIMIT};
use crate::models::{Bottle, Recommendation, ScoredCandidate};

/// Default size of the final recommendation list.
pub const DEFAULT_FINAL_LIMIT: usize = 6;

/// What to do when some seed bottles fail to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failure discards everything and serves the fallback.
    #[default]
    AllOrNothing,
    /// Failed seeds are skipped; fall back only if every seed failed.
    Partial,
}

/// Entry point for recommendations.
#[derive(Clone)]
pub struct Recommender {
    resolver: EmbeddingResolver,
    per_bottle_limit: usize,
    final_limit: usize,
    policy: FailurePolicy,
}

impl Recommender {
    pub fn new(resolver: EmbeddingResolver) -> Self {
        Self {
            resolver,
            per_bottle_limit: DEFAULT_LIMIT,
            final_limit: DEFAULT_FINAL_LIMIT,
            policy: FailurePolicy::default(),
        }
    }

    pub fn from_config(resolver: EmbeddingResolver, config: &RecommendConfig) -> Self {
        Self {
            resolver,
            per_bottle_limit: config.per_bottle_limit,
            final_limit: config.final_limit,
            policy: config.failure_policy,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(&self) -> &EmbeddingResolver {
        &self.resolver
    }

    pub fn per_bottle_limit(&self) -> usize {
        self.per_bottle_limit
    }

    /// Recommend bottles for `user_bottles` from `catalog`.
    ///
    /// Never fails. Errors are logged and the static fallback list is
    /// returned instead. The caller is not told which one it got.
    pub async fn recommend(&self, user_bottles: &[Bottle], catalog: &[Bottle]) -> Vec<Recommendation> {
        match self.try_recommend(user_bottles, catalog).await {
            Ok(recs) => recs,
            Err(e) => {
                tracing::warn!(error = %e, "recommendation pipeline failed, serving fallback");
                fallback_recommendations()
            }
        }
    }

    /// Like [`recommend`](Self::recommend) but surfaces the error.
    pub async fn try_recommend(
        &self,
        user_bottles: &[Bottle],
        catalog: &[Bottle],
    ) -> Result<Vec<Recommendation>> {
        let per_seed = user_bottles.iter().map(|seed| async move {
            let others: Vec<Bottle> = catalog
                .iter()
                .filter(|b| b.id != seed.id)
                .cloned()
                .collect();
            find_similar_bottles(&self.resolver, seed, &others, self.per_bottle_limit).await
        });

        let sets = match self.policy {
            FailurePolicy::AllOrNothing => try_join_all(per_seed).await?,
            FailurePolicy::Partial => {
                let results = join_all(per_seed).await;
                let mut sets = Vec::with_capacity(results.len());
                let mut last_err = None;
                for (seed, result) in user_bottles.iter().zip(results) {
                    match result {
                        Ok(set) => sets.push(set),
                        Err(e) => {
                            tracing::warn!(seed_id = seed.id, error = %e, "skipping seed bottle");
                            last_err = Some(e);
                        }
                    }
                }
                if sets.is_empty() {
                    if let Some(e) = last_err {
                        return Err(e);
                    }
                }
                sets
            }
        };

        let recs = merge(sets, self.final_limit);
        tracing::info!(
            seeds = user_bottles.len(),
            catalog = catalog.len(),
            recommendations = recs.len(),
            "recommendations ready"
        );
        Ok(recs)
    }
}

/// Construct a [`Recommender`] from configuration, attaching the cache when
/// `cache.capacity > 0`.
pub fn build_recommender(config: &Config) -> anyhow::Result<Recommender> {
    if !config.embedding.is_enabled() {
        tracing::warn!("embedding provider disabled; every request will get the fallback list");
    }
    let provider = create_provider(&config.embedding)?;
    let mut resolver = EmbeddingResolver::new(provider);
    if config.cache.capacity > 0 {
        resolver = resolver.with_cache(EmbeddingCache::new(config.cache.capacity));
    }
    Ok(Recommender::from_config(resolver, &config.recommend))
}

/// Flatten, dedupe by bottle id (first position, last value), truncate.
fn merge(sets: Vec<Vec<ScoredCandidate>>, limit: usize) -> Vec<Recommendation> {
    let mut ordered: Vec<Recommendation> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();

    for candidate in sets.into_iter().flatten() {
        let id = candidate.bottle.id;
        match positions.get(&id) {
            Some(&pos) => ordered[pos] = candidate.into(),
            None => {
                positions.insert(id, ordered.len());
                ordered.push(candidate.into());
            }
        }
    }

    ordered.truncate(limit);
    ordered
}
