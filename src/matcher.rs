//! Per-bottle matching.
//!
//! Ranks every catalog candidate against one seed bottle:
//!
//! 1. Embed the seed once.
//! 2. For each candidate, concurrently: embed, cosine similarity vs the
//!    seed, generate a reason.
//! 3. Sort by similarity (desc). Ties keep catalog order.
//! 4. Truncate to `limit`.
//!
//! Any failure fails the whole batch. In-flight calls for other candidates
//! are dropped once the first error surfaces.

use futures::future::try_join_all;

use crate::embedding::EmbeddingResolver;
use crate::error::{Error, Result};
use crate::models::{Bottle, ScoredCandidate};
use crate::reason::generate_reason;
use crate::similarity::cosine_similarity;

/// Default number of matches kept per seed bottle.
pub const DEFAULT_LIMIT: usize = 5;

/// Find the `limit` catalog bottles most similar to `seed`.
///
/// The caller is responsible for excluding the seed from `catalog`.
pub async fn find_similar_bottles(
    resolver: &EmbeddingResolver,
    seed: &Bottle,
    catalog: &[Bottle],
    limit: usize,
) -> Result<Vec<ScoredCandidate>> {
    let seed_vec = resolver.resolve(seed).await?;

    let scored = try_join_all(catalog.iter().map(|candidate| {
        let seed_vec = &seed_vec;
        async move {
            let vec = resolver.resolve(candidate).await?;
            let similarity = cosine_similarity(seed_vec, &vec)?;
            Ok::<_, Error>(ScoredCandidate {
                bottle: candidate.clone(),
                similarity,
                reason: generate_reason(seed, candidate),
            })
        }
    }))
    .await?;

    let ranked = rank(scored, limit);
    tracing::debug!(
        seed_id = seed.id,
        candidates = catalog.len(),
        kept = ranked.len(),
        "ranked catalog"
    );
    Ok(ranked)
}

/// Stable sort by descending similarity, then truncate.
fn rank(mut scored: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProvider;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Looks vectors up by the bottle name at the front of the description.
    struct Table(HashMap<String, Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for Table {
        fn model_name(&self) -> &str {
            "table"
        }
        fn dims(&self) -> usize {
            0
        }
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let name = text.split(' ').next().unwrap_or_default();
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| Error::provider(format!("no vector for {name}")))
        }
    }

    fn resolver(entries: &[(&str, Vec<f32>)]) -> EmbeddingResolver {
        let table = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        EmbeddingResolver::new(Arc::new(Table(table)))
    }

    fn scored(id: i64, similarity: f32) -> ScoredCandidate {
        ScoredCandidate {
            bottle: Bottle::new(id, format!("b{id}"), "Bourbon"),
            similarity,
            reason: String::new(),
        }
    }

    #[test]
    fn test_rank_sorts_desc_and_truncates() {
        let ranked = rank(
            vec![scored(1, 0.1), scored(2, 0.9), scored(3, 0.5), scored(4, -0.2)],
            3,
        );
        let ids: Vec<i64> = ranked.iter().map(|c| c.bottle.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank(vec![scored(7, 0.5), scored(3, 0.5), scored(9, 0.5)], 5);
        let ids: Vec<i64> = ranked.iter().map(|c| c.bottle.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[tokio::test]
    async fn test_ten_candidates_limit_five() {
        let names: Vec<String> = (1..=10).map(|i| format!("c{i}")).collect();
        let mut entries: Vec<(&str, Vec<f32>)> = vec![("seed", vec![1.0, 0.0])];
        for (i, name) in names.iter().enumerate() {
            // Angle grows with i, so similarity shrinks with i.
            entries.push((name.as_str(), vec![1.0, i as f32]));
        }
        let resolver = resolver(&entries);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let catalog: Vec<Bottle> = names
            .iter()
            .enumerate()
            .rev()
            .map(|(i, n)| Bottle::new(i as i64 + 1, n.clone(), "Bourbon"))
            .collect();

        let out = find_similar_bottles(&resolver, &seed, &catalog, 5)
            .await
            .unwrap();
        assert_eq!(out.len(), 5);
        let ids: Vec<i64> = out.iter().map(|c| c.bottle.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for pair in out.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[tokio::test]
    async fn test_small_catalog_returns_all() {
        let resolver = resolver(&[
            ("seed", vec![1.0, 0.0]),
            ("a", vec![0.0, 1.0]),
            ("b", vec![1.0, 1.0]),
        ]);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let catalog = vec![Bottle::new(1, "a", "Rye"), Bottle::new(2, "b", "Bourbon")];

        let out = find_similar_bottles(&resolver, &seed, &catalog, DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bottle.id, 2);
        assert_eq!(out[1].bottle.id, 1);
        assert_eq!(
            out[0].reason,
            "Based on same spirit type (Bourbon), similar price range, similar proof as seed"
        );
    }

    #[tokio::test]
    async fn test_seed_failure_fails_matcher() {
        let resolver = resolver(&[("a", vec![1.0])]);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let catalog = vec![Bottle::new(1, "a", "Bourbon")];
        let err = find_similar_bottles(&resolver, &seed, &catalog, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_candidate_failure_fails_batch() {
        let resolver = resolver(&[("seed", vec![1.0]), ("a", vec![1.0])]);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let catalog = vec![Bottle::new(1, "a", "Bourbon"), Bottle::new(2, "missing", "Bourbon")];
        assert!(find_similar_bottles(&resolver, &seed, &catalog, 5)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_zero_vector_candidate_is_degenerate() {
        let resolver = resolver(&[("seed", vec![1.0, 0.0]), ("z", vec![0.0, 0.0])]);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let catalog = vec![Bottle::new(1, "z", "Bourbon")];
        let err = find_similar_bottles(&resolver, &seed, &catalog, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateVector));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let resolver = resolver(&[("seed", vec![1.0])]);
        let seed = Bottle::new(0, "seed", "Bourbon");
        let out = find_similar_bottles(&resolver, &seed, &[], 5).await.unwrap();
        assert!(out.is_empty());
    }
}
