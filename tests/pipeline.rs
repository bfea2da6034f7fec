//! End-to-end recommendation pipeline tests against an in-process provider.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dram::embedding::{EmbeddingCache, EmbeddingProvider, EmbeddingResolver};
use dram::error::{Error, Result};
use dram::fallback::fallback_recommendations;
use dram::matcher::find_similar_bottles;
use dram::models::Bottle;
use dram::recommend::{FailurePolicy, Recommender};

/// Deterministic provider: parses proof and price back out of the bottle
/// description and uses them as vector components.
struct FeatureProvider {
    calls: AtomicUsize,
}

impl FeatureProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FeatureProvider {
    fn model_name(&self) -> &str {
        "features"
    }
    fn dims(&self) -> usize {
        3
    }
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut proof = 0.0f32;
        let mut price = 0.0f32;
        for token in text.split_whitespace() {
            if let Some(p) = token.strip_suffix("proof") {
                proof = p.parse().unwrap_or(0.0);
            } else if let Some(p) = token.strip_prefix('$') {
                price = p.parse().unwrap_or(0.0);
            }
        }
        Ok(vec![1.0, proof / 100.0, price / 100.0])
    }
}

/// Fails every call.
struct Down;

#[async_trait]
impl EmbeddingProvider for Down {
    fn model_name(&self) -> &str {
        "down"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::provider("429 Too Many Requests"))
    }
}

fn bottle(id: i64, name: &str, spirit: &str, msrp: f64, proof: f64, brand: Option<i64>) -> Bottle {
    Bottle {
        avg_msrp: Some(msrp),
        proof: Some(proof),
        brand_id: brand,
        ..Bottle::new(id, name, spirit)
    }
}

fn catalog() -> Vec<Bottle> {
    vec![
        bottle(2, "Eagle Rare 10", "Bourbon", 40.0, 90.0, Some(9)),
        bottle(3, "Booker's", "Bourbon", 90.0, 126.0, Some(4)),
        bottle(4, "Laphroaig 10", "Scotch", 55.0, 86.0, Some(20)),
        bottle(5, "Wild Turkey 101", "Bourbon", 25.0, 101.0, Some(7)),
        bottle(6, "Four Roses SiB", "Bourbon", 45.0, 100.0, Some(11)),
        bottle(7, "Old Forester 1920", "Bourbon", 60.0, 115.0, Some(9)),
        bottle(8, "Rittenhouse Rye", "Rye", 30.0, 100.0, Some(3)),
        bottle(9, "Hibiki Harmony", "Japanese Whisky", 90.0, 86.0, Some(30)),
    ]
}

#[tokio::test]
async fn single_bottle_collection_end_to_end() {
    let user = vec![bottle(1, "Buffalo Trace", "Bourbon", 50.0, 100.0, Some(9))];
    let recommender = Recommender::new(EmbeddingResolver::new(FeatureProvider::new()));

    let recs = recommender.recommend(&user, &catalog()).await;

    assert!(!recs.is_empty());
    assert!(recs.len() <= 5);
    assert!(recs.iter().all(|r| r.bottle.id != 1));
    assert_ne!(recs, fallback_recommendations());
    assert!(recs.iter().all(|r| r.reason.ends_with("as Buffalo Trace")));
}

#[tokio::test]
async fn matcher_orders_by_similarity() {
    let resolver = EmbeddingResolver::new(FeatureProvider::new());
    let seed = bottle(1, "Buffalo Trace", "Bourbon", 50.0, 100.0, Some(9));

    let ranked = find_similar_bottles(&resolver, &seed, &catalog(), 5)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 5);
    for pair in ranked.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
    assert_eq!(ranked[0].bottle.id, 6);

    // Proof 100 vs 90 sits exactly on the window edge, so no proof clause.
    let eagle = ranked
        .iter()
        .find(|c| c.bottle.id == 2)
        .expect("Eagle Rare should rank in the top five");
    assert_eq!(
        eagle.reason,
        "Based on same spirit type (Bourbon), similar price range, same brand as Buffalo Trace"
    );

    let four_roses = &ranked[0];
    assert_eq!(
        four_roses.reason,
        "Based on same spirit type (Bourbon), similar price range, similar proof as Buffalo Trace"
    );
}

#[tokio::test]
async fn shared_candidate_takes_later_seeds_reason() {
    let user = vec![
        bottle(100, "Seed One", "Bourbon", 45.0, 100.0, None),
        bottle(200, "Seed Two", "Bourbon", 45.0, 100.0, None),
    ];
    let catalog = vec![bottle(42, "Shared", "Bourbon", 45.0, 100.0, None)];
    let recommender = Recommender::new(EmbeddingResolver::new(FeatureProvider::new()));

    let recs = recommender.recommend(&user, &catalog).await;

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].bottle.id, 42);
    assert_eq!(
        recs[0].reason,
        "Based on same spirit type (Bourbon), similar price range, similar proof as Seed Two"
    );
}

#[tokio::test]
async fn failing_provider_returns_literal_fallback() {
    let user = vec![bottle(1, "Buffalo Trace", "Bourbon", 50.0, 100.0, Some(9))];
    let recommender = Recommender::new(EmbeddingResolver::new(Arc::new(Down)));

    let recs = recommender.recommend(&user, &catalog()).await;

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].bottle.id, 158);
    assert_eq!(recs[0].bottle.name, "Weller Antique 107");
    assert_eq!(
        recs[0].reason,
        "Based on similar price range, same spirit type (Bourbon)"
    );
    assert_eq!(recs[1].bottle.id, 2803);
    assert_eq!(recs[1].bottle.name, "Weller Special Reserve");
    assert_eq!(
        recs[1].reason,
        "Based on same brand, same spirit type (Bourbon)"
    );

    let partial = recommender.with_failure_policy(FailurePolicy::Partial);
    assert_eq!(
        partial.recommend(&user, &catalog()).await,
        fallback_recommendations()
    );
}

#[tokio::test]
async fn cache_removes_repeat_calls_across_requests() {
    let provider = FeatureProvider::new();
    let resolver = EmbeddingResolver::new(provider.clone()).with_cache(EmbeddingCache::new(100));
    let recommender = Recommender::new(resolver);
    let user = vec![bottle(1, "Buffalo Trace", "Bourbon", 50.0, 100.0, Some(9))];

    let first = recommender.recommend(&user, &catalog()).await;
    let after_first = provider.calls.load(Ordering::SeqCst);
    let second = recommender.recommend(&user, &catalog()).await;

    assert_eq!(first, second);
    assert_eq!(after_first, 9);
    assert_eq!(provider.calls.load(Ordering::SeqCst), after_first);
}

#[tokio::test]
async fn larger_collection_caps_at_six() {
    let cat = catalog();
    let user = vec![cat[0].clone(), cat[3].clone(), cat[6].clone()];
    let recommender = Recommender::new(EmbeddingResolver::new(FeatureProvider::new()));

    let recs = recommender.recommend(&user, &cat).await;

    assert_eq!(recs.len(), 6);
    let mut ids: Vec<i64> = recs.iter().map(|r| r.bottle.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 6);
}
