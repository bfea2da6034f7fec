//! Core data models used throughout dram.
//!
//! These types represent the bottles, scored matches, and recommendations
//! that flow through the recommendation pipeline.

use serde::{Deserialize, Serialize};

/// A spirits product, either owned by the user or a catalog candidate.
///
/// `id` is the only identity used for deduplication. Nullable numbers stay
/// `None` and mean "unknown"; they are never coerced to zero here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bottle {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub proof: Option<f64>,
    #[serde(default)]
    pub abv: Option<f64>,
    #[serde(default)]
    pub spirit_type: String,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub avg_msrp: Option<f64>,
    #[serde(default)]
    pub fair_price: f64,
    #[serde(default)]
    pub shelf_price: f64,
    #[serde(default)]
    pub total_score: i64,
    #[serde(default)]
    pub wishlist_count: i64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub bar_count: i64,
    #[serde(default)]
    pub ranking: i64,
}

impl Bottle {
    pub fn new(id: i64, name: impl Into<String>, spirit_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            spirit_type: spirit_type.into(),
            ..Default::default()
        }
    }
}

/// A candidate bottle scored against one seed bottle.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub bottle: Bottle,
    /// Cosine similarity to the seed, in `[-1.0, 1.0]`.
    pub similarity: f32,
    pub reason: String,
}

/// A recommended bottle with the reason it was picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub bottle: Bottle,
    pub reason: String,
}

impl From<ScoredCandidate> for Recommendation {
    fn from(c: ScoredCandidate) -> Self {
        Self {
            bottle: c.bottle,
            reason: c.reason,
        }
    }
}
