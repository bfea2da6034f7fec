//! User collection ("bar") retrieval.
//!
//! Fetches a user's bar from the bar-tracking service and normalizes each
//! record's nested `product` into a [`Bottle`]. Nothing here is part of the
//! recommendation core; it only produces the seed bottles.
//!
//! # Endpoint
//!
//! `GET {base_url}/api/bar/user/{username}` returning a JSON array:
//!
//! ```json
//! [{ "id": 1, "product": { "id": 24961, "name": "...", "spirit": "Bourbon", "proof": 100.7, ... } }]
//! ```

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::config::BarConfig;
use crate::models::Bottle;

/// One record of a user's bar, as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct BarItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub product: BarProduct,
}

/// The product description nested in a [`BarItem`].
#[derive(Debug, Clone, Deserialize)]
pub struct BarProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub spirit: Option<String>,
    #[serde(default)]
    pub spirit_type: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub proof: Option<f64>,
    #[serde(default)]
    pub average_msrp: Option<f64>,
    #[serde(default)]
    pub avg_msrp: Option<f64>,
    #[serde(default)]
    pub fair_price: Option<f64>,
    #[serde(default)]
    pub shelf_price: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub total_score: Option<i64>,
    #[serde(default)]
    pub wishlist_count: Option<i64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub bar_count: Option<i64>,
    #[serde(default)]
    pub ranking: Option<i64>,
}

/// Map a raw bar record to a [`Bottle`].
///
/// `abv` is derived as `proof / 2` when the proof is known. Counters and
/// prices the service leaves out become `0`. The service spells some keys
/// two ways (`spirit`/`spirit_type`, `average_msrp`/`avg_msrp`); the first
/// spelling wins when both are present.
pub fn normalize_bar_item(item: BarItem) -> Bottle {
    let p = item.product;
    Bottle {
        id: p.id,
        name: p.name,
        size: p.size.unwrap_or(0.0),
        proof: p.proof,
        abv: p.proof.map(|proof| proof / 2.0),
        spirit_type: p.spirit.or(p.spirit_type).unwrap_or_default(),
        brand_id: p.brand_id,
        popularity: p.popularity,
        image_url: p.image_url,
        avg_msrp: p.average_msrp.or(p.avg_msrp),
        fair_price: p.fair_price.unwrap_or(0.0),
        shelf_price: p.shelf_price.unwrap_or(0.0),
        total_score: p.total_score.unwrap_or(0),
        wishlist_count: p.wishlist_count.unwrap_or(0),
        vote_count: p.vote_count.unwrap_or(0),
        bar_count: p.bar_count.unwrap_or(0),
        ranking: p.ranking.unwrap_or(0),
    }
}

/// HTTP client for the bar-tracking service.
pub struct BarClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl BarClient {
    pub fn new(config: &BarConfig) -> Result<Self> {
        let base_url = reqwest::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid bar.base_url: {}", config.base_url))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Fetch and normalize `username`'s collection.
    pub async fn fetch_collection(&self, username: &str) -> Result<Vec<Bottle>> {
        if username.trim().is_empty() {
            bail!("username must not be empty");
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("bar.base_url cannot be a base URL"))?
            .pop_if_empty()
            .extend(["api", "bar", "user", username]);

        tracing::debug!(%url, "fetching user bar");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to reach bar service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("bar service error {}: {}", status, body);
        }

        let items: Vec<BarItem> = response
            .json()
            .await
            .context("Invalid bar service response")?;
        let bottles: Vec<Bottle> = items.into_iter().map(normalize_bar_item).collect();
        tracing::info!(username, bottles = bottles.len(), "user bar loaded");
        Ok(bottles)
    }
}
