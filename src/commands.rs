//! CLI command handlers.
//!
//! Each `run_*` function backs one `dram` subcommand and prints to stdout,
//! either as plain text or, with `--json`, as pretty-printed JSON.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::bar::BarClient;
use crate::catalog::{find_bottle, load_catalog};
use crate::config::Config;
use crate::matcher::find_similar_bottles;
use crate::models::{Bottle, Recommendation};
use crate::reason::generate_reason;
use crate::recommend::build_recommender;

/// `dram recommend`: recommendations for a bar user or a local collection file.
pub async fn run_recommend(
    config: &Config,
    user: Option<&str>,
    collection: Option<&Path>,
    json: bool,
) -> Result<()> {
    let user_bottles = match (user, collection) {
        (Some(username), None) => BarClient::new(&config.bar)?
            .fetch_collection(username)
            .await
            .with_context(|| format!("Failed to load bar for {}", username))?,
        (None, Some(path)) => load_catalog(path)
            .with_context(|| format!("Failed to load collection: {}", path.display()))?,
        _ => bail!("Specify exactly one of --user or --collection"),
    };

    let catalog = load_catalog(&config.catalog.path)?;
    let recommender = build_recommender(config)?;
    let recs = recommender.recommend(&user_bottles, &catalog).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&recs)?);
    } else {
        print_recommendations(&user_bottles, &recs);
    }
    Ok(())
}

/// `dram similar`: ranked matches for one catalog bottle.
pub async fn run_similar(
    config: &Config,
    bottle_id: i64,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let catalog = load_catalog(&config.catalog.path)?;
    let seed = match find_bottle(&catalog, bottle_id) {
        Some(b) => b.clone(),
        None => bail!("bottle not found in catalog: {}", bottle_id),
    };
    let others: Vec<Bottle> = catalog.into_iter().filter(|b| b.id != bottle_id).collect();

    let recommender = build_recommender(config)?;
    let limit = limit.unwrap_or(recommender.per_bottle_limit());
    if limit == 0 {
        bail!("--limit must be >= 1");
    }

    let matches = find_similar_bottles(recommender.resolver(), &seed, &others, limit).await?;

    if json {
        let items: Vec<serde_json::Value> = matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "bottle": m.bottle,
                    "similarity": m.similarity,
                    "reason": m.reason,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    println!("Bottles similar to {}:", seed.name);
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} ({})",
            i + 1,
            m.similarity,
            m.bottle.name,
            m.bottle.spirit_type
        );
        println!("    {}", m.reason);
    }
    Ok(())
}

/// `dram reason`: explain a seed/candidate pair without calling a provider.
pub fn run_reason(config: &Config, seed_id: i64, candidate_id: i64) -> Result<()> {
    let catalog = load_catalog(&config.catalog.path)?;
    let seed = find_bottle(&catalog, seed_id)
        .with_context(|| format!("bottle not found in catalog: {}", seed_id))?;
    let candidate = find_bottle(&catalog, candidate_id)
        .with_context(|| format!("bottle not found in catalog: {}", candidate_id))?;

    println!("{}", generate_reason(seed, candidate));
    Ok(())
}

fn print_recommendations(user_bottles: &[Bottle], recs: &[Recommendation]) {
    println!("Collection: {} bottle(s)", user_bottles.len());
    if recs.is_empty() {
        println!("No recommendations.");
        return;
    }
    println!();
    for (i, rec) in recs.iter().enumerate() {
        let price = rec
            .bottle
            .avg_msrp
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "price unknown".to_string());
        println!(
            "{}. {} ({}, {})",
            i + 1,
            rec.bottle.name,
            rec.bottle.spirit_type,
            price
        );
        println!("    {}", rec.reason);
    }
}
