//! Human-readable match explanations.
//!
//! [`generate_reason`] compares a seed bottle from the user's collection
//! with a candidate and lists the attributes they share. Clauses are
//! checked in a fixed order: spirit type, price, proof, brand.

use crate::models::Bottle;

/// Two prices closer than this count as the same range.
pub const PRICE_WINDOW: f64 = 30.0;

/// Two proofs closer than this count as similar.
pub const PROOF_WINDOW: f64 = 10.0;

/// Explain why `candidate` resembles `seed`.
///
/// Produces `"Based on <clauses> as <seed name>"`. Missing prices and
/// proofs compare as `0` for these heuristics only. When nothing matches
/// the clause list is empty and the string reads `"Based on  as <name>"`.
///
/// ```rust
/// use dram::models::Bottle;
/// use dram::reason::generate_reason;
///
/// let seed = Bottle::new(1, "Seed", "Rye");
/// let cand = Bottle::new(2, "Cand", "Rye");
/// assert_eq!(
///     generate_reason(&seed, &cand),
///     "Based on same spirit type (Rye), similar price range, similar proof as Seed"
/// );
/// ```
pub fn generate_reason(seed: &Bottle, candidate: &Bottle) -> String {
    let mut reasons: Vec<String> = Vec::with_capacity(4);

    if candidate.spirit_type == seed.spirit_type {
        reasons.push(format!("same spirit type ({})", candidate.spirit_type));
    }

    let price_gap = (candidate.avg_msrp.unwrap_or(0.0) - seed.avg_msrp.unwrap_or(0.0)).abs();
    if price_gap < PRICE_WINDOW {
        reasons.push("similar price range".to_string());
    }

    let proof_gap = (candidate.proof.unwrap_or(0.0) - seed.proof.unwrap_or(0.0)).abs();
    if proof_gap < PROOF_WINDOW {
        reasons.push("similar proof".to_string());
    }

    if let (Some(a), Some(b)) = (candidate.brand_id, seed.brand_id) {
        if a == b {
            reasons.push("same brand".to_string());
        }
    }

    format!("Based on {} as {}", reasons.join(", "), seed.name)
}
