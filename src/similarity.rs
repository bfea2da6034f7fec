//! Vector similarity.

use crate::error::{Error, Result};

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
///
/// # Errors
///
/// - [`Error::DimensionMismatch`] when the lengths differ.
/// - [`Error::DegenerateVector`] when either vector has zero magnitude
///   (this includes empty vectors). The result would be NaN otherwise.
///
/// ```rust
/// use dram::similarity::cosine_similarity;
///
/// let sim = cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
/// assert!((sim - 1.0).abs() < 1e-6);
/// assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_err());
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(Error::DegenerateVector);
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !sim.is_finite() {
        return Err(Error::DegenerateVector);
    }
    Ok(sim)
}
