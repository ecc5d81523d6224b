//! Text and vector similarity primitives.
//!
//! Text similarity drives the approximate cache match: strings are reduced
//! to their letter sets (case, digits, punctuation and whitespace ignored)
//! and compared with the Jaccard index. Vector similarity (cosine) drives
//! group admission: two providers belong to the same group only if they
//! embed the canonical test sentence to nearly identical vectors.

use std::collections::HashSet;

use crate::error::{EmbedPoolError, Result};

/// Canonical sentence embedded once per provider to fingerprint its
/// embedding space.
pub const TEST_SENTENCE: &str = "The quick brown fox jumps over the lazy dog";

/// Lowercase `s` and strip every character that is not an ASCII letter or a
/// CJK ideograph (U+4E00..=U+9FA5).
#[must_use]
pub fn clean(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || ('\u{4e00}'..='\u{9fa5}').contains(c))
        .collect()
}

/// Jaccard index over the character sets of the cleaned strings.
///
/// Two strings differing only in case, digits, punctuation or whitespace
/// compare as identical (similarity 1.0). Returns 0.0 when both cleaned
/// strings are empty.
#[must_use]
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = clean(a).chars().collect();
    let set_b: HashSet<char> = clean(b).chars().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm.
///
/// # Errors
///
/// Returns [`EmbedPoolError::DimensionMismatch`] when the vectors differ in
/// length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EmbedPoolError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
