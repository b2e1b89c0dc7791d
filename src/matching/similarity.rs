//! String similarity measures used by the fuzzy matching pass.
//!
//! All inputs are expected to be normalized names. Every measure returns a
//! value in [0, 1].

use strsim::normalized_levenshtein;

/// Per-measure scores for one pair, mostly useful for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    pub token_sort: f64,
    pub token_alignment: f64,
    pub containment: f64,
}

impl SimilarityBreakdown {
    pub fn combined(&self) -> f64 {
        self.token_sort
            .max(self.token_alignment)
            .max(self.containment)
    }
}

pub fn breakdown(a: &str, b: &str) -> SimilarityBreakdown {
    SimilarityBreakdown {
        token_sort: token_sort_similarity(a, b),
        token_alignment: token_alignment_similarity(a, b),
        containment: containment_similarity(a, b),
    }
}

/// Maximum of the three complementary measures.
pub fn combined_similarity(a: &str, b: &str) -> f64 {
    breakdown(a, b).combined()
}

/// Order-insensitive: edit similarity of the alphabetically sorted token lists.
pub fn token_sort_similarity(a: &str, b: &str) -> f64 {
    let left = sorted_tokens(a);
    let right = sorted_tokens(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(&left, &right)
}

/// Order-sensitive: position-by-position token edit similarity, averaged
/// over the longer token list so missing tokens count as zero.
pub fn token_alignment_similarity(a: &str, b: &str) -> f64 {
    let left: Vec<&str> = a.split_whitespace().collect();
    let right: Vec<&str> = b.split_whitespace().collect();
    let longest = left.len().max(right.len());
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let total: f64 = left
        .iter()
        .zip(right.iter())
        .map(|(l, r)| normalized_levenshtein(l, r))
        .sum();
    total / longest as f64
}

/// Substring containment on the compacted forms (no spaces or dots),
/// scored by the length ratio of the contained string to the container.
pub fn containment_similarity(a: &str, b: &str) -> f64 {
    let left = compact(a);
    let right = compact(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let (shorter, longer) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    if longer.contains(&shorter) {
        shorter.len() as f64 / longer.len() as f64
    } else {
        0.0
    }
}

fn sorted_tokens(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect()
}
