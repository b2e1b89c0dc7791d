/// Largest `h` such that `h` of the given papers have at least `h` citations.
pub fn h_index(citations: &[u64]) -> u32 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|(idx, count)| **count >= (*idx as u64 + 1))
        .count() as u32
}

/// Papers with at least `threshold` citations.
pub fn count_at_least(citations: &[u64], threshold: u64) -> u32 {
    citations.iter().filter(|count| **count >= threshold).count() as u32
}
