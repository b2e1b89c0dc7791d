use crate::bases::MetricsSettings;
use crate::models::{CareerStage, PaperStats, PotentialRating, RisingStarMetrics};

/// Rising-star indicators over an identity's distinct papers.
///
/// Only papers with a known year take part; missing citation counts count
/// as zero. The score is clamped to [0, 1].
pub fn rising_star_metrics(
    papers: &[PaperStats],
    career_length: u32,
    settings: &MetricsSettings,
) -> RisingStarMetrics {
    let cutoff = settings.recent_cutoff_year();
    let window = settings.recent_years.max(1) as f64;

    let dated: Vec<&PaperStats> = papers.iter().filter(|p| p.year.is_some()).collect();
    let recent: Vec<&PaperStats> = dated
        .iter()
        .copied()
        .filter(|p| p.year.map(|y| y >= cutoff).unwrap_or(false))
        .collect();

    let total_count = dated.len();
    let recent_count = recent.len();
    let total_citations: u64 = dated.iter().map(|p| p.citation_count.unwrap_or(0)).sum();
    let recent_citations: u64 = recent.iter().map(|p| p.citation_count.unwrap_or(0)).sum();

    let recent_paper_ratio = fraction(recent_count as f64, total_count as f64);
    let recent_citation_ratio = fraction(recent_citations as f64, total_citations as f64);
    let citation_velocity = if recent_count > 0 {
        recent_citations as f64 / window
    } else {
        0.0
    };
    let career_average = fraction(total_citations as f64, total_count as f64);
    let recent_average = fraction(recent_citations as f64, recent_count as f64);
    let impact_acceleration = fraction(recent_average, career_average);

    let raw_score = 0.3 * recent_paper_ratio
        + 0.3 * recent_citation_ratio
        + 0.2 * (citation_velocity / 10.0).min(1.0)
        + 0.2 * impact_acceleration.min(2.0);
    let rising_star_score = raw_score.clamp(0.0, 1.0);

    RisingStarMetrics {
        recent_papers_count: recent_count as u32,
        recent_citations_count: recent_citations,
        recent_paper_ratio,
        recent_citation_ratio,
        citation_velocity,
        impact_acceleration,
        rising_star_score,
        career_stage: career_stage(career_length),
        potential_rating: potential_rating(rising_star_score),
    }
}

pub fn career_stage(career_length: u32) -> CareerStage {
    match career_length {
        0..=3 => CareerStage::Early,
        4..=8 => CareerStage::Mid,
        _ => CareerStage::Senior,
    }
}

pub fn potential_rating(score: f64) -> PotentialRating {
    if score > 0.7 {
        PotentialRating::High
    } else if score > 0.4 {
        PotentialRating::Medium
    } else {
        PotentialRating::Low
    }
}

fn fraction(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
