use crate::models::MatchTier;
use serde::{Deserialize, Serialize};

/// Per-tier match counters.
///
/// Each matcher call returns its own `MatchStats`; workers merge them, so no
/// counter is ever shared between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub exact: u64,
    pub position_disambiguated: u64,
    pub initialism: u64,
    pub fuzzy: u64,
    pub unmatched: u64,
}

impl MatchStats {
    pub fn record(&mut self, tier: MatchTier) {
        *self.slot_mut(tier) += 1;
    }

    pub fn count(&self, tier: MatchTier) -> u64 {
        match tier {
            MatchTier::Exact => self.exact,
            MatchTier::PositionDisambiguated => self.position_disambiguated,
            MatchTier::Initialism => self.initialism,
            MatchTier::Fuzzy => self.fuzzy,
            MatchTier::Unmatched => self.unmatched,
        }
    }

    pub fn merge(&mut self, other: &MatchStats) {
        for tier in MatchTier::ALL {
            *self.slot_mut(tier) += other.count(tier);
        }
    }

    pub fn reset(&mut self) {
        *self = MatchStats::default();
    }

    pub fn total(&self) -> u64 {
        MatchTier::ALL.iter().map(|tier| self.count(*tier)).sum()
    }

    pub fn matched(&self) -> u64 {
        self.total() - self.unmatched
    }

    pub fn summary(&self) -> MatchStatsSummary {
        let total = self.total();
        let tiers = MatchTier::ALL
            .iter()
            .map(|tier| TierStat {
                tier: *tier,
                count: self.count(*tier),
                percentage: percentage(self.count(*tier), total),
            })
            .collect();
        MatchStatsSummary {
            total_match_attempts: total,
            tiers,
            success_rate: percentage(self.matched(), total),
        }
    }

    fn slot_mut(&mut self, tier: MatchTier) -> &mut u64 {
        match tier {
            MatchTier::Exact => &mut self.exact,
            MatchTier::PositionDisambiguated => &mut self.position_disambiguated,
            MatchTier::Initialism => &mut self.initialism,
            MatchTier::Fuzzy => &mut self.fuzzy,
            MatchTier::Unmatched => &mut self.unmatched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStat {
    pub tier: MatchTier,
    pub count: u64,
    pub percentage: f64,
}

/// Reporting view over `MatchStats`: counts, percentages, success rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatsSummary {
    pub total_match_attempts: u64,
    pub tiers: Vec<TierStat>,
    /// Percentage of attempts that matched at any tier.
    pub success_rate: f64,
}

impl MatchStatsSummary {
    pub fn describe(&self) -> String {
        let tiers = self
            .tiers
            .iter()
            .map(|stat| format!("{} {} ({:.1}%)", stat.tier, stat.count, stat.percentage))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} mentions matched at {:.1}%: {}",
            self.total_match_attempts, self.success_rate, tiers
        )
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
