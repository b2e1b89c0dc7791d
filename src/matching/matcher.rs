//! Multi-pass greedy matcher between one paper's primary-source names and
//! its enrichment-source author records.
//!
//! Passes run in a fixed order and each one only sees what earlier passes
//! left open:
//!   1. exact: normalized forms that occur once on each side,
//!   2. position-disambiguated: duplicated forms, paired by closest position,
//!   3. initialism: "J. Smith" against "John Smith",
//!   4. fuzzy: best combined similarity at or above the threshold.
//!
//! Matching is greedy and explainable, not an optimal assignment.

use super::normalize::{name_tokens, normalize_name};
use super::similarity::combined_similarity;
use super::stats::MatchStats;
use crate::bases::MatcherSettings;
use crate::models::{ExternalAuthorRecord, MatchTier};
use std::collections::HashMap;

/// A mention paired with an external record.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    /// 0-based index into the mention list.
    pub mention_index: usize,
    pub mention_name: String,
    /// 0-based index into the external record list.
    pub record_index: usize,
    pub record: ExternalAuthorRecord,
    pub tier: MatchTier,
    /// 1.0 for every tier except fuzzy, where it is the combined similarity.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedMention {
    pub mention_index: usize,
    pub mention_name: String,
}

/// Result of matching one paper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Pairs in acceptance order: by pass, then by mention order within a pass.
    pub matched: Vec<MatchedPair>,
    /// Mentions left open after every pass, in source order.
    pub unmatched: Vec<UnmatchedMention>,
    /// Tier counters for this call only.
    pub stats: MatchStats,
}

impl MatchOutcome {
    pub fn pair_for_mention(&self, mention_index: usize) -> Option<&MatchedPair> {
        self.matched
            .iter()
            .find(|pair| pair.mention_index == mention_index)
    }

    pub fn mention_count(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

/// Stateful wrapper that keeps running tier counters across calls.
///
/// Worker threads should use [`match_authors`] directly and merge the
/// per-call stats; a `NameMatcher` is meant for a single owner.
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    settings: MatcherSettings,
    stats: MatchStats,
}

impl NameMatcher {
    pub fn new(settings: MatcherSettings) -> Self {
        Self {
            settings,
            stats: MatchStats::default(),
        }
    }

    pub fn match_authors(
        &mut self,
        mentions: &[String],
        records: &[ExternalAuthorRecord],
    ) -> MatchOutcome {
        let outcome = match_authors(mentions, records, &self.settings);
        self.stats.merge(&outcome.stats);
        outcome
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }
}

/// Matches one paper's mentions against its external records.
///
/// Every mention ends up in exactly one of `matched`/`unmatched`, and no
/// record is used twice. Mentions or records whose normalized form is empty
/// never match.
pub fn match_authors(
    mentions: &[String],
    records: &[ExternalAuthorRecord],
    settings: &MatcherSettings,
) -> MatchOutcome {
    let mut state = MatchState::new(mentions, records);

    state.exact_pass();
    state.position_pass();
    state.initialism_pass(settings.strict_initials);
    state.fuzzy_pass(settings.fuzzy_threshold);

    state.finish()
}

struct MatchState<'a> {
    mentions: &'a [String],
    records: &'a [ExternalAuthorRecord],
    mention_forms: Vec<String>,
    record_forms: Vec<String>,
    mention_open: Vec<bool>,
    record_open: Vec<bool>,
    matched: Vec<MatchedPair>,
    stats: MatchStats,
}

impl<'a> MatchState<'a> {
    fn new(mentions: &'a [String], records: &'a [ExternalAuthorRecord]) -> Self {
        let mention_forms: Vec<String> = mentions.iter().map(|m| normalize_name(m)).collect();
        let record_forms: Vec<String> = records.iter().map(|r| normalize_name(&r.name)).collect();
        let mention_open = mention_forms.iter().map(|f| !f.is_empty()).collect();
        let record_open = record_forms.iter().map(|f| !f.is_empty()).collect();
        Self {
            mentions,
            records,
            mention_forms,
            record_forms,
            mention_open,
            record_open,
            matched: Vec::new(),
            stats: MatchStats::default(),
        }
    }

    fn exact_pass(&mut self) {
        let mention_counts = open_form_counts(&self.mention_forms, &self.mention_open);
        let record_counts = open_form_counts(&self.record_forms, &self.record_open);
        for m in 0..self.mentions.len() {
            if !self.mention_open[m] {
                continue;
            }
            let form = &self.mention_forms[m];
            let unique_both_sides =
                mention_counts.get(form) == Some(&1) && record_counts.get(form) == Some(&1);
            if !unique_both_sides {
                continue;
            }
            let candidate = (0..self.records.len())
                .find(|&r| self.record_open[r] && self.record_forms[r] == *form);
            if let Some(r) = candidate {
                self.accept(m, r, MatchTier::Exact, 1.0);
            }
        }
    }

    /// Duplicated forms: each mention, in order, takes the open record of the
    /// same form with the smallest position distance, earliest record on ties.
    fn position_pass(&mut self) {
        for m in 0..self.mentions.len() {
            if !self.mention_open[m] {
                continue;
            }
            let form = self.mention_forms[m].as_str();
            let candidate = (0..self.records.len())
                .filter(|&r| self.record_open[r] && self.record_forms[r] == form)
                .min_by_key(|&r| (m.abs_diff(r), r));
            if let Some(r) = candidate {
                self.accept(m, r, MatchTier::PositionDisambiguated, 1.0);
            }
        }
    }

    fn initialism_pass(&mut self, strict: bool) {
        let record_patterns: Vec<Option<InitialPatterns>> = self
            .record_forms
            .iter()
            .map(|form| InitialPatterns::build(form))
            .collect();
        for m in 0..self.mentions.len() {
            if !self.mention_open[m] {
                continue;
            }
            let Some(patterns) = InitialPatterns::build(&self.mention_forms[m]) else {
                continue;
            };
            let candidate = (0..self.records.len()).find(|&r| {
                self.record_open[r]
                    && record_patterns[r]
                        .as_ref()
                        .map(|other| patterns.pairs_with(other, strict))
                        .unwrap_or(false)
            });
            if let Some(r) = candidate {
                self.accept(m, r, MatchTier::Initialism, 1.0);
            }
        }
    }

    fn fuzzy_pass(&mut self, threshold: f64) {
        for m in 0..self.mentions.len() {
            if !self.mention_open[m] {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for r in 0..self.records.len() {
                if !self.record_open[r] {
                    continue;
                }
                let score = combined_similarity(&self.mention_forms[m], &self.record_forms[r]);
                if score < threshold {
                    continue;
                }
                if best.map(|(_, top)| score > top).unwrap_or(true) {
                    best = Some((r, score));
                }
            }
            if let Some((r, score)) = best {
                self.accept(m, r, MatchTier::Fuzzy, score);
            }
        }
    }

    fn accept(&mut self, mention_index: usize, record_index: usize, tier: MatchTier, score: f64) {
        self.mention_open[mention_index] = false;
        self.record_open[record_index] = false;
        self.stats.record(tier);
        self.matched.push(MatchedPair {
            mention_index,
            mention_name: self.mentions[mention_index].clone(),
            record_index,
            record: self.records[record_index].clone(),
            tier,
            score,
        });
    }

    fn finish(mut self) -> MatchOutcome {
        let paired: Vec<bool> = {
            let mut paired = vec![false; self.mentions.len()];
            for pair in &self.matched {
                paired[pair.mention_index] = true;
            }
            paired
        };
        let unmatched: Vec<UnmatchedMention> = self
            .mentions
            .iter()
            .enumerate()
            .filter(|(idx, _)| !paired[*idx])
            .map(|(idx, name)| UnmatchedMention {
                mention_index: idx,
                mention_name: name.clone(),
            })
            .collect();
        for _ in &unmatched {
            self.stats.record(MatchTier::Unmatched);
        }
        MatchOutcome {
            matched: self.matched,
            unmatched,
            stats: self.stats,
        }
    }
}

fn open_form_counts(forms: &[String], open: &[bool]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for (form, is_open) in forms.iter().zip(open) {
        if *is_open {
            *counts.entry(form.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Abbreviation patterns for a normalized name: initials of every given-name
/// piece plus the surname, e.g. "jr smith" and "j.r. smith".
#[derive(Debug, Clone, PartialEq, Eq)]
struct InitialPatterns {
    letters: String,
    dotted: String,
    /// Whether any given-name piece is already a bare initial.
    abbreviated: bool,
}

impl InitialPatterns {
    fn build(form: &str) -> Option<Self> {
        let tokens = name_tokens(form);
        if tokens.len() < 2 {
            return None;
        }
        let (surname, given) = tokens.split_last()?;
        let surname: String = surname.chars().filter(|c| *c != '.').collect();
        if surname.is_empty() {
            return None;
        }

        let pieces: Vec<&str> = given
            .iter()
            .flat_map(|token| token.split('.'))
            .filter(|piece| !piece.is_empty())
            .collect();
        let initials: Vec<char> = pieces.iter().filter_map(|p| p.chars().next()).collect();
        if initials.is_empty() {
            return None;
        }
        let abbreviated = pieces.iter().any(|p| p.chars().count() == 1);

        let letters = format!("{} {}", initials.iter().collect::<String>(), surname);
        let dotted = format!(
            "{} {}",
            initials.iter().map(|c| format!("{c}.")).collect::<String>(),
            surname
        );
        Some(Self {
            letters,
            dotted,
            abbreviated,
        })
    }

    /// Equal letter or dotted patterns pair. In strict mode one side must
    /// also abbreviate a given name.
    fn pairs_with(&self, other: &InitialPatterns, strict: bool) -> bool {
        if strict && !(self.abbreviated || other.abbreviated) {
            return false;
        }
        self.letters == other.letters || self.dotted == other.dotted
    }
}
