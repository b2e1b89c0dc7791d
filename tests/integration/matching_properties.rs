use authorbase::authorship::edges_for_paper;
use authorbase::bases::{MatcherSettings, OrderPolicy};
use authorbase::matching::{match_authors, normalize_name};
use authorbase::models::{ExternalAuthorRecord, MatchTier, PaperRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

const PEOPLE: &[(&str, &str)] = &[
    ("John Smith", "J. Smith"),
    ("Amy Lee", "A. Lee"),
    ("Wei Zhang", "Wei Zhang 0001"),
    ("José García", "Jose Garcia"),
    ("Li Na", "Li Na"),
    ("Maria Rossi", "M. Rossi"),
    ("Bo Chen", "Bo Chen"),
    ("Jonathan Smith", "Jon Smith"),
];

fn random_paper(rng: &mut StdRng) -> (Vec<String>, Vec<ExternalAuthorRecord>) {
    let count = rng.gen_range(0..7);
    let mut mentions = Vec::with_capacity(count);
    let mut records = Vec::with_capacity(count);
    for idx in 0..count {
        let (full, variant) = PEOPLE[rng.gen_range(0..PEOPLE.len())];
        mentions.push(if rng.gen_bool(0.5) { full } else { variant }.to_string());
        if rng.gen_bool(0.8) {
            let id = format!("id{idx}");
            let with_id = rng.gen_bool(0.9).then_some(id.as_str());
            records.push(ExternalAuthorRecord::new(full, with_id));
        }
    }
    if rng.gen_bool(0.3) {
        records.shuffle(rng);
    }
    (mentions, records)
}

#[test]
fn matching_is_total_exclusive_and_respects_tier_order() {
    let mut rng = StdRng::seed_from_u64(0xA17_B0A5E);
    let settings = MatcherSettings::default();

    for _ in 0..300 {
        let (mentions, records) = random_paper(&mut rng);
        let outcome = match_authors(&mentions, &records, &settings);

        assert_eq!(outcome.matched.len() + outcome.unmatched.len(), mentions.len());
        assert_eq!(outcome.stats.total(), mentions.len() as u64);

        let records_used: HashSet<usize> = outcome.matched.iter().map(|p| p.record_index).collect();
        assert_eq!(records_used.len(), outcome.matched.len());

        // a normalized form unique on both sides is always an exact match
        let mention_forms: Vec<String> = mentions.iter().map(|m| normalize_name(m)).collect();
        let record_forms: Vec<String> = records.iter().map(|r| normalize_name(&r.name)).collect();
        let count = |forms: &[String]| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for form in forms {
                *counts.entry(form.clone()).or_insert(0) += 1;
            }
            counts
        };
        let mention_counts = count(&mention_forms);
        let record_counts = count(&record_forms);
        for (idx, form) in mention_forms.iter().enumerate() {
            if form.is_empty() {
                continue;
            }
            if mention_counts[form] == 1 && record_counts.get(form) == Some(&1) {
                let pair = outcome
                    .pair_for_mention(idx)
                    .expect("unique shared form must match");
                assert_eq!(pair.tier, MatchTier::Exact, "{form}");
                assert_eq!(record_forms[pair.record_index], *form);
            }
        }
    }
}

#[test]
fn edge_orders_are_permutations_under_both_policies() {
    let mut rng = StdRng::seed_from_u64(7);
    let settings = MatcherSettings::default();

    for round in 0..200 {
        let (mentions, records) = random_paper(&mut rng);
        let paper = PaperRecord::new(format!("p{round}"), "", mentions.clone(), records.clone());
        let outcome = match_authors(&mentions, &records, &settings);

        for policy in [OrderPolicy::Publication, OrderPolicy::MatchedFirst] {
            let edges = edges_for_paper(&paper, &outcome, policy);
            assert_eq!(edges.len(), mentions.len());
            let mut orders: Vec<usize> = edges.iter().map(|e| e.order).collect();
            orders.sort_unstable();
            assert_eq!(orders, (1..=mentions.len()).collect::<Vec<_>>());
            for edge in &edges {
                if edge.tier == MatchTier::Unmatched {
                    assert!(edge.external_id.is_none());
                    assert!(edge.external_name.is_none());
                }
                assert_eq!(edge.primary_name, mentions[edge.mention_position - 1]);
            }
            if policy == OrderPolicy::Publication {
                assert!(edges.iter().all(|e| e.order == e.mention_position));
            }
        }
    }
}
