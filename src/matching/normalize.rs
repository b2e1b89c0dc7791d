//! Canonical comparison form for author name strings.
//!
//! The canonical form is only ever used for comparison; callers keep the
//! original string for display. Steps, in order:
//!   1. "Last, First" is swapped to "First Last".
//!   2. Transliteration to diacritic-free lowercase ASCII.
//!   3. Hyphens and underscores become spaces; punctuation other than dots
//!      is dropped; whitespace collapses.
//!   4. Titles and academic suffixes are dropped as whole tokens.
//!   5. Trailing tokens of 1-4 digits (primary-source disambiguation
//!      suffixes such as "0001") and trailing roman numeral suffixes are
//!      dropped. Digits elsewhere in the name stay.
//!
//! Token filtering runs after separator cleanup so that "Smith-0001" and
//! "Smith 0001" land on the same form, which keeps the function idempotent.

use deunicode::deunicode;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[-_\u{2010}-\u{2015}]+").unwrap();
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9.\s]+").unwrap();
}

/// Dropped wherever they appear.
const TITLE_TOKENS: &[&str] = &["jr", "sr", "phd", "md", "esq", "dr", "prof"];

/// Dropped only as trailing tokens after at least one other token.
const NUMERAL_SUFFIXES: &[&str] = &["i", "ii", "iii", "iv", "v"];

/// Normalizes a raw author name. Total and referentially transparent.
pub fn normalize_name(raw: &str) -> String {
    let reordered = swap_comma_form(raw);
    let ascii = deunicode(&reordered).to_lowercase();
    let separated = SEPARATORS.replace_all(&ascii, " ");
    let cleaned = DISALLOWED.replace_all(&separated, "");

    let mut tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|token| !is_dot_only(token))
        .filter(|token| !TITLE_TOKENS.contains(&bare(token).as_str()))
        .collect();

    while let Some(last) = tokens.last() {
        let numeral = tokens.len() > 1 && NUMERAL_SUFFIXES.contains(last);
        if is_disambiguation_suffix(last) || numeral {
            tokens.pop();
        } else {
            break;
        }
    }

    tokens.join(" ")
}

/// Splits a canonical name into its tokens.
pub fn name_tokens(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

fn swap_comma_form(raw: &str) -> String {
    match raw.split_once(',') {
        Some((last, first)) => {
            let last = last.trim();
            let first = first.trim();
            if first.is_empty() {
                last.to_string()
            } else if last.is_empty() {
                first.to_string()
            } else {
                format!("{first} {last}")
            }
        }
        None => raw.to_string(),
    }
}

fn is_disambiguation_suffix(token: &str) -> bool {
    (1..=4).contains(&token.len()) && token.chars().all(|c| c.is_ascii_digit())
}

fn is_dot_only(token: &str) -> bool {
    token.chars().all(|c| c == '.')
}

fn bare(token: &str) -> String {
    token.chars().filter(|c| *c != '.').collect()
}
