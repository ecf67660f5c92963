// src/calendar/matcher.rs
//! Attorney name matching: token sets, order- and punctuation-insensitive.

use std::collections::HashSet;

use crate::calendar::types::{AttorneyName, MatchedEntry, RawEntry};

/// Lowercased letter runs of `s`, e.g. "DEXTER, Chris" → {"dexter", "chris"}.
pub fn name_tokens(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Whole-token test of one attorney string against the requested name.
pub fn attorney_matches(attorney: &str, name: &AttorneyName) -> bool {
    let have = name_tokens(attorney);
    if have.is_empty() {
        return false;
    }
    let first = name_tokens(&name.first);
    let last = name_tokens(&name.last);
    if first.is_empty() || last.is_empty() {
        return false;
    }
    first.iter().chain(last.iter()).all(|t| have.contains(t))
}

/// The first co-counsel that satisfies the token test, as display text.
pub fn match_attorney(entry: &RawEntry, name: &AttorneyName) -> Option<String> {
    entry
        .attorneys
        .iter()
        .find(|a| attorney_matches(a, name))
        .cloned()
}

pub fn match_entries(entries: Vec<RawEntry>, name: &AttorneyName) -> Vec<MatchedEntry> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let attorney = match_attorney(&entry, name)?;
            Some(MatchedEntry { entry, attorney })
        })
        .collect()
}
