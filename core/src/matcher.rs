//! Query → candidate matching over a `Vocabulary`.
//!
//! Matchers are pure: they read the shared vocabulary, never mutate anything,
//! and may run concurrently on worker threads. Two policies exist:
//!
//! - **Keyword-contains**: an entry matches when any of its keywords contains
//!   the query. Results keep vocabulary order.
//! - **Fuzzy-rank**: an entry matches when the query is a subsequence of its
//!   name. Results are ordered by Levenshtein distance to the name (lower is
//!   better), ties kept in vocabulary order.
//!
//! `CombinedMatcher` (the default policy) returns name matches first, then
//! keyword-only matches.

use serde::{Deserialize, Serialize};

use crate::utils;
use crate::vocabulary::{EntryId, Vocabulary};

/// Trait implemented by every matching policy.
///
/// Implementations must be deterministic and must return an empty result for
/// an empty query.
pub trait Matcher {
    /// Return matching entries, best first.
    fn find(&self, query: &str, vocab: &Vocabulary) -> Vec<EntryId>;

    /// Short policy name for logging.
    fn name(&self) -> &'static str;
}

/// Substring match against case-folded keyword lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl Matcher for KeywordMatcher {
    fn find(&self, query: &str, vocab: &Vocabulary) -> Vec<EntryId> {
        let query = utils::fold(query);
        if query.is_empty() {
            return Vec::new();
        }
        vocab
            .folded_keywords()
            .iter()
            .enumerate()
            .filter(|(_, keywords)| keywords.iter().any(|k| k.contains(query.as_str())))
            .map(|(i, _)| EntryId(i))
            .collect()
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Subsequence match against case-folded names, ranked by edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    /// Score an already-folded query against an already-folded name.
    ///
    /// Returns `None` when the query is not a subsequence of the name.
    pub fn score(query: &str, name: &str) -> Option<usize> {
        if !is_subsequence(query, name) {
            return None;
        }
        Some(strsim::levenshtein(query, name))
    }
}

impl Matcher for FuzzyMatcher {
    fn find(&self, query: &str, vocab: &Vocabulary) -> Vec<EntryId> {
        let query = utils::fold(query);
        if query.is_empty() {
            return Vec::new();
        }
        let mut ranked: Vec<(usize, EntryId)> = vocab
            .folded_names()
            .iter()
            .enumerate()
            .filter_map(|(i, name)| Self::score(&query, name).map(|s| (s, EntryId(i))))
            .collect();
        // sort_by_key is stable: equal scores stay in vocabulary order
        ranked.sort_by_key(|(score, _)| *score);
        ranked.into_iter().map(|(_, id)| id).collect()
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

/// Fuzzy name matches first, then keyword matches not already listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedMatcher;

impl Matcher for CombinedMatcher {
    fn find(&self, query: &str, vocab: &Vocabulary) -> Vec<EntryId> {
        let mut seen = vec![false; vocab.len()];
        let mut out = FuzzyMatcher.find(query, vocab);
        for id in &out {
            seen[id.0] = true;
        }
        out.extend(
            KeywordMatcher
                .find(query, vocab)
                .into_iter()
                .filter(|id| !seen[id.0]),
        );
        out
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}

/// Matching policy selected through `Config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    Keyword,
    Fuzzy,
    #[default]
    Combined,
}

impl Matcher for MatchPolicy {
    fn find(&self, query: &str, vocab: &Vocabulary) -> Vec<EntryId> {
        match self {
            MatchPolicy::Keyword => KeywordMatcher.find(query, vocab),
            MatchPolicy::Fuzzy => FuzzyMatcher.find(query, vocab),
            MatchPolicy::Combined => CombinedMatcher.find(query, vocab),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MatchPolicy::Keyword => KeywordMatcher.name(),
            MatchPolicy::Fuzzy => FuzzyMatcher.name(),
            MatchPolicy::Combined => CombinedMatcher.name(),
        }
    }
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars();
    needle.chars().all(|c| hay.any(|h| h == c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Entry;

    fn symbols(vocab: &Vocabulary, ids: &[EntryId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| vocab.symbol(*id))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_keyword_contains() {
        let vocab = Vocabulary::new(vec![Entry::new("😀", "grinning", &["smile", "happy"])]);
        let ids = KeywordMatcher.find("smi", &vocab);
        assert_eq!(symbols(&vocab, &ids), vec!["😀"]);
    }

    #[test]
    fn test_keyword_case_folded_both_sides() {
        let vocab = Vocabulary::new(vec![Entry::new("😀", "grinning", &["Smile"])]);
        assert_eq!(KeywordMatcher.find("SMI", &vocab), vec![EntryId(0)]);
    }

    #[test]
    fn test_keyword_keeps_vocabulary_order() {
        let vocab = Vocabulary::new(vec![
            Entry::new("a", "a", &["hot"]),
            Entry::new("b", "b", &["cold"]),
            Entry::new("c", "c", &["shot", "hotter"]),
        ]);
        assert_eq!(KeywordMatcher.find("hot", &vocab), vec![EntryId(0), EntryId(2)]);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let vocab = Vocabulary::builtin();
        assert!(KeywordMatcher.find("", &vocab).is_empty());
        assert!(FuzzyMatcher.find("", &vocab).is_empty());
        assert!(CombinedMatcher.find("", &vocab).is_empty());
    }

    #[test]
    fn test_fuzzy_subsequence_scoring() {
        assert_eq!(FuzzyMatcher::score("fr", "fire"), Some(2));
        assert_eq!(FuzzyMatcher::score("fire", "fire"), Some(0));
        assert_eq!(FuzzyMatcher::score("rf", "fire"), None);
        assert_eq!(FuzzyMatcher::score("fires", "fire"), None);
    }

    #[test]
    fn test_fuzzy_ranks_by_distance() {
        let vocab = Vocabulary::new(vec![
            Entry::new("🚒", "fire engine", &[]),
            Entry::new("🔥", "fire", &[]),
            Entry::new("🧯", "fire extinguisher", &[]),
            Entry::new("💧", "droplet", &[]),
        ]);
        let ids = FuzzyMatcher.find("fire", &vocab);
        assert_eq!(symbols(&vocab, &ids), vec!["🔥", "🚒", "🧯"]);
    }

    #[test]
    fn test_fuzzy_ties_keep_vocabulary_order() {
        let vocab = Vocabulary::new(vec![
            Entry::new("1", "cab", &[]),
            Entry::new("2", "cob", &[]),
            Entry::new("3", "cub", &[]),
        ]);
        assert_eq!(
            FuzzyMatcher.find("cb", &vocab),
            vec![EntryId(0), EntryId(1), EntryId(2)]
        );
    }

    #[test]
    fn test_combined_names_then_keywords() {
        let vocab = Vocabulary::new(vec![
            Entry::new("🌶", "hot pepper", &["spicy"]),
            Entry::new("🔥", "fire", &["hot", "lit", "fire"]),
        ]);
        let ids = CombinedMatcher.find("hot", &vocab);
        assert_eq!(symbols(&vocab, &ids), vec!["🌶", "🔥"]);

        // A keyword hit that is also a name hit appears once
        let ids = CombinedMatcher.find("fire", &vocab);
        assert_eq!(symbols(&vocab, &ids), vec!["🔥"]);
    }

    #[test]
    fn test_policy_dispatch() {
        let vocab = Vocabulary::builtin();
        assert_eq!(MatchPolicy::Keyword.find("fire", &vocab), Vec::<EntryId>::new());
        assert_eq!(MatchPolicy::Fuzzy.find("fire", &vocab), vec![EntryId(1)]);
        assert_eq!(MatchPolicy::Combined.find("smi", &vocab), vec![EntryId(0)]);
        assert_eq!(MatchPolicy::default().name(), "combined");
    }
}
