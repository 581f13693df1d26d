//! Symbol vocabulary shared by the matchers and the suggestion engine.
//!
//! A `Vocabulary` is built once (from the built-in table or a JSON file) and
//! then shared read-only behind an `Arc`. Entries are addressed by their
//! position in the table, exposed as the opaque `EntryId` handle.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::utils;

/// Position of an entry in its vocabulary, stable for the table's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub usize);

/// One vocabulary row: the symbol to commit plus the text it is found by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(alias = "emoji")]
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Category as emitted by the table generator; informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<i32>,
}

impl Entry {
    pub fn new<S, N>(symbol: S, name: N, keywords: &[&str]) -> Self
    where
        S: Into<String>,
        N: Into<String>,
    {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category: None,
        }
    }
}

/// Immutable symbol table with pre-folded search keys.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<Entry>,
    // Case-folded copies, index-aligned with `entries`
    names: Vec<String>,
    keywords: Vec<Vec<String>>,
}

impl Vocabulary {
    /// Build a vocabulary, folding names and keywords once up front.
    pub fn new(entries: Vec<Entry>) -> Self {
        let names = entries.iter().map(|e| utils::fold(&e.name)).collect();
        let keywords = entries
            .iter()
            .map(|e| e.keywords.iter().map(|k| utils::fold(k)).collect())
            .collect();
        Self {
            entries,
            names,
            keywords,
        }
    }

    /// Small built-in table, usable when no data file is installed.
    pub fn builtin() -> Self {
        Self::new(vec![
            Entry::new("😀", "grinning", &["smile", "happy", "joy", "grin"]),
            Entry::new("🔥", "fire", &["hot", "lit", "flame"]),
            Entry::new("🎉", "party popper", &["celebrate", "party", "yay"]),
        ])
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<Entry> =
            serde_json::from_str(json).context("parse vocabulary json")?;
        Ok(Self::new(entries))
    }

    /// Parse a JSON array of entries from any reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let entries: Vec<Entry> =
            serde_json::from_reader(reader).context("parse vocabulary json")?;
        Ok(Self::new(entries))
    }

    /// Load a JSON vocabulary file (e.g. `emojis.json`).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("open vocabulary {}", path.display()))?;
        let vocab = Self::from_json_reader(BufReader::new(file))
            .with_context(|| format!("load vocabulary {}", path.display()))?;
        tracing::debug!(entries = vocab.len(), path = %path.display(), "vocabulary loaded");
        Ok(vocab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    /// Symbol for a handle, if the handle belongs to this table.
    pub fn symbol(&self, id: EntryId) -> Option<&str> {
        self.get(id).map(|e| e.symbol.as_str())
    }

    /// Case-folded names, index-aligned with `entries()`.
    pub fn folded_names(&self) -> &[String] {
        &self.names
    }

    /// Case-folded keyword lists, index-aligned with `entries()`.
    pub fn folded_keywords(&self) -> &[Vec<String>] {
        &self.keywords
    }

    /// Iterate entries together with their handles, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let vocab = Vocabulary::builtin();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.symbol(EntryId(1)), Some("🔥"));
        assert_eq!(vocab.folded_names()[2], "party popper");
        assert!(vocab.symbol(EntryId(3)).is_none());
    }

    #[test]
    fn test_folding_applied_at_construction() {
        let vocab = Vocabulary::new(vec![Entry::new("🙂", "Slightly Smiling", &["SMILE"])]);
        assert_eq!(vocab.folded_names()[0], "slightly smiling");
        assert_eq!(vocab.folded_keywords()[0], vec!["smile".to_string()]);
        // Originals are kept for display
        assert_eq!(vocab.entries()[0].name, "Slightly Smiling");
    }

    #[test]
    fn test_from_json_generator_shape() {
        let json = r#"[
            {"emoji": "😀", "name": "grinning face", "category": 0},
            {"symbol": "🔥", "name": "fire", "keywords": ["hot", "lit"]}
        ]"#;
        let vocab = Vocabulary::from_json_str(json).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.entries()[0].symbol, "😀");
        assert_eq!(vocab.entries()[0].category, Some(0));
        assert!(vocab.entries()[0].keywords.is_empty());
        assert_eq!(vocab.entries()[1].keywords, vec!["hot", "lit"]);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Vocabulary::from_json_str("{not json").is_err());
        assert!(Vocabulary::from_json_str(r#"[{"name": "no symbol"}]"#).is_err());
    }

    #[test]
    fn test_load_json_missing_file() {
        let err = Vocabulary::load_json("/nonexistent/emojis.json").unwrap_err();
        assert!(format!("{:#}", err).contains("open vocabulary"));
    }

    #[test]
    fn test_iter_yields_handles_in_order() {
        let vocab = Vocabulary::builtin();
        let ids: Vec<_> = vocab.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![EntryId(0), EntryId(1), EntryId(2)]);
    }
}
