//! semoji-core
//!
//! Symbol (emoji) input method core: an edit buffer driven by key events,
//! cancellable asynchronous fuzzy lookup against a fixed vocabulary, and
//! paginated candidate selection with commit triggers.
//!
//! Public API:
//! - `Vocabulary` - Immutable symbol table (built-in or loaded from JSON)
//! - `Matcher` - Matching policies (keyword-contains, fuzzy-rank, combined)
//! - `SuggestionEngine` - Generation-gated asynchronous lookup
//! - `CandidateList` - Paginated candidates with a single cursor
//! - `ImeEngine` - Key event state machine tying everything together
//! - `Config` - Configuration loaded from TOML
//!
//! ## Usage
//!
//! ```rust,no_run
//! use semoji_core::{Config, ImeEngine, KeyEvent, Notification, Vocabulary};
//! use std::sync::Arc;
//!
//! let vocab = Arc::new(Vocabulary::load_json("emojis.json")?);
//! let config = Config::load_toml("semoji.toml").unwrap_or_default();
//! let mut ime = ImeEngine::from_config(vocab, config);
//!
//! ime.process_key(KeyEvent::Char('f'));
//! ime.poll(); // apply suggestions once they arrive
//! for note in ime.take_notifications() {
//!     if let Notification::Commit { text, .. } = note {
//!         println!("commit: {}", text);
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub mod vocabulary;
pub use vocabulary::{Entry, EntryId, Vocabulary};

pub mod matcher;
pub use matcher::{CombinedMatcher, FuzzyMatcher, KeywordMatcher, MatchPolicy, Matcher};

pub mod suggestion;
pub use suggestion::{Completion, CompletionHook, LookupGeneration, SuggestionEngine};

pub mod candidate;
pub use candidate::{Candidate, CandidateList};

pub mod input_buffer;
pub use input_buffer::InputBuffer;

pub mod context;
pub use context::{ImeContext, Notification};

pub mod session;
pub use session::{EditState, ImeSession};

pub mod ime_engine;
pub use ime_engine::{ImeEngine, KeyEvent, KeyResult};

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Candidates per page; the number keys 1-9 pick within a page
    pub page_size: usize,

    /// Which matcher `ImeEngine::from_config` uses
    pub match_policy: MatchPolicy,

    /// Keep at most this many ranked results (0 = no limit)
    pub max_candidates: usize,

    /// Entries in the query -> results cache (0 disables caching)
    pub max_cache_size: usize,

    /// Expose "1:", "2:", ... pick labels in the context
    pub select_labels: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 9,
            match_policy: MatchPolicy::Combined,
            max_candidates: 0,
            max_cache_size: 256,
            select_labels: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content)
            .with_context(|| format!("write config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.page_size = config.page_size.max(1);
        Ok(config)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;

    /// Case-fold text for matching: NFC normalization, then lowercase.
    pub fn fold(s: &str) -> String {
        s.nfc().flat_map(char::to_lowercase).collect()
    }
}
