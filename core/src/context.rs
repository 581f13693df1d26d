//! IME context for host communication.
//!
//! The `ImeContext` struct is a plain data snapshot the host reads after each
//! call into the engine to render preedit and candidates. Discrete changes
//! (commits, preedit updates, ...) are additionally reported as
//! `Notification` values that the host drains in order.

/// Outbound action for the host bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Preedit text or cursor changed; cursor is a char offset.
    PreeditChanged { text: String, cursor: usize },

    /// Final text for the client. `learn` marks a picked candidate and is
    /// kept for ranking feedback; it has no effect yet.
    Commit { text: String, learn: bool },

    /// A new word is starting: the client should drop any selection the user
    /// is typing over (hosts usually commit an empty string).
    ClearSelection,

    /// Candidate list, highlight or page changed.
    CandidatesChanged,
}

/// Render state for the host.
///
/// # Fields
///
/// - `preedit_text`: Text being composed (displayed with underline)
/// - `preedit_cursor`: Cursor position within preedit (char offset)
/// - `commit_text`: Text committed by the last event
/// - `candidates`: Candidates on the current page
/// - `candidate_labels`: Pick labels for the current page ("1:", "2:", ...)
/// - `candidate_cursor`: Highlighted candidate, relative to the page
/// - `auxiliary_text`: Page indicator when there is more than one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImeContext {
    pub preedit_text: String,

    pub preedit_cursor: usize,

    pub commit_text: String,

    pub candidates: Vec<String>,

    pub candidate_labels: Vec<String>,

    pub candidate_cursor: usize,

    pub auxiliary_text: String,
}

impl ImeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all state (preedit, candidates, auxiliary).
    /// Does NOT clear commit_text (host should consume it first).
    pub fn clear(&mut self) {
        self.preedit_text.clear();
        self.preedit_cursor = 0;
        self.candidates.clear();
        self.candidate_labels.clear();
        self.candidate_cursor = 0;
        self.auxiliary_text.clear();
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    /// Check if there's any visible state (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        !self.preedit_text.is_empty() || !self.candidates.is_empty()
    }

    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }
}
