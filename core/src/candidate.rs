//! Candidate types for symbol selection.
//!
//! This module provides:
//! - `Candidate`: a matched vocabulary symbol
//! - `CandidateList`: paginated list with a single absolute cursor
//!
//! The highlighted page is always derived from the cursor
//! (`page = cursor / page_size`), so cursor moves that cross a page boundary
//! change the page and page moves reposition the cursor.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::vocabulary::EntryId;

/// A matched symbol together with the vocabulary handle it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: EntryId,
    pub text: String,
}

impl Candidate {
    pub fn new<T: Into<String>>(id: EntryId, text: T) -> Self {
        Candidate {
            id,
            text: text.into(),
        }
    }
}

/// A paginated list of candidates with cursor navigation.
#[derive(Debug, Clone)]
pub struct CandidateList {
    /// All available candidates, best first
    candidates: Vec<Candidate>,

    /// Number of candidates per page
    page_size: usize,

    /// Absolute index of the highlighted candidate
    cursor: usize,
}

impl CandidateList {
    /// Create a new empty candidate list with the default page size (9).
    pub fn new() -> Self {
        Self::with_page_size(9)
    }

    /// Create a candidate list with specified page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            candidates: Vec::new(),
            page_size: page_size.max(1), // Ensure at least 1
            cursor: 0,
        }
    }

    /// Set the page size. The cursor keeps its absolute position.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace all candidates wholesale, highlighting the first one.
    pub fn replace(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.cursor = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Get the candidate at an absolute index.
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Total number of pages, `ceil(len / page_size)`.
    pub fn num_pages(&self) -> usize {
        self.candidates.len().div_ceil(self.page_size)
    }

    /// Current page index (0-based), derived from the cursor.
    pub fn current_page(&self) -> usize {
        self.cursor / self.page_size
    }

    /// Absolute cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position relative to the start of the current page.
    pub fn page_cursor(&self) -> usize {
        self.cursor % self.page_size
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = (self.current_page() * self.page_size).min(self.candidates.len());
        let end = (start + self.page_size).min(self.candidates.len());
        start..end
    }

    /// Get the candidates for the current page.
    pub fn current_page_candidates(&self) -> &[Candidate] {
        &self.candidates[self.current_page_range()]
    }

    /// The highlighted candidate, if any.
    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.candidates.get(self.cursor)
    }

    /// Absolute index of the highlighted candidate, if any.
    pub fn selected_index(&self) -> Option<usize> {
        (self.cursor < self.candidates.len()).then_some(self.cursor)
    }

    /// Move the cursor to the previous candidate, crossing into the previous
    /// page when needed. Returns true if the cursor moved.
    pub fn cursor_up(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the next candidate, crossing into the next page
    /// when needed. Returns true if the cursor moved.
    pub fn cursor_down(&mut self) -> bool {
        if self.cursor + 1 < self.candidates.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move to the first candidate of the previous page.
    /// Returns true if the page changed.
    pub fn previous_page(&mut self) -> bool {
        let page = self.current_page();
        if page == 0 {
            return false;
        }
        self.cursor = (page - 1) * self.page_size;
        true
    }

    /// Move to the first candidate of the next page.
    /// Returns true if the page changed.
    pub fn next_page(&mut self) -> bool {
        let page = self.current_page();
        if page + 1 >= self.num_pages() {
            return false;
        }
        self.cursor = (page + 1) * self.page_size;
        true
    }

    /// Resolve a page-relative pick (0-based) against the current page.
    ///
    /// Returns `None` when the resulting index lies past the end of the list.
    pub fn resolve_absolute(&self, relative: usize) -> Option<usize> {
        let index = self.current_page() * self.page_size + relative;
        (index < self.candidates.len()).then_some(index)
    }

    /// Clear the candidate list.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.cursor = 0;
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}
