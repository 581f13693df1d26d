//! IME session state.
//!
//! `ImeSession` owns the edit buffer and the candidate list and knows how to
//! project them into an `ImeContext`. It holds no lookup machinery; the
//! `ImeEngine` drives it.

use crate::candidate::CandidateList;
use crate::context::ImeContext;
use crate::input_buffer::InputBuffer;

/// Externally visible editing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    /// Empty buffer, no candidates
    #[default]
    Idle,
    /// Non-empty buffer; candidates may still be pending
    Editing,
}

/// IME session state combining buffer and candidates.
#[derive(Debug, Clone, Default)]
pub struct ImeSession {
    input_buffer: InputBuffer,
    candidates: CandidateList,
}

impl ImeSession {
    /// Create a new empty session with the default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with specified candidate page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            input_buffer: InputBuffer::new(),
            candidates: CandidateList::with_page_size(page_size),
        }
    }

    pub fn input_buffer(&self) -> &InputBuffer {
        &self.input_buffer
    }

    pub fn input_buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.input_buffer
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn candidates_mut(&mut self) -> &mut CandidateList {
        &mut self.candidates
    }

    /// Idle exactly when the buffer is empty.
    pub fn state(&self) -> EditState {
        if self.input_buffer.is_empty() {
            EditState::Idle
        } else {
            EditState::Editing
        }
    }

    /// Clear buffer and candidates, returning to Idle.
    pub fn clear(&mut self) {
        self.input_buffer.clear();
        self.candidates.clear();
    }

    /// Sync session state to an ImeContext for host rendering.
    ///
    /// Leaves `commit_text` untouched.
    pub fn sync_to_context(&self, context: &mut ImeContext, with_labels: bool) {
        context.clear();

        context.preedit_text = self.input_buffer.text();
        context.preedit_cursor = self.input_buffer.cursor();

        context.candidates = self
            .candidates
            .current_page_candidates()
            .iter()
            .map(|c| c.text.clone())
            .collect();
        if with_labels {
            context.candidate_labels = (1..=context.candidates.len())
                .map(|n| format!("{}:", n))
                .collect();
        }
        context.candidate_cursor = self.candidates.page_cursor();

        if self.candidates.num_pages() > 1 {
            let current_page = self.candidates.current_page() + 1; // 1-indexed for display
            context.auxiliary_text = format!("{}/{}", current_page, self.candidates.num_pages());
        }
    }
}
