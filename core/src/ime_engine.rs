//! IME engine with session management and key event processing.
//!
//! `ImeEngine` is the edit controller: it owns the session (buffer and
//! candidates), interprets one `KeyEvent` at a time, restarts the
//! asynchronous lookup whenever the buffer changes and commits either the
//! raw buffer or the highlighted candidate on trigger keys.

use std::sync::Arc;
use std::time::Duration;

use crate::context::{ImeContext, Notification};
use crate::matcher::{MatchPolicy, Matcher};
use crate::session::{EditState, ImeSession};
use crate::suggestion::{Completion, LookupGeneration, SuggestionEngine};
use crate::vocabulary::Vocabulary;
use crate::Config;

/// Input events the engine can process.
///
/// The host bridge translates platform key codes into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Character input. Digits are treated as `Number`, `' '` as `Space`.
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    /// Candidate cursor up
    Up,
    /// Candidate cursor down
    Down,
    /// Previous candidate page (Alt+Up)
    PageUp,
    /// Next candidate page (Alt+Down)
    PageDown,
    Home,
    End,
    Space,
    Enter,
    Escape,
    /// Number key 0-9, main row or keypad
    Number(u8),
    /// The client lost input focus
    FocusOut,
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled by the IME
    Handled,
    /// Key was not handled (pass through to application)
    NotHandled,
}

impl KeyResult {
    pub fn is_handled(self) -> bool {
        self == KeyResult::Handled
    }
}

/// Punctuation that ends a word and commits the highlighted candidate.
pub fn is_word_break(ch: char) -> bool {
    matches!(ch, '.' | ',' | '?' | '!' | '(' | ')' | ';' | '\'' | '"')
}

/// Notifications kept when the host never drains the queue.
const MAX_PENDING_NOTIFICATIONS: usize = 256;

/// IME engine with session management.
///
/// Hosts that follow `Notification`s must drain `take_notifications()`
/// after each call; hosts that only read `context()` may ignore the queue,
/// which keeps just the most recent `MAX_PENDING_NOTIFICATIONS` entries.
///
/// # Example
///
/// ```
/// use semoji_core::{ImeEngine, KeyEvent, Vocabulary};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut ime = ImeEngine::from_config(Arc::new(Vocabulary::builtin()), Default::default());
/// for ch in "fire".chars() {
///     ime.process_key(KeyEvent::Char(ch));
/// }
/// ime.wait_for_suggestions(Duration::from_secs(5));
/// ime.process_key(KeyEvent::Space);
/// assert_eq!(ime.context().commit_text, "🔥 ");
/// ```
pub struct ImeEngine<M> {
    session: ImeSession,
    context: ImeContext,
    suggestions: SuggestionEngine<M>,
    notifications: Vec<Notification>,
    config: Config,
}

impl ImeEngine<MatchPolicy> {
    /// Create an engine using the matching policy named in `config`.
    pub fn from_config(vocab: Arc<Vocabulary>, config: Config) -> Self {
        let policy = config.match_policy;
        Self::with_config(vocab, policy, config)
    }
}

impl<M> ImeEngine<M>
where
    M: Matcher + Send + Sync + 'static,
{
    /// Create an engine with default configuration and the given matcher.
    pub fn new(vocab: Arc<Vocabulary>, matcher: M) -> Self {
        Self::with_config(vocab, matcher, Config::default())
    }

    pub fn with_config(vocab: Arc<Vocabulary>, matcher: M, config: Config) -> Self {
        Self {
            session: ImeSession::with_page_size(config.page_size),
            context: ImeContext::new(),
            suggestions: SuggestionEngine::with_config(vocab, matcher, &config),
            notifications: Vec::new(),
            config,
        }
    }

    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    pub fn session(&self) -> &ImeSession {
        &self.session
    }

    pub fn suggestions(&self) -> &SuggestionEngine<M> {
        &self.suggestions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> EditState {
        self.session.state()
    }

    /// Run `hook` on the lookup thread whenever a fresh result is ready.
    ///
    /// The host should respond by calling `poll()` from its own thread;
    /// results are only ever applied there.
    pub fn on_suggestions_ready<F>(&mut self, hook: F)
    where
        F: Fn(LookupGeneration) + Send + Sync + 'static,
    {
        self.suggestions.on_complete(hook);
    }

    /// Drain queued notifications in emission order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Drop all editing state without committing.
    pub fn reset(&mut self) {
        self.suggestions.cancel();
        self.session.clear();
        self.notify_preedit();
        self.notify(Notification::CandidatesChanged);
        self.sync();
    }

    /// Focus left the client: same as `KeyEvent::FocusOut`.
    pub fn focus_out(&mut self) {
        self.process_key(KeyEvent::FocusOut);
    }

    /// Apply the current lookup's result if it has arrived.
    ///
    /// Returns true if the candidate list was replaced.
    pub fn poll(&mut self) -> bool {
        match self.suggestions.try_take() {
            Some(completion) => self.apply(completion),
            None => false,
        }
    }

    /// Block up to `timeout` for the current lookup's result and apply it.
    ///
    /// Returns true if the candidate list was replaced.
    pub fn wait_for_suggestions(&mut self, timeout: Duration) -> bool {
        match self.suggestions.wait(timeout) {
            Some(completion) => self.apply(completion),
            None => false,
        }
    }

    fn apply(&mut self, completion: Completion) -> bool {
        // A reset cancels the lookup, so a current result implies a buffer
        if self.session.input_buffer().is_empty() {
            return false;
        }
        tracing::debug!(
            generation = completion.generation.value(),
            results = completion.candidates.len(),
            "candidates updated"
        );
        self.session.candidates_mut().replace(completion.candidates);
        self.notify(Notification::CandidatesChanged);
        self.sync();
        true
    }

    /// Process a key event and update IME state.
    ///
    /// After calling this, the host should read `context()` and drain
    /// `take_notifications()`.
    ///
    /// Returns `KeyResult::Handled` if the IME consumed the key,
    /// or `KeyResult::NotHandled` if it should pass through to the application.
    pub fn process_key(&mut self, key: KeyEvent) -> KeyResult {
        // Clear commit text from previous key
        self.context.commit_text.clear();

        let key = match key {
            KeyEvent::Char(' ') => KeyEvent::Space,
            KeyEvent::Char(ch @ '0'..='9') => KeyEvent::Number(ch as u8 - b'0'),
            other => other,
        };
        tracing::trace!(?key, state = ?self.state(), "process key");

        let result = self.dispatch(key);
        self.sync();
        result
    }

    fn dispatch(&mut self, key: KeyEvent) -> KeyResult {
        let empty = self.session.input_buffer().is_empty();
        let selected = self
            .session
            .candidates()
            .selected_candidate()
            .map(|c| c.text.clone());

        match key {
            KeyEvent::FocusOut => {
                self.reset();
                KeyResult::Handled
            }
            KeyEvent::Space => {
                match selected {
                    Some(text) => self.commit(text + " ", true),
                    None => {
                        let text = self.session.input_buffer().text() + " ";
                        self.commit(text, false)
                    }
                }
                KeyResult::Handled
            }
            KeyEvent::Enter => match selected {
                Some(text) => {
                    self.commit(text, true);
                    KeyResult::Handled
                }
                None => {
                    if !empty {
                        let text = self.session.input_buffer().text();
                        self.commit(text, false);
                    }
                    // The host still sees the Return key
                    KeyResult::NotHandled
                }
            },
            _ if empty => self.dispatch_idle(key),
            KeyEvent::Escape | KeyEvent::Number(0) => {
                let text = self.session.input_buffer().text();
                self.commit(text, false);
                KeyResult::Handled
            }
            KeyEvent::Number(n @ 1..=9) => {
                let index = self
                    .session
                    .candidates()
                    .resolve_absolute(usize::from(n - 1));
                let picked = index
                    .and_then(|i| self.session.candidates().get(i))
                    .map(|c| c.text.clone());
                if let Some(text) = picked {
                    self.commit(text, true);
                }
                // Unresolvable picks are swallowed while editing
                KeyResult::Handled
            }
            KeyEvent::Number(_) => KeyResult::NotHandled,
            KeyEvent::Left => {
                if self.session.input_buffer_mut().move_left() {
                    self.notify_preedit();
                }
                KeyResult::Handled
            }
            KeyEvent::Right => {
                if self.session.input_buffer_mut().move_right() {
                    self.notify_preedit();
                }
                KeyResult::Handled
            }
            KeyEvent::Home => {
                self.session.input_buffer_mut().move_to_start();
                self.notify_preedit();
                KeyResult::Handled
            }
            KeyEvent::End => {
                self.session.input_buffer_mut().move_to_end();
                self.notify_preedit();
                KeyResult::Handled
            }
            KeyEvent::Up => {
                self.session.candidates_mut().cursor_up();
                self.notify(Notification::CandidatesChanged);
                KeyResult::Handled
            }
            KeyEvent::Down => {
                self.session.candidates_mut().cursor_down();
                self.notify(Notification::CandidatesChanged);
                KeyResult::Handled
            }
            KeyEvent::PageUp => {
                self.session.candidates_mut().previous_page();
                self.notify(Notification::CandidatesChanged);
                KeyResult::Handled
            }
            KeyEvent::PageDown => {
                self.session.candidates_mut().next_page();
                self.notify(Notification::CandidatesChanged);
                KeyResult::Handled
            }
            KeyEvent::Backspace => {
                if self.session.input_buffer_mut().delete_before() {
                    self.buffer_changed();
                }
                KeyResult::Handled
            }
            KeyEvent::Delete => {
                if self.session.input_buffer_mut().delete_after() {
                    self.buffer_changed();
                }
                KeyResult::Handled
            }
            KeyEvent::Char(ch) => self.process_char(ch, selected),
        }
    }

    /// Keys arriving with an empty buffer, other than the ones every state
    /// handles the same way.
    fn dispatch_idle(&mut self, key: KeyEvent) -> KeyResult {
        match key {
            KeyEvent::Char(ch) => self.process_char(ch, None),
            _ => KeyResult::NotHandled,
        }
    }

    fn process_char(&mut self, ch: char, selected: Option<String>) -> KeyResult {
        if is_word_break(ch) {
            return match selected {
                Some(text) => {
                    self.commit(format!("{}{}", text, ch), true);
                    KeyResult::Handled
                }
                None => KeyResult::NotHandled,
            };
        }

        if (ch as u32) > 128 || ch.is_control() {
            return KeyResult::NotHandled;
        }

        if self.session.input_buffer().is_empty() {
            self.notify(Notification::ClearSelection);
        }
        self.session.input_buffer_mut().insert_char(ch);
        self.buffer_changed();
        KeyResult::Handled
    }

    /// Restart the lookup for the new buffer, or go Idle if it is empty.
    ///
    /// Emits the preedit update either way (`reset` does it when empty).
    fn buffer_changed(&mut self) {
        if self.session.input_buffer().is_empty() {
            self.reset();
            return;
        }
        self.notify_preedit();
        let text = self.session.input_buffer().text();
        self.suggestions.request(&text);
        // Displayed candidates belong to the superseded query
        self.session.candidates_mut().clear();
        self.notify(Notification::CandidatesChanged);
    }

    fn commit(&mut self, text: String, learn: bool) {
        tracing::debug!(text = %text, learn, "commit");
        self.context.commit_text = text.clone();
        self.notify(Notification::Commit { text, learn });
        self.reset();
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
        if self.notifications.len() > MAX_PENDING_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_PENDING_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    fn notify_preedit(&mut self) {
        let buffer = self.session.input_buffer();
        let notification = Notification::PreeditChanged {
            text: buffer.text(),
            cursor: buffer.cursor(),
        };
        self.notify(notification);
    }

    fn sync(&mut self) {
        self.session
            .sync_to_context(&mut self.context, self.config.select_labels);
    }
}
