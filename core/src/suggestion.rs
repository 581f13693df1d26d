//! Cancellable asynchronous candidate lookup.
//!
//! Every `request()` advances a shared generation counter and starts one
//! worker thread tagged with the new generation. Advancing the counter is
//! what cancels the previous lookup: a worker whose tag no longer matches
//! the counter drops its result instead of sending it, and the foreground
//! checks the tag again before handing a result out. A stale result is
//! therefore never observable, whatever order the workers finish in.
//!
//! Results travel as one `Completion` message per lookup, so a candidate
//! list is handed over whole or not at all.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::candidate::Candidate;
use crate::matcher::Matcher;
use crate::vocabulary::{EntryId, Vocabulary};
use crate::Config;

/// Tag identifying one lookup request. Later requests have larger tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookupGeneration(u64);

impl LookupGeneration {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Result of one finished lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub generation: LookupGeneration,
    pub query: String,
    pub candidates: Vec<Candidate>,
}

type ResultCache = Arc<Mutex<LruCache<String, Arc<[EntryId]>>>>;

/// Called on the worker thread once a lookup's result is queued.
///
/// The hook only signals; the host schedules `try_take` (or
/// `ImeEngine::poll`) on its own thread, where the generation check runs.
pub type CompletionHook = Arc<dyn Fn(LookupGeneration) + Send + Sync>;

/// Orchestrates lookups so that only the newest request's result survives.
///
/// Generic over M: the matching policy (e.g. `MatchPolicy`, or a custom
/// `Matcher` in tests).
pub struct SuggestionEngine<M> {
    vocab: Arc<Vocabulary>,
    matcher: Arc<M>,
    generation: Arc<AtomicU64>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    cache: Option<ResultCache>,
    max_candidates: usize,
    on_complete: Option<CompletionHook>,
}

impl<M> SuggestionEngine<M>
where
    M: Matcher + Send + Sync + 'static,
{
    /// Create an engine without result caching or truncation.
    pub fn new(vocab: Arc<Vocabulary>, matcher: M) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            vocab,
            matcher: Arc::new(matcher),
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
            cache: None,
            max_candidates: 0,
            on_complete: None,
        }
    }

    /// Create an engine honoring `max_candidates` and `max_cache_size`.
    pub fn with_config(vocab: Arc<Vocabulary>, matcher: M, config: &Config) -> Self {
        let mut engine = Self::new(vocab, matcher);
        engine.max_candidates = config.max_candidates;
        engine.cache = NonZeroUsize::new(config.max_cache_size)
            .map(|cap| Arc::new(Mutex::new(LruCache::new(cap))));
        engine
    }

    /// Install a hook run after each non-stale result is queued.
    ///
    /// Applies to lookups requested after this call.
    pub fn on_complete<F>(&mut self, hook: F)
    where
        F: Fn(LookupGeneration) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// The generation a result must carry to be accepted.
    pub fn current_generation(&self) -> LookupGeneration {
        LookupGeneration(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: LookupGeneration) -> bool {
        generation == self.current_generation()
    }

    /// Cancel any outstanding lookup and start a new one for `query`.
    ///
    /// The previous lookup is invalidated before this returns; the new one
    /// runs on its own thread.
    pub fn request(&mut self, query: &str) -> LookupGeneration {
        let generation = LookupGeneration(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        tracing::debug!(
            generation = generation.0,
            query,
            matcher = self.matcher.name(),
            "lookup requested"
        );

        let job = LookupJob {
            generation,
            query: query.to_string(),
            current: Arc::clone(&self.generation),
            vocab: Arc::clone(&self.vocab),
            matcher: Arc::clone(&self.matcher),
            cache: self.cache.clone(),
            max_candidates: self.max_candidates,
            tx: self.tx.clone(),
            on_complete: self.on_complete.clone(),
        };
        let fallback = job.clone();
        let spawned = thread::Builder::new()
            .name("semoji-lookup".to_string())
            .spawn(move || job.run());
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn lookup thread, matching inline");
            fallback.run();
        }
        generation
    }

    /// Invalidate any outstanding lookup without starting another.
    ///
    /// Safe to call repeatedly or when nothing is outstanding.
    pub fn cancel(&mut self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(cancelled = previous, "lookup cancelled");
    }

    /// Take the current generation's result if it has arrived.
    ///
    /// Stale results still queued are discarded.
    pub fn try_take(&self) -> Option<Completion> {
        let mut latest = None;
        for completion in self.rx.try_iter() {
            if self.is_current(completion.generation) {
                latest = Some(completion);
            } else {
                tracing::trace!(generation = completion.generation.0, "discarding stale result");
            }
        }
        latest
    }

    /// Block until the current generation's result arrives or `timeout`
    /// elapses. Stale results received meanwhile are discarded.
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        if let Some(completion) = self.try_take() {
            return Some(completion);
        }
        // Timeouts past the clock's range mean "no deadline"
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(completion) => completion,
                        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                            return None
                        }
                    }
                }
                None => self.rx.recv().ok()?,
            };
            if self.is_current(received.generation) {
                return Some(received);
            }
            tracing::trace!(generation = received.generation.0, "discarding stale result");
        }
    }
}

/// Everything a worker thread needs to run one lookup.
struct LookupJob<M> {
    generation: LookupGeneration,
    query: String,
    current: Arc<AtomicU64>,
    vocab: Arc<Vocabulary>,
    matcher: Arc<M>,
    cache: Option<ResultCache>,
    max_candidates: usize,
    tx: Sender<Completion>,
    on_complete: Option<CompletionHook>,
}

// Manual impl: M itself need not be Clone behind the Arc
impl<M> Clone for LookupJob<M> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            query: self.query.clone(),
            current: Arc::clone(&self.current),
            vocab: Arc::clone(&self.vocab),
            matcher: Arc::clone(&self.matcher),
            cache: self.cache.clone(),
            max_candidates: self.max_candidates,
            tx: self.tx.clone(),
            on_complete: self.on_complete.clone(),
        }
    }
}

impl<M: Matcher> LookupJob<M> {
    fn is_stale(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation.0
    }

    fn run(self) {
        if self.is_stale() {
            tracing::trace!(generation = self.generation.0, "lookup cancelled before start");
            return;
        }

        let ids = self.lookup();
        let limit = if self.max_candidates == 0 {
            ids.len()
        } else {
            self.max_candidates
        };
        let candidates: Vec<Candidate> = ids
            .iter()
            .take(limit)
            .filter_map(|id| self.vocab.symbol(*id).map(|s| Candidate::new(*id, s)))
            .collect();

        if self.is_stale() {
            tracing::trace!(generation = self.generation.0, "dropping stale result");
            return;
        }
        tracing::debug!(
            generation = self.generation.0,
            results = candidates.len(),
            "lookup complete"
        );
        // A closed channel means the engine is gone; nobody to notify
        let sent = self.tx.send(Completion {
            generation: self.generation,
            query: self.query,
            candidates,
        });
        if sent.is_ok() {
            if let Some(hook) = &self.on_complete {
                hook(self.generation);
            }
        }
    }

    fn lookup(&self) -> Arc<[EntryId]> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().get(self.query.as_str()) {
                return Arc::clone(hit);
            }
        }
        let ids: Arc<[EntryId]> = self.matcher.find(&self.query, &self.vocab).into();
        if let Some(cache) = &self.cache {
            cache.lock().put(self.query.clone(), Arc::clone(&ids));
        }
        ids
    }
}
