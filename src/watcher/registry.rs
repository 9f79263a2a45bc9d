//! Watch registry with copy-on-write snapshots.
//!
//! The registry is the single source of truth queried on every read. Each
//! mutation publishes a new immutable [`WatchSnapshot`]; dispatches that
//! already took a snapshot keep scanning it, later reads see the new one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::frame::FrameContext;
use super::handler::WatchHandler;
use super::handlers::PredicateTable;
use super::matcher::{Matcher, MatcherInfo};
use crate::config::WatchConfig;
use crate::types::{ValueId, WatchToken};
use crate::value::Value;

/// Handler shared between entries and snapshots.
pub type SharedHandler = Arc<dyn WatchHandler>;

/// One registered watch: a matcher bound to a handler.
pub struct WatchEntry {
    token: WatchToken,
    matcher: Matcher,
    handler: SharedHandler,
}

impl WatchEntry {
    pub fn token(&self) -> WatchToken {
        self.token
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn handler(&self) -> &dyn WatchHandler {
        self.handler.as_ref()
    }

    pub fn info(&self) -> WatchInfo {
        WatchInfo {
            token: self.token,
            matcher: self.matcher.describe(),
            handler: self.handler.name().to_string(),
        }
    }
}

impl fmt::Debug for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchEntry")
            .field("token", &self.token)
            .field("matcher", &self.matcher)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Diagnostic view of a registered watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchInfo {
    pub token: WatchToken,
    pub matcher: MatcherInfo,
    pub handler: String,
}

impl fmt::Display for WatchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.token, self.matcher, self.handler)
    }
}

/// Entry chosen for a read, with the alternative its matcher selected.
#[derive(Debug, Clone, Copy)]
pub struct WatchMatch<'a> {
    pub entry: &'a Arc<WatchEntry>,
    pub selection: usize,
}

fn evaluate<'a>(
    entry: &'a Arc<WatchEntry>,
    frame: &FrameContext,
    subject: &Value,
) -> Option<WatchMatch<'a>> {
    let selection = entry.matcher.selection(frame, subject)?;
    Some(WatchMatch { entry, selection })
}

/// Immutable, ordered view of the registry at one point in time.
#[derive(Debug, Default)]
pub struct WatchSnapshot {
    /// Entries in registration order.
    entries: Vec<Arc<WatchEntry>>,
    /// Earliest identity entry position per tracked id.
    identity_index: Option<HashMap<ValueId, usize>>,
}

impl WatchSnapshot {
    fn build(entries: Vec<Arc<WatchEntry>>, indexed: bool) -> Self {
        let identity_index = indexed.then(|| {
            let mut index = HashMap::new();
            for (pos, entry) in entries.iter().enumerate() {
                if let Some(id) = entry.matcher.target_id() {
                    index.entry(id).or_insert(pos);
                }
            }
            index
        });

        Self {
            entries,
            identity_index,
        }
    }

    pub fn entries(&self) -> &[Arc<WatchEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest-registered entry whose matcher accepts this read.
    ///
    /// Each matcher consulted is evaluated exactly once. With the identity
    /// index, only non-identity entries registered before the earliest
    /// identity hit are evaluated.
    pub fn first_match(&self, frame: &FrameContext, subject: &Value) -> Option<WatchMatch<'_>> {
        let hit = |entry| evaluate(entry, frame, subject);

        let Some(index) = &self.identity_index else {
            return self.entries.iter().find_map(hit);
        };

        let identity_hit = index.get(&subject.id()).copied();
        let limit = identity_hit.unwrap_or(self.entries.len());

        let earlier = self.entries[..limit]
            .iter()
            .filter(|entry| entry.matcher.target_id().is_none())
            .find_map(hit);
        if earlier.is_some() {
            return earlier;
        }

        identity_hit.and_then(|pos| hit(&self.entries[pos]))
    }

    pub fn infos(&self) -> Vec<WatchInfo> {
        self.entries.iter().map(|entry| entry.info()).collect()
    }
}

/// Ordered, mutable set of read watches.
///
/// Safe to share across threads. Mutations and snapshots are serialized by
/// a read/write lock that is never held while matchers or handlers run, so
/// handlers may freely register and unregister watches.
pub struct WatchRegistry {
    state: RwLock<Arc<WatchSnapshot>>,
    next_token: AtomicU64,
    identity_index: bool,
}

impl WatchRegistry {
    /// Create an empty registry with default settings.
    pub fn new() -> Self {
        Self::with_config(&WatchConfig::default())
    }

    pub fn with_config(config: &WatchConfig) -> Self {
        Self {
            state: RwLock::new(Arc::new(WatchSnapshot::build(
                Vec::new(),
                config.identity_index,
            ))),
            next_token: AtomicU64::new(1),
            identity_index: config.identity_index,
        }
    }

    fn issue_token(&self) -> WatchToken {
        let raw = self.next_token.fetch_add(1, Ordering::Relaxed);
        WatchToken::new(raw).unwrap_or_else(|| unreachable!("token counter starts at 1"))
    }

    fn make_entry(&self, matcher: Matcher, handler: SharedHandler) -> Arc<WatchEntry> {
        Arc::new(WatchEntry {
            token: self.issue_token(),
            matcher,
            handler,
        })
    }

    /// Append a watch after all existing ones.
    pub fn register(&self, matcher: Matcher, handler: impl WatchHandler + 'static) -> WatchToken {
        self.register_shared(matcher, Arc::new(handler))
    }

    /// Append a watch whose handler is shared with other entries.
    pub fn register_shared(&self, matcher: Matcher, handler: SharedHandler) -> WatchToken {
        let entry = self.make_entry(matcher, handler);
        let token = entry.token;
        let info = entry.info();

        {
            let mut state = self.state.write();
            let mut entries = state.entries.clone();
            entries.push(entry);
            *state = Arc::new(WatchSnapshot::build(entries, self.identity_index));
        }

        crate::debug_event!("registry", "registered", "{info}");
        token
    }

    /// Watch reads of one specific value.
    pub fn watch(&self, target: &Value, handler: impl WatchHandler + 'static) -> WatchToken {
        self.register(Matcher::identity(target), handler)
    }

    /// Watch reads accepted by a predicate.
    pub fn watch_if<F>(&self, predicate: F, handler: impl WatchHandler + 'static) -> WatchToken
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        self.register(Matcher::predicate(predicate), handler)
    }

    /// Register a predicate table as a single entry.
    pub fn register_table(&self, table: PredicateTable) -> WatchToken {
        let (matcher, handler) = table.into_watch();
        self.register(matcher, handler)
    }

    /// Remove the entry with this token.
    ///
    /// Returns `false` if no such entry exists; that is not an error.
    pub fn unregister(&self, token: WatchToken) -> bool {
        let removed = {
            let mut state = self.state.write();
            if !state.entries.iter().any(|entry| entry.token == token) {
                false
            } else {
                let entries = state
                    .entries
                    .iter()
                    .filter(|entry| entry.token != token)
                    .cloned()
                    .collect();
                *state = Arc::new(WatchSnapshot::build(entries, self.identity_index));
                true
            }
        };

        if removed {
            crate::debug_event!("registry", "unregistered", "{token}");
        } else {
            crate::debug_event!("registry", "unregister ignored", "{token} not registered");
        }
        removed
    }

    /// Atomically swap the whole set of watches.
    ///
    /// Returns the tokens of the new entries, in order.
    pub fn replace_all<I>(&self, entries: I) -> Vec<WatchToken>
    where
        I: IntoIterator<Item = (Matcher, SharedHandler)>,
    {
        let entries: Vec<Arc<WatchEntry>> = entries
            .into_iter()
            .map(|(matcher, handler)| self.make_entry(matcher, handler))
            .collect();
        let tokens: Vec<WatchToken> = entries.iter().map(|entry| entry.token).collect();

        *self.state.write() = Arc::new(WatchSnapshot::build(entries, self.identity_index));

        crate::debug_event!("registry", "replaced", "{} entries", tokens.len());
        tokens
    }

    /// Remove every watch.
    pub fn clear(&self) {
        self.replace_all(std::iter::empty());
    }

    /// Current state of the registry.
    pub fn snapshot(&self) -> Arc<WatchSnapshot> {
        Arc::clone(&self.state.read())
    }

    /// Describe every active watch, in registration order.
    pub fn entries(&self) -> Vec<WatchInfo> {
        self.snapshot().infos()
    }

    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }
}

impl Default for WatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("entries", &self.entries())
            .field("identity_index", &self.identity_index)
            .finish()
    }
}
