//! Matchers decide whether a watch entry applies to a read.
//!
//! Three variants:
//! - `Identity` matches one specific allocation (hash-indexed fast path)
//! - `Predicate` runs an arbitrary callback over the frame and the subject
//! - `Select` picks one of several alternatives and tells the handler which

use std::fmt;

use super::frame::FrameContext;
use crate::types::ValueId;
use crate::value::{Value, WeakValue};

/// Boxed predicate callback.
pub type PredicateFn = dyn Fn(&FrameContext, &Value) -> bool + Send + Sync;

/// Labelled predicate callback.
pub struct Predicate {
    label: String,
    f: Box<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Box::new(f),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn test(&self, frame: &FrameContext, subject: &Value) -> bool {
        (self.f)(frame, subject)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Boxed selector callback: index of the chosen alternative, if any.
pub type SelectFn = dyn Fn(&FrameContext, &Value) -> Option<usize> + Send + Sync;

/// Labelled selector callback.
///
/// A selector matches when it picks an alternative. The chosen index is
/// handed to the entry's handler through [`WatchHandler::on_select`], so
/// the choice is made once per read.
///
/// [`WatchHandler::on_select`]: super::handler::WatchHandler::on_select
pub struct Selector {
    label: String,
    f: Box<SelectFn>,
}

impl Selector {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FrameContext, &Value) -> Option<usize> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Box::new(f),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn select(&self, frame: &FrameContext, subject: &Value) -> Option<usize> {
        (self.f)(frame, subject)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Decides whether a watch applies to a read.
#[derive(Debug)]
pub enum Matcher {
    /// Matches reads of one specific allocation.
    ///
    /// Holds the target weakly: once the value is dropped the entry stays
    /// registered but never matches again.
    Identity(WeakValue),

    /// Matches reads for which the predicate returns true.
    Predicate(Predicate),

    /// Matches reads for which the selector picks an alternative.
    Select(Selector),
}

impl Matcher {
    pub fn identity(target: &Value) -> Self {
        Matcher::Identity(target.downgrade())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Predicate::new("predicate", f))
    }

    pub fn predicate_named<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Predicate::new(label, f))
    }

    pub fn select<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FrameContext, &Value) -> Option<usize> + Send + Sync + 'static,
    {
        Matcher::Select(Selector::new(label, f))
    }

    /// Identity key, for identity matchers.
    pub fn target_id(&self) -> Option<ValueId> {
        match self {
            Matcher::Identity(target) => Some(target.id()),
            Matcher::Predicate(_) | Matcher::Select(_) => None,
        }
    }

    pub fn matches(&self, frame: &FrameContext, subject: &Value) -> bool {
        self.selection(frame, subject).is_some()
    }

    /// Evaluate the matcher once, returning the selected alternative.
    ///
    /// Identity and predicate matchers always select `0` when they match.
    pub fn selection(&self, frame: &FrameContext, subject: &Value) -> Option<usize> {
        match self {
            Matcher::Identity(target) => {
                (target.is_alive() && target.id() == subject.id()).then_some(0)
            }
            Matcher::Predicate(predicate) => predicate.test(frame, subject).then_some(0),
            Matcher::Select(selector) => selector.select(frame, subject),
        }
    }

    /// Diagnostic descriptor for this matcher.
    pub fn describe(&self) -> MatcherInfo {
        match self {
            Matcher::Identity(target) => MatcherInfo::Identity {
                id: target.id(),
                alive: target.is_alive(),
            },
            Matcher::Predicate(predicate) => MatcherInfo::Predicate {
                label: predicate.label().to_string(),
            },
            Matcher::Select(selector) => MatcherInfo::Predicate {
                label: selector.label().to_string(),
            },
        }
    }
}

/// What introspection reports about a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherInfo {
    Identity { id: ValueId, alive: bool },
    Predicate { label: String },
}

impl fmt::Display for MatcherInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherInfo::Identity { id, alive: true } => write!(f, "id({id})"),
            MatcherInfo::Identity { id, alive: false } => write!(f, "id({id}, dropped)"),
            MatcherInfo::Predicate { label } => write!(f, "<{label}>"),
        }
    }
}
