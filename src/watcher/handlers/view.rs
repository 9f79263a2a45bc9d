//! Handler that reports every access and lets it through.
//!
//! Emits `Access to <value> (@<id>) at <file>:<line>:<function>` for each
//! read it sees.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::value::Value;
use crate::watcher::{BoxError, FrameContext, HandlerOutcome, WatchHandler};

/// Logging pass-through handler.
///
/// Counts invocations and, when built with [`View::recording`], keeps the
/// formatted messages for later inspection.
#[derive(Debug, Default)]
pub struct View {
    /// Number of reads seen.
    count: AtomicUsize,
    /// Captured messages, if recording.
    recorded: Option<Mutex<Vec<String>>>,
}

impl View {
    /// Create a view that only logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view that also keeps every message.
    pub fn recording() -> Self {
        Self {
            count: AtomicUsize::new(0),
            recorded: Some(Mutex::new(Vec::new())),
        }
    }

    /// Format the access message for one read.
    pub fn message(frame: &FrameContext, subject: &Value) -> String {
        format!("Access to {subject:?} (@{}) at {frame}", subject.id())
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Messages captured so far (empty unless recording).
    pub fn lines(&self) -> Vec<String> {
        self.recorded
            .as_ref()
            .map(|lines| lines.lock().clone())
            .unwrap_or_default()
    }
}

impl WatchHandler for View {
    fn name(&self) -> &str {
        "view"
    }

    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);

        let message = Self::message(frame, subject);
        crate::log_event!("view", "access", "{message}");
        if let Some(recorded) = &self.recorded {
            recorded.lock().push(message);
        }

        Ok(HandlerOutcome::PassThrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_counts_and_passes_through() {
        let view = View::recording();
        let value = Value::new(String::from("some data"));
        let frame = FrameContext::new("demo.rs", 3, 1).with_function("demo::f");

        let outcome = view.on_read(&frame, &value).unwrap();
        assert!(matches!(outcome, HandlerOutcome::PassThrough));
        view.on_read(&frame, &value).unwrap();

        assert_eq!(view.count(), 2);
        let lines = view.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!("Access to \"some data\" (@{}) at demo.rs:3:demo::f", value.id())
        );
    }

    #[test]
    fn test_plain_view_records_nothing() {
        let view = View::new();
        view.on_read(&FrameContext::caller(), &Value::new(1)).unwrap();
        assert_eq!(view.count(), 1);
        assert!(view.lines().is_empty());
    }
}
