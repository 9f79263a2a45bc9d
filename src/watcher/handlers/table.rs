//! Self-dispatching predicate table.
//!
//! A table is an ordered list of `(predicate, handler)` rows registered as a
//! single watch entry. Rows are not individually removable; unregister the
//! table's token and register a new table instead.
//!
//! Only one row runs per read: the first whose predicate accepts it.

use std::sync::Arc;

use crate::value::Value;
use crate::watcher::registry::SharedHandler;
use crate::watcher::{BoxError, FrameContext, HandlerOutcome, Matcher, Predicate, WatchHandler};

struct Row {
    predicate: Predicate,
    handler: SharedHandler,
}

/// Ordered predicate-to-handler table.
///
/// The entry matches a read when any row's predicate accepts it. Rows are
/// tried in order, each predicate at most once per read, and only the first
/// accepting row's handler runs; later rows that would also accept the read
/// are skipped. Use separate watch entries for handlers that must all see
/// the same read.
pub struct PredicateTable {
    label: String,
    rows: Vec<Row>,
}

impl PredicateTable {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn row<F>(mut self, predicate: F, handler: impl WatchHandler + 'static) -> Self
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        self.push(predicate, Arc::new(handler));
        self
    }

    /// Append a row whose handler is shared.
    pub fn push<F>(&mut self, predicate: F, handler: SharedHandler)
    where
        F: Fn(&FrameContext, &Value) -> bool + Send + Sync + 'static,
    {
        let label = format!("{}[{}]", self.label, self.rows.len());
        self.rows.push(Row {
            predicate: Predicate::new(label, predicate),
            handler,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into the matcher and handler of a single watch entry.
    ///
    /// The matcher selects the accepting row; the handler runs that row
    /// without testing predicates again.
    pub fn into_watch(self) -> (Matcher, TableHandler) {
        let rows = Arc::new(self.rows);
        let matcher_rows = Arc::clone(&rows);
        let matcher = Matcher::select(self.label.clone(), move |frame, subject| {
            first_accepting(&matcher_rows, frame, subject)
        });

        (
            matcher,
            TableHandler {
                label: self.label,
                rows,
            },
        )
    }
}

fn first_accepting(rows: &[Row], frame: &FrameContext, subject: &Value) -> Option<usize> {
    rows.iter().position(|row| row.predicate.test(frame, subject))
}

/// Handler half of a registered [`PredicateTable`].
pub struct TableHandler {
    label: String,
    rows: Arc<Vec<Row>>,
}

impl WatchHandler for TableHandler {
    fn name(&self) -> &str {
        &self.label
    }

    /// Called directly, outside a registry, the row still has to be found.
    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        match first_accepting(&self.rows, frame, subject) {
            Some(selection) => self.on_select(frame, subject, selection),
            None => Ok(HandlerOutcome::PassThrough),
        }
    }

    fn on_select(
        &self,
        frame: &FrameContext,
        subject: &Value,
        selection: usize,
    ) -> Result<HandlerOutcome, BoxError> {
        let Some(row) = self.rows.get(selection) else {
            return Ok(HandlerOutcome::PassThrough);
        };
        crate::debug_event!(self.label, "row", "{}", row.predicate.label());
        row.handler.on_read(frame, subject)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::watcher::handlers::{Forbid, View, replacing};
    use crate::watcher::{AccessInterceptor, WatchRegistry};

    #[test]
    fn test_table_first_row_wins() {
        let table = PredicateTable::new("sized")
            .row(|_, v| v.len().is_some_and(|n| n > 9), View::new())
            .row(|_, v| v.len().is_some(), Forbid::new());
        assert_eq!(table.len(), 2);

        let (matcher, handler) = table.into_watch();
        let frame = FrameContext::caller();
        let long = Value::new("0123456789");
        let short = Value::new("abc");
        let number = Value::new(5);

        assert!(matcher.matches(&frame, &long));
        assert!(matcher.matches(&frame, &short));
        assert!(!matcher.matches(&frame, &number));

        assert!(matches!(
            handler.on_read(&frame, &long).unwrap(),
            HandlerOutcome::PassThrough
        ));
        assert!(matches!(
            handler.on_read(&frame, &short).unwrap(),
            HandlerOutcome::Abort(_)
        ));
        assert!(matches!(
            handler.on_read(&frame, &number).unwrap(),
            HandlerOutcome::PassThrough
        ));
    }

    #[test]
    fn test_table_describes_as_one_predicate() {
        let table = PredicateTable::new("table").row(
            |_, _| true,
            replacing("const", |_, _| Value::new(0)),
        );
        let (matcher, handler) = table.into_watch();
        assert_eq!(matcher.describe().to_string(), "<table>");
        assert_eq!(handler.name(), "table");
    }

    #[test]
    fn test_table_selects_row_once_per_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view = Arc::new(View::new());
        let mut table = PredicateTable::new("counted");
        {
            let calls = Arc::clone(&calls);
            table.push(
                move |_, _| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    true
                },
                view.clone(),
            );
        }

        let registry = Arc::new(WatchRegistry::new());
        registry.register_table(table);
        let interceptor = AccessInterceptor::new(registry);

        let subject = Value::new("x");
        interceptor.read(FrameContext::caller(), &subject).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(view.count(), 1);

        interceptor.read(FrameContext::caller(), &subject).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(view.count(), 2);
    }

    #[test]
    fn test_row_accepting_only_once_still_runs() {
        let seen = Arc::new(AtomicUsize::new(0));
        let row_view = Arc::new(View::new());
        let later_view = Arc::new(View::new());

        let mut table = PredicateTable::new("first-only");
        {
            let seen = Arc::clone(&seen);
            table.push(
                move |_, _| seen.fetch_add(1, Ordering::SeqCst) == 0,
                row_view.clone(),
            );
        }

        let registry = Arc::new(WatchRegistry::new());
        registry.register_table(table);
        registry.register_shared(Matcher::predicate(|_, _| true), later_view.clone());
        let interceptor = AccessInterceptor::new(registry);

        let subject = Value::new(1);
        interceptor.read(FrameContext::caller(), &subject).unwrap();
        assert_eq!(row_view.count(), 1);
        assert_eq!(later_view.count(), 0);

        // The row no longer accepts, so the table yields to the later entry.
        interceptor.read(FrameContext::caller(), &subject).unwrap();
        assert_eq!(row_view.count(), 1);
        assert_eq!(later_view.count(), 1);
    }
}
