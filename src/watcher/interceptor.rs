//! Dispatch point for read events.

use std::fmt;
use std::sync::Arc;

use super::error::ReadError;
use super::frame::{AccessEvent, FrameContext};
use super::handler::HandlerOutcome;
use super::registry::WatchRegistry;
use crate::config::WatchConfig;
use crate::value::Value;

/// Routes each read to the first matching watch and applies its outcome.
///
/// Cheap to clone; clones share the same registry. There is no "already
/// dispatching" state: a handler that reads tracked values triggers nested
/// dispatches against whatever the registry holds at that moment.
#[derive(Clone)]
pub struct AccessInterceptor {
    registry: Arc<WatchRegistry>,
    trace_dispatch: bool,
}

impl AccessInterceptor {
    pub fn new(registry: Arc<WatchRegistry>) -> Self {
        Self::with_config(registry, &WatchConfig::default())
    }

    pub fn with_config(registry: Arc<WatchRegistry>, config: &WatchConfig) -> Self {
        Self {
            registry,
            trace_dispatch: config.trace_dispatch,
        }
    }

    /// Registry consulted on every read. Mutations take effect for the next read.
    pub fn registry(&self) -> &Arc<WatchRegistry> {
        &self.registry
    }

    /// Resolve one read event to the value the reader observes.
    ///
    /// Unmatched reads pass through. A `Replace` value is returned as is
    /// and is not dispatched again for this event.
    pub fn dispatch(&self, event: AccessEvent) -> Result<Value, ReadError> {
        let AccessEvent { frame, subject } = event;

        let (entry, selection) = {
            let snapshot = self.registry.snapshot();
            match snapshot.first_match(&frame, &subject) {
                Some(hit) => (Arc::clone(hit.entry), hit.selection),
                None => {
                    if self.trace_dispatch {
                        crate::debug_event!("interceptor", "unmatched", "{subject:?} at {frame}");
                    }
                    return Ok(subject);
                }
            }
        };

        let handler = entry.handler();
        if self.trace_dispatch {
            crate::debug_event!(
                "interceptor",
                "matched",
                "{} {} for {subject:?} at {frame}",
                entry.token(),
                handler.name()
            );
        }

        match handler.on_select(&frame, &subject, selection) {
            Ok(HandlerOutcome::PassThrough) => Ok(subject),
            Ok(HandlerOutcome::Replace(value)) => {
                if self.trace_dispatch {
                    crate::debug_event!("interceptor", "replaced", "{subject:?} -> {value:?}");
                }
                Ok(value)
            }
            Ok(HandlerOutcome::Abort(source)) => {
                crate::debug_event!(handler.name(), "aborted read", "{source}");
                Err(ReadError::Aborted {
                    handler: handler.name().to_string(),
                    source,
                })
            }
            Err(source) => {
                tracing::warn!("[{}] handler error: {source}", handler.name());
                Err(ReadError::HandlerFault {
                    handler: handler.name().to_string(),
                    source,
                })
            }
        }
    }

    /// Dispatch a read of `subject` at `frame`.
    pub fn read(&self, frame: FrameContext, subject: &Value) -> Result<Value, ReadError> {
        self.dispatch(AccessEvent::new(frame, subject.clone()))
    }
}

impl fmt::Debug for AccessInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessInterceptor")
            .field("registry", &self.registry)
            .field("trace_dispatch", &self.trace_dispatch)
            .finish()
    }
}
