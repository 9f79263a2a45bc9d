//! Handler that denies every read it is bound to.

use crate::value::Value;
use crate::watcher::{AccessDenied, BoxError, FrameContext, HandlerOutcome, WatchHandler};

const DEFAULT_MESSAGE: &str = "can't touch this";

/// Sandboxing handler: aborts every matching read with [`AccessDenied`].
#[derive(Debug, Clone)]
pub struct Forbid {
    message: String,
}

impl Forbid {
    pub fn new() -> Self {
        Self::with_message(DEFAULT_MESSAGE)
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Forbid {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchHandler for Forbid {
    fn name(&self) -> &str {
        "forbid"
    }

    fn on_read(&self, frame: &FrameContext, _subject: &Value) -> Result<HandlerOutcome, BoxError> {
        crate::debug_event!("forbid", "denied", "{frame}");
        Ok(HandlerOutcome::Abort(Box::new(AccessDenied(
            self.message.clone(),
        ))))
    }
}
