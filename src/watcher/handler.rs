//! Handler trait and outcome types for read watches.

use std::fmt;

use super::error::{AccessDenied, BoxError};
use super::frame::FrameContext;
use crate::value::Value;

/// What happens to a read after its handler ran.
pub enum HandlerOutcome {
    /// The reader observes the original value.
    PassThrough,

    /// The reader observes this value instead. It is not re-checked
    /// against the registry for the same read.
    Replace(Value),

    /// The read fails with this error and produces no value.
    Abort(BoxError),
}

impl HandlerOutcome {
    pub fn pass() -> Self {
        HandlerOutcome::PassThrough
    }

    pub fn replace(value: Value) -> Self {
        HandlerOutcome::Replace(value)
    }

    pub fn abort(error: impl Into<BoxError>) -> Self {
        HandlerOutcome::Abort(error.into())
    }

    /// Abort with a plain message.
    pub fn abort_msg(message: impl Into<String>) -> Self {
        HandlerOutcome::Abort(Box::new(AccessDenied(message.into())))
    }
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::PassThrough => f.write_str("PassThrough"),
            HandlerOutcome::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            HandlerOutcome::Abort(err) => write!(f, "Abort({err})"),
        }
    }
}

/// Callback run synchronously when a watched value is read.
///
/// Returning `Err` is a handler fault: it reaches the reader unchanged,
/// the engine does not recover from it.
///
/// Closures `Fn(&FrameContext, &Value) -> Result<HandlerOutcome, BoxError>`
/// are handlers too, named `"handler"`. Use [`from_fn`] to give one a name.
pub trait WatchHandler: Send + Sync {
    /// Handler name for logging and diagnostics.
    fn name(&self) -> &str {
        "handler"
    }

    /// Handle one read of `subject` at `frame`.
    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError>;

    /// Handle a read for which the entry's matcher chose alternative `selection`.
    ///
    /// Only [`Matcher::Select`] picks anything but `0`. Handlers paired with
    /// a selector override this; the rest keep the default.
    ///
    /// [`Matcher::Select`]: super::matcher::Matcher::Select
    fn on_select(
        &self,
        frame: &FrameContext,
        subject: &Value,
        selection: usize,
    ) -> Result<HandlerOutcome, BoxError> {
        let _ = selection;
        self.on_read(frame, subject)
    }
}

impl<F> WatchHandler for F
where
    F: Fn(&FrameContext, &Value) -> Result<HandlerOutcome, BoxError> + Send + Sync,
{
    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        self(frame, subject)
    }
}

/// Handler backed by a closure, see [`from_fn`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// Build a named handler from a closure.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&FrameContext, &Value) -> Result<HandlerOutcome, BoxError> + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

impl<F> WatchHandler for FnHandler<F>
where
    F: Fn(&FrameContext, &Value) -> Result<HandlerOutcome, BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        (self.f)(frame, subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_handler() {
        let handler = from_fn("echo", |_, v| Ok(HandlerOutcome::replace(v.clone())));
        let value = Value::new(1);
        let outcome = handler.on_read(&FrameContext::caller(), &value).unwrap();
        assert!(matches!(outcome, HandlerOutcome::Replace(v) if v.ptr_eq(&value)));
        assert_eq!(handler.name(), "echo");
    }

    fn swap_for_zero(_: &FrameContext, _: &Value) -> Result<HandlerOutcome, BoxError> {
        Ok(HandlerOutcome::replace(Value::new(0)))
    }

    #[test]
    fn test_plain_functions_and_closures_are_handlers() {
        let frame = FrameContext::caller();
        let value = Value::new(1);

        let outcome = swap_for_zero.on_read(&frame, &value).unwrap();
        assert!(matches!(
            outcome,
            HandlerOutcome::Replace(v) if v.downcast_ref::<i32>() == Some(&0)
        ));
        assert_eq!(swap_for_zero.name(), "handler");

        let deny = |_: &FrameContext, _: &Value| -> Result<HandlerOutcome, BoxError> {
            Ok(HandlerOutcome::abort_msg("denied"))
        };
        let boxed: Box<dyn WatchHandler> = Box::new(deny);
        assert!(matches!(
            boxed.on_select(&frame, &value, 3).unwrap(),
            HandlerOutcome::Abort(_)
        ));
    }

    #[test]
    fn test_outcome_debug() {
        assert_eq!(format!("{:?}", HandlerOutcome::pass()), "PassThrough");
        assert_eq!(
            format!("{:?}", HandlerOutcome::replace(Value::new(7))),
            "Replace(7)"
        );
        assert_eq!(
            format!("{:?}", HandlerOutcome::abort_msg("no")),
            "Abort(no)"
        );
    }
}
