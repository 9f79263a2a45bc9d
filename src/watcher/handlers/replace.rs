//! Value-returning handler adapters.
//!
//! These model handlers that simply hand back "the value to observe". The
//! returned value always becomes a `Replace`, even when it is the original
//! allocation: that keeps "return a different but equivalent object" (proxy,
//! pointer, lazily computed value) on the same path as "return the same one".

use crate::value::Value;
use crate::watcher::{BoxError, FrameContext, HandlerOutcome, WatchHandler};

/// Handler built by [`replacing`].
pub struct Replacing<F> {
    name: String,
    f: F,
}

/// Handler built by [`try_replacing`].
pub struct TryReplacing<F> {
    name: String,
    f: F,
}

/// Wrap an infallible value-returning closure.
pub fn replacing<F>(name: impl Into<String>, f: F) -> Replacing<F>
where
    F: Fn(&FrameContext, &Value) -> Value + Send + Sync,
{
    Replacing {
        name: name.into(),
        f,
    }
}

/// Wrap a fallible value-returning closure. An `Err` aborts the read.
pub fn try_replacing<F>(name: impl Into<String>, f: F) -> TryReplacing<F>
where
    F: Fn(&FrameContext, &Value) -> Result<Value, BoxError> + Send + Sync,
{
    TryReplacing {
        name: name.into(),
        f,
    }
}

impl<F> WatchHandler for Replacing<F>
where
    F: Fn(&FrameContext, &Value) -> Value + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        Ok(HandlerOutcome::Replace((self.f)(frame, subject)))
    }
}

impl<F> WatchHandler for TryReplacing<F>
where
    F: Fn(&FrameContext, &Value) -> Result<Value, BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_read(&self, frame: &FrameContext, subject: &Value) -> Result<HandlerOutcome, BoxError> {
        Ok(match (self.f)(frame, subject) {
            Ok(value) => HandlerOutcome::Replace(value),
            Err(err) => HandlerOutcome::Abort(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_return_is_still_replace() {
        let handler = replacing("same", |_, v| v.clone());
        let value = Value::new(1234);
        let outcome = handler.on_read(&FrameContext::caller(), &value).unwrap();
        assert!(matches!(outcome, HandlerOutcome::Replace(v) if v.ptr_eq(&value)));
        assert_eq!(handler.name(), "same");
    }

    #[test]
    fn test_try_replacing_maps_err_to_abort() {
        let handler = try_replacing("guard", |_, v| match v.downcast_ref::<i32>() {
            Some(n) if *n >= 0 => Ok(Value::new(n * 2)),
            _ => Err("negative".into()),
        });
        let frame = FrameContext::caller();

        match handler.on_read(&frame, &Value::new(21)).unwrap() {
            HandlerOutcome::Replace(v) => assert_eq!(v.downcast_ref::<i32>(), Some(&42)),
            other => panic!("expected replace, got {other:?}"),
        }
        assert!(matches!(
            handler.on_read(&frame, &Value::new(-1)).unwrap(),
            HandlerOutcome::Abort(_)
        ));
    }
}
