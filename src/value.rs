//! Type-erased tracked values.
//!
//! A [`Value`] is a shared handle to an arbitrary payload. Its identity is
//! the address of the shared allocation, so clones of one `Value` are the
//! same tracked value while two separately constructed equal payloads are not.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::types::ValueId;

/// Anything that can live inside a [`Value`].
///
/// Implemented for every `Debug + Send + Sync + 'static` type.
pub trait Payload: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared, type-erased handle to a tracked payload.
#[derive(Clone)]
pub struct Value(Arc<dyn Payload>);

impl Value {
    /// Allocate a new tracked value.
    pub fn new<T: Payload>(payload: T) -> Self {
        Self(Arc::new(payload))
    }

    /// Wrap an existing allocation without copying it.
    pub fn from_arc<T: Payload>(payload: Arc<T>) -> Self {
        Self(payload)
    }

    /// Allocation identity.
    pub fn id(&self) -> ValueId {
        ValueId::from_addr(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Whether both handles denote the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        self.id() == other.id()
    }

    /// The payload as `Any`.
    ///
    /// Goes through the trait object: `Arc<dyn Payload>` is itself a
    /// `Payload`, and calling `as_any` on the `Arc` would erase the wrong type.
    fn payload(&self) -> &dyn Any {
        (*self.0).as_any()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload().downcast_ref::<T>()
    }

    /// String contents for `String`, `&'static str` and `Box<str>` payloads.
    pub fn as_str(&self) -> Option<&str> {
        let any = self.payload();
        if let Some(s) = any.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        if let Some(s) = any.downcast_ref::<&'static str>() {
            return Some(*s);
        }
        any.downcast_ref::<Box<str>>().map(|s| &**s)
    }

    /// Length of payloads that have one (strings, byte vectors, value lists).
    ///
    /// Returns `None` for payloads without a notion of length.
    pub fn len(&self) -> Option<usize> {
        if let Some(s) = self.as_str() {
            return Some(s.len());
        }
        let any = self.payload();
        if let Some(v) = any.downcast_ref::<Vec<Value>>() {
            return Some(v.len());
        }
        any.downcast_ref::<Vec<u8>>().map(Vec::len)
    }

    /// Non-owning handle that reserves this value's identity.
    pub fn downgrade(&self) -> WeakValue {
        WeakValue {
            id: self.id(),
            inner: Arc::downgrade(&self.0),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Weak counterpart of [`Value`].
///
/// Holding it does not keep the payload alive, but the allocation address
/// stays reserved, so the id can never be handed to an unrelated value.
#[derive(Clone)]
pub struct WeakValue {
    id: ValueId,
    inner: Weak<dyn Payload>,
}

impl WeakValue {
    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn upgrade(&self) -> Option<Value> {
        self.inner.upgrade().map(Value)
    }
}

impl fmt::Debug for WeakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakValue")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_identity() {
        let a = Value::new(String::from("some data"));
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_equal_payloads_are_distinct() {
        let a = Value::new(String::from("some data"));
        let b = Value::new(String::from("some data"));
        assert_eq!(a.as_str(), b.as_str());
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_len_duck_typing() {
        assert_eq!(Value::new("0123456789").len(), Some(10));
        assert_eq!(Value::new(String::from("abc")).len(), Some(3));
        assert_eq!(Value::new(vec![Value::new(1), Value::new(2)]).len(), Some(2));
        assert_eq!(Value::new(vec![0u8; 4]).len(), Some(4));
        assert_eq!(Value::new(1234_i64).len(), None);
    }

    #[test]
    fn test_downcast() {
        let v = Value::new(4567_i32);
        assert!(v.is::<i32>());
        assert_eq!(v.downcast_ref::<i32>(), Some(&4567));
        assert!(v.downcast_ref::<String>().is_none());
        assert_eq!(format!("{v:?}"), "4567");
    }

    #[test]
    fn test_weak_does_not_extend_lifetime() {
        let v = Value::new(String::from("payload"));
        let weak = v.downgrade();
        assert!(weak.is_alive());
        assert_eq!(weak.id(), v.id());
        assert!(weak.upgrade().unwrap().ptr_eq(&v));

        drop(v);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }
}
