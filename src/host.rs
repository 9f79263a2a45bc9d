//! Host read path: interceptor installation and proxy bindings.
//!
//! Rust has no hook on raw loads, so reads are produced explicitly: code
//! routes accesses through [`Binding`] (or the [`Readable`] trait), and each
//! access calls into the interceptor installed for the current thread.
//!
//! ```
//! use std::sync::Arc;
//! use rwatch::{AccessInterceptor, Binding, Value, WatchRegistry, install_interceptor, read};
//! use rwatch::handlers::View;
//!
//! let registry = Arc::new(WatchRegistry::new());
//! let _guard = install_interceptor(AccessInterceptor::new(Arc::clone(&registry)));
//!
//! let x = Binding::new(Value::new("some data"));
//! let view = Arc::new(View::new());
//! registry.register_shared(rwatch::Matcher::identity(x.peek()), view.clone());
//!
//! let seen = read!(x).unwrap();
//! assert_eq!(seen.as_str(), Some("some data"));
//! assert_eq!(view.count(), 1);
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::value::Value;
use crate::watcher::{AccessInterceptor, FrameContext, ReadError};

thread_local! {
    static CURRENT: RefCell<Option<AccessInterceptor>> = const { RefCell::new(None) };
}

/// Restores the previously installed interceptor when dropped.
///
/// Guards must be dropped in reverse order of installation.
#[must_use = "the interceptor is uninstalled when the guard is dropped"]
pub struct InstallGuard {
    previous: Option<AccessInterceptor>,
    /// Bound to the installing thread.
    _not_send: PhantomData<*const ()>,
}

impl Drop for InstallGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        let replaced = CURRENT.with(|current| current.replace(previous));
        drop(replaced);
        crate::debug_event!("host", "interceptor uninstalled");
    }
}

/// Bind `interceptor` to the current thread's read path.
///
/// Every read produced on this thread is dispatched through it until the
/// guard is dropped. Installing again while a guard is alive shadows the
/// earlier interceptor.
pub fn install_interceptor(interceptor: AccessInterceptor) -> InstallGuard {
    let previous = CURRENT.with(|current| current.replace(Some(interceptor)));
    crate::debug_event!(
        "host",
        "interceptor installed",
        "shadowing: {}",
        previous.is_some()
    );
    InstallGuard {
        previous,
        _not_send: PhantomData,
    }
}

/// The interceptor installed on this thread, if any.
pub fn current_interceptor() -> Option<AccessInterceptor> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Produce one read event for `subject`.
///
/// Passes the value through unchanged when no interceptor is installed.
pub fn intercept(frame: FrameContext, subject: &Value) -> Result<Value, ReadError> {
    // Clone out of the cell so nested reads from handlers can reach it.
    match current_interceptor() {
        Some(interceptor) => interceptor.read(frame, subject),
        None => Ok(subject.clone()),
    }
}

/// Something whose content can be observed through the interceptor.
pub trait Readable {
    fn read_at(&self, frame: FrameContext) -> Result<Value, ReadError>;
}

impl Readable for Value {
    fn read_at(&self, frame: FrameContext) -> Result<Value, ReadError> {
        intercept(frame, self)
    }
}

/// A named slot holding a tracked value.
///
/// Loading the slot is a read; assigning to it is not.
#[derive(Debug, Clone)]
pub struct Binding {
    value: Value,
}

impl Binding {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Load the bound value through the interceptor.
    #[track_caller]
    pub fn get(&self) -> Result<Value, ReadError> {
        self.read_at(FrameContext::caller())
    }

    /// Rebind the slot, returning the previous value. Never dispatches.
    pub fn set(&mut self, value: Value) -> Value {
        std::mem::replace(&mut self.value, value)
    }

    /// The bound value, without producing a read event.
    pub fn peek(&self) -> &Value {
        &self.value
    }
}

impl Readable for Binding {
    fn read_at(&self, frame: FrameContext) -> Result<Value, ReadError> {
        intercept(frame, &self.value)
    }
}

/// Read a [`Readable`] with full call-site context.
#[macro_export]
macro_rules! read {
    ($target:expr) => {{
        use $crate::host::Readable as _;
        ($target).read_at($crate::frame!())
    }};
}
