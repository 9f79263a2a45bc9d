//! Read-watch registry and dispatch.
//!
//! # Architecture
//!
//! ```text
//! host read path (Binding::get, read!)
//!         |
//!   AccessInterceptor  -- snapshot() -->  WatchRegistry
//!         |                                 (ordered WatchEntries,
//!   first matching entry                     identity index)
//!         |
//!    WatchHandler -> PassThrough | Replace(value) | Abort(error)
//! ```

mod error;
mod frame;
mod handler;
pub mod handlers;
mod interceptor;
mod matcher;
mod registry;

pub use error::{AccessDenied, BoxError, ReadError, WatchError};
pub use frame::{AccessEvent, FrameContext};
pub use handler::{FnHandler, HandlerOutcome, WatchHandler, from_fn};
pub use interceptor::AccessInterceptor;
pub use matcher::{Matcher, MatcherInfo, Predicate, PredicateFn, SelectFn, Selector};
pub use registry::{
    SharedHandler, WatchEntry, WatchInfo, WatchMatch, WatchRegistry, WatchSnapshot,
};
