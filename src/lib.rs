//! Read watchpoints.
//!
//! Register handlers that run synchronously whenever a tracked value is
//! read, and let them pass the read through, replace the observed value, or
//! abort the read.

pub mod config;
pub mod host;
pub mod logging;
pub mod types;
pub mod value;
pub mod watcher;

pub use config::{LoggingConfig, Settings, WatchConfig};
pub use host::{Binding, InstallGuard, Readable, current_interceptor, install_interceptor, intercept};
pub use types::{ValueId, WatchToken};
pub use value::{Payload, Value, WeakValue};
pub use watcher::handlers;
pub use watcher::{
    AccessDenied, AccessEvent, AccessInterceptor, BoxError, FrameContext, HandlerOutcome,
    Matcher, MatcherInfo, ReadError, WatchError, WatchHandler, WatchInfo, WatchMatch,
    WatchRegistry, WatchSnapshot, from_fn,
};

// Used by the exported logging macros.
#[doc(hidden)]
pub use tracing;
