//! Call-site context attached to every read.

use std::fmt;
use std::panic::Location;

use crate::value::Value;

/// Dynamic call site of a read: source file, line, column and, when
/// known, the enclosing function.
///
/// Diagnostic only. Dispatch never looks at it except through predicate
/// matchers that choose to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameContext {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
    pub function: Option<&'static str>,
}

impl FrameContext {
    pub fn new(file: &'static str, line: u32, column: u32) -> Self {
        Self {
            file,
            line,
            column,
            function: None,
        }
    }

    /// Context of the caller of the surrounding `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }

    pub fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }
}

impl fmt::Display for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file,
            self.line,
            self.function.unwrap_or("?")
        )
    }
}

/// A single read of a tracked value, as seen by the interceptor.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub frame: FrameContext,
    pub subject: Value,
}

impl AccessEvent {
    pub fn new(frame: FrameContext, subject: Value) -> Self {
        Self { frame, subject }
    }
}

/// Capture a [`FrameContext`] for the current source position, including
/// the path of the enclosing function.
///
/// # Examples
/// ```
/// fn load() -> rwatch::FrameContext {
///     rwatch::frame!()
/// }
/// assert!(load().function.unwrap().ends_with("load"));
/// ```
#[macro_export]
macro_rules! frame {
    () => {{
        fn __rwatch_here() {}
        fn __rwatch_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __rwatch_name_of(__rwatch_here);
        let name = name.strip_suffix("::__rwatch_here").unwrap_or(name);
        $crate::FrameContext::new(file!(), line!(), column!()).with_function(name)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enclosing() -> FrameContext {
        crate::frame!()
    }

    #[test]
    fn test_frame_macro_captures_function() {
        let frame = enclosing();
        assert!(frame.file.ends_with("frame.rs"));
        assert!(frame.function.unwrap().ends_with("tests::enclosing"));
    }

    #[test]
    fn test_caller_has_no_function() {
        let frame = FrameContext::caller();
        assert!(frame.function.is_none());
        assert!(frame.to_string().ends_with(":?"));
    }

    #[test]
    fn test_display_format() {
        let frame = FrameContext::new("src/demo.rs", 12, 5).with_function("demo::f");
        assert_eq!(frame.to_string(), "src/demo.rs:12:demo::f");
    }
}
