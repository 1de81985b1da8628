//! Unified error type.

use std::fmt;

/// The error type returned by vireo's fallible operations.
///
/// Request-time outcomes (404, 405, 401) are not errors — they are served
/// through the router's fallback handlers. This type surfaces the two ways
/// things actually go wrong: a route template that cannot be compiled, and
/// infrastructure failures while binding or accepting connections.
#[derive(Debug)]
pub enum Error {
    /// A path template declares a parameter with an empty name directly in
    /// front of a custom expression, e.g. `/files/:(`.
    ///
    /// A router holding a mis-registered route is not safe to serve from, so
    /// the registration helpers on [`Router`](crate::Router) treat this as a
    /// fatal misconfiguration and panic.
    MalformedParam { path: String },
    /// A `:name(expr)` sub-expression is not a valid regular expression.
    /// Same policy as [`Error::MalformedParam`]: fatal at registration.
    InvalidExpr { path: String, source: regex::Error },
    /// Binding the listener or accepting a connection failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedParam { path } => write!(f, "incorrect params: {path}"),
            Self::InvalidExpr { path, source } => {
                write!(f, "invalid sub-expression in `{path}`: {source}")
            }
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedParam { .. } => None,
            Self::InvalidExpr { source, .. } => Some(source),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
