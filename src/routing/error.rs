//! Build-time routing errors.

use axum::http::Method;
use thiserror::Error;

/// Errors returned while registering routes.
///
/// All of these are reported synchronously to the caller of the registration
/// method and leave the route table exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern needs a terminal or wildcard slot that is already taken.
    #[error("conflicting route: {method} {pattern}")]
    Conflict { method: Method, pattern: String },

    /// The router has already switched to serving; the table is frozen.
    #[error("router already compiled, cannot register {0}")]
    AlreadyCompiled(&'static str),

    /// The pattern does not follow the segment grammar.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
}

impl RouteError {
    pub(crate) fn invalid(pattern: &str, reason: &'static str) -> Self {
        RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        }
    }
}
