//! Route pattern parsing.
//!
//! # Grammar
//! ```text
//! pattern  = ["/"] segment *("/" segment) ["/"]
//! segment  = static | ":" name | "*" name      ; "*" only as the last segment
//! ```
//!
//! There is no escape mechanism: a segment starting with `:` or `*` is always
//! a parameter or wildcard.

use crate::routing::error::RouteError;

pub(crate) const PARAM_SIGIL: char = ':';
pub(crate) const WILDCARD_SIGIL: char = '*';

/// One parsed segment of a route pattern, borrowing from the pattern text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Matched by exact text.
    Static(&'a str),
    /// Binds exactly one non-empty path segment.
    Param(&'a str),
    /// Binds the rest of the path, `/` included.
    Wildcard(&'a str),
}

/// Split a pattern into segments, validating the grammar.
///
/// The root pattern (`/` or the empty string) yields no segments.
pub fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let trimmed = pattern.strip_prefix('/').unwrap_or(pattern);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    let mut names: Vec<&str> = Vec::new();

    for raw in trimmed.split('/') {
        if matches!(segments.last(), Some(Segment::Wildcard(_))) {
            return Err(RouteError::invalid(pattern, "wildcard must be the final segment"));
        }

        let segment = if let Some(name) = raw.strip_prefix(PARAM_SIGIL) {
            Segment::Param(name)
        } else if let Some(name) = raw.strip_prefix(WILDCARD_SIGIL) {
            Segment::Wildcard(name)
        } else if raw.is_empty() {
            return Err(RouteError::invalid(pattern, "empty path segment"));
        } else {
            Segment::Static(raw)
        };

        if let Segment::Param(name) | Segment::Wildcard(name) = segment {
            if name.is_empty() {
                return Err(RouteError::invalid(pattern, "parameter name is empty"));
            }
            if names.contains(&name) {
                return Err(RouteError::invalid(pattern, "parameter name bound twice"));
            }
            names.push(name);
        }

        segments.push(segment);
    }

    Ok(segments)
}
