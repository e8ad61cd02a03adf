//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (build phase):
//!     (method, pattern, handler)
//!     → pattern.rs (parse & validate segments)
//!     → node.rs (insert into the method's radix tree, split edges)
//!     → table.rs (per-method trees + registration log)
//!
//! Compile (once):
//!     RouteTable → sort children by priority → CompiledTable
//!
//! Lookup (serve phase):
//!     (method, path) → path.rs (decode, keeping %2F) → matcher.rs (walk, bind
//!     decoded params, backtrack) → payload or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime, no lock on lookup
//! - No regex: static text, `:param` and `*wildcard` segments only
//! - Priority is structural (static > param > wildcard), not registration order
//! - Explicit `None` for a miss rather than a silent default

pub mod error;
pub mod matcher;
pub mod metadata;
pub mod node;
pub mod path;
pub mod pattern;
pub mod table;

pub use error::RouteError;
pub use matcher::{Params, TrailingSlash};
pub use metadata::{RouteInfo, RouteMeta};
pub use table::{CompiledTable, Route, RouteTable};
