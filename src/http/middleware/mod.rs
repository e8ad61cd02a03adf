//! Built-in middleware.
//!
//! Each constructor returns a [`Middleware`](crate::http::Middleware) ready for
//! `Router::use_middleware`. Registration order is nesting order, so recovery
//! usually goes first and the logger right after it.

pub mod cors;
pub mod logger;
pub mod recovery;
pub mod request_id;

pub use cors::{cors, CorsConfig};
pub use logger::logger;
pub use recovery::recovery;
pub use request_id::{request_id, RequestId, RequestIdExt, REQUEST_ID_KEY, X_REQUEST_ID};
