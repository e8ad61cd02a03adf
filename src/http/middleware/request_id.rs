//! Request ID propagation.
//!
//! # Responsibilities
//! - Reuse an incoming `X-Request-ID` or generate a UUID v4
//! - Store it in the context for handlers and later middleware
//! - Echo it in the response headers
//!
//! # Design Decisions
//! - Stored under [`REQUEST_ID_KEY`] as a [`RequestId`] newtype, read back
//!   through [`RequestIdExt`] rather than raw downcasts

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::http::context::RequestContext;
use crate::http::handler::{handler, Handler, Middleware};

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Value-bag key the ID is stored under.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Correlation ID of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed access to the stored request ID.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for RequestContext {
    fn request_id(&self) -> Option<&RequestId> {
        self.get::<RequestId>(REQUEST_ID_KEY)
    }
}

/// Attach a request ID to every request it wraps.
pub fn request_id() -> impl Middleware {
    |next: Handler| -> Handler {
        handler(move |ctx| {
            let incoming = ctx
                .headers()
                .get(&X_REQUEST_ID)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(|value| RequestId(value.to_owned()));
            let id = incoming.unwrap_or_default();

            if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                ctx.insert_header(X_REQUEST_ID, value);
            }
            ctx.set(REQUEST_ID_KEY, id);

            next(ctx)
        })
    }
}
