//! Fixed responses produced by the dispatch layer itself.
//!
//! # Responsibilities
//! - Not-found response for routing misses
//! - Default error response for handler errors
//! - Transport-level rejections (oversized bodies)
//!
//! # Design Decisions
//! - Bodies are plain text and fixed, so clients can rely on them
//! - The default error body is the handler error's message, nothing more

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

use crate::http::context::RequestContext;
use crate::http::handler::BoxError;

/// Body of every 404 produced by a routing miss.
pub const NOT_FOUND_BODY: &str = "404 page not found";

fn plain(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// The response for a path no route matches.
pub fn not_found() -> Response<Body> {
    plain(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// The response for a request body over the configured limit.
pub fn payload_too_large() -> Response<Body> {
    plain(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
}

/// Error handler used when none is configured: 500 with the error message.
pub fn default_error_handler(ctx: &mut RequestContext, err: &BoxError) {
    ctx.text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
}
