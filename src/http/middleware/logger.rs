//! Request logging.

use std::time::Instant;

use crate::http::handler::{handler, Handler, Middleware};
use crate::http::middleware::request_id::RequestIdExt;

/// Log method, path, status and latency of every request it wraps.
///
/// The status is the one written by the chain below; a returned error is
/// logged as such, before the error handler turns it into a response.
pub fn logger() -> impl Middleware {
    |next: Handler| -> Handler {
        handler(move |ctx| {
            let start = Instant::now();
            let result = next(ctx);
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            let request_id = ctx.request_id().map(|id| id.as_str().to_owned());

            match &result {
                Ok(()) => tracing::info!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    status = ctx.status().as_u16(),
                    elapsed_ms,
                    request_id = request_id.as_deref(),
                    "Request handled"
                ),
                Err(err) => tracing::info!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    error = %err,
                    elapsed_ms,
                    request_id = request_id.as_deref(),
                    "Request failed"
                ),
            }
            result
        })
    }
}
