//! Panic recovery.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::http::StatusCode;

use crate::http::handler::{handler, Handler, Middleware};

/// Turn a panic anywhere below into a 500 JSON response.
///
/// Body: `{"error":"Internal Server Error","message":<panic message>}`.
pub fn recovery() -> impl Middleware {
    |next: Handler| -> Handler {
        handler(move |ctx| match panic::catch_unwind(AssertUnwindSafe(|| next(ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    panic = %message,
                    "Handler panicked"
                );
                ctx.json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({
                        "error": "Internal Server Error",
                        "message": message,
                    }),
                )
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
