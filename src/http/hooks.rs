//! Router-level lifecycle hooks.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Request, StatusCode};

use crate::http::context::RequestContext;
use crate::http::handler::BoxError;
use crate::http::response::default_error_handler;

/// Runs before the handler chain; an error skips the chain and goes to the error handler.
pub type RequestHook = Arc<dyn Fn(&Request<Bytes>) -> Result<(), BoxError> + Send + Sync>;

/// Runs after the response is final, with its status.
pub type ResponseHook = Arc<dyn Fn(&Request<Bytes>, StatusCode) + Send + Sync>;

/// Turns a handler or hook error into a response.
pub type ErrorHandler = Arc<dyn Fn(&mut RequestContext, &BoxError) + Send + Sync>;

/// Hooks registered on a router, run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) before_request: Vec<RequestHook>,
    pub(crate) after_response: Vec<ResponseHook>,
    pub(crate) error_handler: Option<ErrorHandler>,
}

impl Hooks {
    pub(crate) fn run_before(&self, request: &Request<Bytes>) -> Result<(), BoxError> {
        self.before_request.iter().try_for_each(|hook| hook(request))
    }

    pub(crate) fn run_after(&self, request: &Request<Bytes>, status: StatusCode) {
        for hook in &self.after_response {
            hook(request, status);
        }
    }

    pub(crate) fn handle_error(&self, ctx: &mut RequestContext, err: &BoxError) {
        match &self.error_handler {
            Some(handler) => handler(ctx, err),
            None => default_error_handler(ctx, err),
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("before_request", &self.before_request.len())
            .field("after_response", &self.after_response.len())
            .field("custom_error_handler", &self.error_handler.is_some())
            .finish()
    }
}
