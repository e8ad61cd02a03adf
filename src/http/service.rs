//! Tower adapter for the synchronous dispatch entrypoint.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::Service;

use crate::http::response;
use crate::http::router::Router;

/// Buffers the request body, then hands the request to [`Router::serve`].
///
/// Bodies over `DispatchConfig::max_body_bytes` are answered with 413
/// without reaching the router.
#[derive(Debug, Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move {
            let limit = router.config().max_body_bytes;
            let (parts, body) = request.into_parts();

            let bytes: Bytes = match axum::body::to_bytes(body, limit).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    // Past the limit or a broken connection; only the former can still read the reply.
                    tracing::debug!(error = %err, limit, path = %parts.uri.path(), "Rejected request body");
                    return Ok(response::payload_too_large());
                }
            };

            Ok(router.serve(Request::from_parts(parts, bytes)))
        })
    }
}
