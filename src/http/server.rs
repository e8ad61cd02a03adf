//! HTTP server setup.
//!
//! # Responsibilities
//! - Mount the dispatch service on an Axum router
//! - Wire up the transport-level tracing layer
//! - Serve a listener until the shutdown signal fires

use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::router::Router;
use crate::http::service::RouterService;
use crate::lifecycle::Shutdown;

/// Runs a [`Router`] over TCP.
#[derive(Debug, Clone)]
pub struct HttpServer {
    router: Arc<Router>,
}

impl HttpServer {
    /// Compiles `router` up front so the first request does not pay for it.
    pub fn new(router: Arc<Router>) -> Self {
        router.compile();
        Self { router }
    }

    fn build_app(&self) -> axum::Router {
        axum::Router::new()
            .fallback_service(RouterService::new(Arc::clone(&self.router)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.router.routes().len(), "HTTP server starting");

        let app = self.build_app();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.signalled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}
