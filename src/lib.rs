//! Radix-tree HTTP request dispatch.
//!
//! Routes are registered on a [`Router`] during a mutable build phase, frozen
//! into per-method radix trees on the first request, then matched lock-free
//! by any number of concurrent requests. Each request runs through the global
//! middleware chain against a pooled [`RequestContext`].
//!
//! ```no_run
//! use axum::http::StatusCode;
//! use waymark::Router;
//!
//! let router = Router::new();
//! router
//!     .get("/users/:id", |ctx| {
//!         let id = ctx.param("id").unwrap_or_default().to_string();
//!         ctx.text(StatusCode::OK, id);
//!         Ok(())
//!     })
//!     .unwrap();
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::{handler, BoxError, Handler, HttpServer, Middleware, RequestContext, Router};
pub use lifecycle::Shutdown;
pub use routing::{Params, RouteError, RouteInfo, RouteMeta, TrailingSlash};
