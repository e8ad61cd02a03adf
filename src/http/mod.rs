//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum serve loop, TraceLayer)
//!     → service.rs (buffer body, enforce size limit)
//!     → router.rs (compile once, match, run pipeline)
//!         → pool.rs (pooled RequestContext)
//!         → hooks.rs (before / after / error)
//!         → handler.rs (middleware chain around the route handler)
//!     → response.rs (fixed 404 / 413 / default 500)
//!     → Send to client
//! ```

pub mod context;
pub mod group;
pub mod handler;
pub mod hooks;
pub mod middleware;
pub mod pool;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use context::RequestContext;
pub use group::Group;
pub use handler::{handler, BoxError, Handler, Middleware};
pub use hooks::{ErrorHandler, RequestHook, ResponseHook};
pub use pool::{ContextPool, PooledContext};
pub use router::{RouteMatch, Router};
pub use server::HttpServer;
pub use service::RouterService;
