//! The dispatch router.
//!
//! # Responsibilities
//! - Collect routes, middleware and hooks during the build phase
//! - Freeze everything into an immutable serving table exactly once
//! - Run one request through hooks, middleware and handler against a pooled context
//!
//! # Design Decisions
//! - Build state sits behind a `Mutex`, serving state in a `OnceLock`; after
//!   the switch a lookup never takes a lock
//! - The first `serve` compiles implicitly; concurrent first callers block
//!   until the single compile finishes
//! - Middleware is composed around each handler once, at compile time
//! - Hooks run only for requests that matched a route
//!
//! # Data Flow
//! ```text
//! serve(request)
//!     → pool.acquire (context bound to request)
//!     → CompiledTable::find (params written into the context)
//!         miss → 404
//!     → before hooks → middleware chain → handler
//!         Err → error handler
//!     → after hooks → take response
//!     → guard drop (context back to pool)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response, StatusCode};

use crate::config::DispatchConfig;
use crate::http::context::RequestContext;
use crate::http::group::Group;
use crate::http::handler::{compose, handler, BoxError, Handler, Middleware};
use crate::http::hooks::Hooks;
use crate::http::pool::ContextPool;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{CompiledTable, Params, Route, RouteError, RouteInfo, RouteMeta, RouteTable};

/// Expands to the per-method registration shorthands.
macro_rules! method_shorthands {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Register a `", stringify!($method), "` route.")]
            pub fn $name<F>(&self, pattern: &str, f: F) -> Result<(), RouteError>
            where
                F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
            {
                self.register(Method::$method, pattern, f)
            }
        )*
    };
}
pub(crate) use method_shorthands;

/// A matched route and its captured parameters.
pub struct RouteMatch<'r> {
    pub route: &'r Route<Handler>,
    pub params: Params,
}

impl std::fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("method", self.route.method())
            .field("pattern", &self.route.pattern())
            .field("params", &self.params)
            .finish()
    }
}

/// What a terminal node resolves to while serving.
struct Endpoint {
    route: Arc<Route<Handler>>,
    chain: Handler,
}

#[derive(Default)]
struct Builder {
    table: RouteTable<Handler>,
    middleware: Vec<Arc<dyn Middleware>>,
    hooks: Hooks,
}

struct Serving {
    table: CompiledTable<Handler, Endpoint>,
    hooks: Hooks,
}

/// Maps (method, path) to handlers and runs them.
///
/// Register everything first, then serve. The first call to [`Router::serve`]
/// (or an explicit [`Router::compile`]) freezes the router; after that every
/// registration method returns [`RouteError::AlreadyCompiled`].
pub struct Router {
    building: Mutex<Option<Builder>>,
    serving: OnceLock<Serving>,
    pool: ContextPool,
    config: DispatchConfig,
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            building: Mutex::new(Some(Builder::default())),
            serving: OnceLock::new(),
            pool: ContextPool::new(config.pool_capacity),
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    pub fn is_compiled(&self) -> bool {
        self.serving.get().is_some()
    }

    // --- Build phase ---

    /// Register a handler for `method` and `pattern`.
    pub fn register<F>(&self, method: Method, pattern: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register_with(method, pattern, f, RouteMeta::default())
    }

    /// Register a handler together with descriptive metadata.
    pub fn register_with<F>(
        &self,
        method: Method,
        pattern: &str,
        f: F,
        meta: RouteMeta,
    ) -> Result<(), RouteError>
    where
        F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.with_builder("route", |builder| {
            builder.table.insert(method, pattern, handler(f), meta)?;
            Ok(())
        })
    }

    method_shorthands! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        options => OPTIONS,
        head => HEAD,
    }

    /// Routes registered through the returned group share `prefix`.
    pub fn group(&self, prefix: &str) -> Group<'_> {
        Group::new(self, prefix)
    }

    /// Append a global middleware. The first one added is the outermost.
    pub fn use_middleware(&self, middleware: impl Middleware + 'static) -> Result<(), RouteError> {
        self.with_builder("middleware", |builder| {
            builder.middleware.push(Arc::new(middleware));
            Ok(())
        })
    }

    /// Run `hook` before the handler chain of every matched request.
    pub fn before_request<F>(&self, hook: F) -> Result<(), RouteError>
    where
        F: Fn(&Request<Bytes>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.with_builder("hook", |builder| {
            builder.hooks.before_request.push(Arc::new(hook));
            Ok(())
        })
    }

    /// Run `hook` once the response of a matched request is final.
    pub fn after_response<F>(&self, hook: F) -> Result<(), RouteError>
    where
        F: Fn(&Request<Bytes>, StatusCode) + Send + Sync + 'static,
    {
        self.with_builder("hook", |builder| {
            builder.hooks.after_response.push(Arc::new(hook));
            Ok(())
        })
    }

    /// Replace the default error handler (500 with the error message).
    pub fn set_error_handler<F>(&self, f: F) -> Result<(), RouteError>
    where
        F: Fn(&mut RequestContext, &BoxError) + Send + Sync + 'static,
    {
        self.with_builder("error handler", |builder| {
            builder.hooks.error_handler = Some(Arc::new(f));
            Ok(())
        })
    }

    fn lock_builder(&self) -> MutexGuard<'_, Option<Builder>> {
        self.building.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_builder(
        &self,
        what: &'static str,
        f: impl FnOnce(&mut Builder) -> Result<(), RouteError>,
    ) -> Result<(), RouteError> {
        match self.lock_builder().as_mut() {
            Some(builder) => f(builder),
            None => Err(RouteError::AlreadyCompiled(what)),
        }
    }

    // --- Compile ---

    /// Freeze the router. Later calls are no-ops.
    pub fn compile(&self) {
        self.compiled();
    }

    fn compiled(&self) -> &Serving {
        if let Some(serving) = self.serving.get() {
            return serving;
        }
        self.serving.get_or_init(|| {
            // Only this initializer takes the builder, so it is always present here.
            let builder = self.lock_builder().take().unwrap_or_default();
            self.freeze(builder)
        })
    }

    fn freeze(&self, builder: Builder) -> Serving {
        let Builder {
            table,
            middleware,
            hooks,
        } = builder;

        let table = table.compile(self.config.trailing_slash, |route| Endpoint {
            route: Arc::clone(route),
            chain: compose(&middleware, Arc::clone(route.handler())),
        });

        tracing::info!(
            routes = table.len(),
            methods = table.method_count(),
            middleware = middleware.len(),
            trailing_slash = ?self.config.trailing_slash,
            "Route table compiled"
        );

        Serving { table, hooks }
    }

    // --- Serve phase ---

    /// Resolve `method` and `path` without running anything.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (endpoint, params) = self.compiled().table.lookup(method, path)?;
        Some(RouteMatch {
            route: &endpoint.route,
            params,
        })
    }

    /// Dispatch one buffered request and produce its response.
    pub fn serve(&self, request: Request<Bytes>) -> Response<Body> {
        let serving = self.compiled();
        let start = Instant::now();

        let mut guard = self.pool.acquire(request);
        let ctx: &mut RequestContext = &mut guard;
        let method = ctx.request.method().clone();

        let found = serving
            .table
            .find(&method, ctx.request.uri().path(), &mut ctx.params);
        let Some(endpoint) = found else {
            tracing::debug!(method = %method, path = %ctx.path(), "No route matched");
            metrics::record_not_found(&method, start);
            return response::not_found();
        };

        let result = match serving.hooks.run_before(&ctx.request) {
            Ok(()) => (endpoint.chain)(ctx),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::warn!(
                method = %method,
                route = %endpoint.route.pattern(),
                error = %err,
                "Handler returned an error"
            );
            serving.hooks.handle_error(ctx, &err);
        }

        let status = ctx.status();
        serving.hooks.run_after(&ctx.request, status);
        metrics::record_request(&method, status, endpoint.route.pattern(), start);

        ctx.take_response()
    }

    // --- Introspection ---

    /// Every registered route, in registration order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        if let Some(serving) = self.serving.get() {
            return serving.table.routes().map(Route::info).collect();
        }
        let building = self.lock_builder();
        match building.as_ref() {
            Some(builder) => builder.table.routes().map(Route::info).collect(),
            None => {
                drop(building);
                self.compiled().table.routes().map(Route::info).collect()
            }
        }
    }

    /// The route registered with metadata name `name`.
    pub fn find_route(&self, name: &str) -> Option<RouteInfo> {
        self.routes()
            .into_iter()
            .find(|info| info.meta.name.as_deref() == Some(name))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("compiled", &self.is_compiled())
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(ctx: &mut RequestContext) -> Result<(), BoxError> {
        ctx.text(StatusCode::OK, "ok");
        Ok(())
    }

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_registration_rejected_after_compile() {
        let router = Router::new();
        router.get("/users", ok).unwrap();
        router.compile();

        assert_eq!(
            router.get("/posts", ok),
            Err(RouteError::AlreadyCompiled("route"))
        );
        assert_eq!(
            router.use_middleware(|next: Handler| next),
            Err(RouteError::AlreadyCompiled("middleware"))
        );
        assert_eq!(
            router.before_request(|_req| Ok(())),
            Err(RouteError::AlreadyCompiled("hook"))
        );
        assert!(router.match_route(&Method::GET, "/users").is_some());
        assert!(router.match_route(&Method::GET, "/posts").is_none());
    }

    #[test]
    fn test_compile_is_idempotent() {
        let router = Router::new();
        router.get("/a", ok).unwrap();
        router.compile();
        router.compile();
        assert!(router.is_compiled());
        assert_eq!(router.routes().len(), 1);
    }

    #[test]
    fn test_serve_compiles_implicitly() {
        let router = Router::new();
        router.get("/ping", ok).unwrap();
        assert!(!router.is_compiled());

        let response = router.serve(request(Method::GET, "/ping"));
        assert_eq!(response.status(), StatusCode::OK);
        assert!(router.is_compiled());
    }

    #[test]
    fn test_method_is_part_of_the_key() {
        let router = Router::new();
        router.get("/items", ok).unwrap();
        router.post("/items", ok).unwrap();

        assert!(router.match_route(&Method::POST, "/items").is_some());
        assert!(router.match_route(&Method::DELETE, "/items").is_none());
        let response = router.serve(request(Method::DELETE, "/items"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_find_route_by_name_in_both_phases() {
        let router = Router::new();
        router
            .register_with(
                Method::GET,
                "/users/:id",
                ok,
                RouteMeta::new().name("user.show").version("v1"),
            )
            .unwrap();

        let before = router.find_route("user.show").unwrap();
        assert_eq!(before.pattern, "/users/:id");

        router.compile();
        let after = router.find_route("user.show").unwrap();
        assert_eq!(after.meta.version.as_deref(), Some("v1"));
        assert!(router.find_route("missing").is_none());
    }

    #[test]
    fn test_miss_releases_context() {
        let router = Router::new();
        router.get("/", ok).unwrap();
        router.serve(request(Method::GET, "/nothing/here"));
        assert_eq!(router.pool().available(), 1);
    }
}
