//! Prefix route groups.

use axum::http::Method;

use crate::http::context::RequestContext;
use crate::http::handler::BoxError;
use crate::http::router::{method_shorthands, Router};
use crate::routing::{RouteError, RouteMeta};

/// Registers routes on a [`Router`] under a shared path prefix.
///
/// Groups only rewrite patterns; middleware stays router-wide.
#[derive(Debug, Clone)]
pub struct Group<'r> {
    router: &'r Router,
    prefix: String,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r Router, prefix: &str) -> Self {
        Self {
            router,
            prefix: normalize_prefix(prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A nested group whose prefix extends this one.
    pub fn group(&self, prefix: &str) -> Group<'r> {
        Group::new(self.router, &self.join(prefix))
    }

    pub fn register<F>(&self, method: Method, pattern: &str, f: F) -> Result<(), RouteError>
    where
        F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.router.register(method, &self.join(pattern), f)
    }

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
        self.router.register_with(method, &self.join(pattern), f, meta)
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

    fn join(&self, pattern: &str) -> String {
        let pattern = pattern.trim_start_matches('/');
        format!("{}/{}", self.prefix, pattern)
    }
}

/// `api/v1/` → `/api/v1`; `/` and `` → ``.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
