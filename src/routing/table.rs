//! Per-method route tables.
//!
//! # Responsibilities
//! - Own one radix tree per HTTP method
//! - Register routes during the build phase, reporting conflicts
//! - Convert into an immutable, lookup-only table at compile time
//!
//! # Design Decisions
//! - `RouteTable` is consumed by `compile`, so a compiled table cannot be
//!   written to by construction
//! - Registration order is kept for introspection; it never affects priority
//! - Terminal payloads are mapped during compile (the dispatch layer stores
//!   the middleware-wrapped handler there)

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::error::RouteError;
use crate::routing::matcher::{self, Params, TrailingSlash};
use crate::routing::metadata::{RouteInfo, RouteMeta};
use crate::routing::node::{Node, SlotTaken};
use crate::routing::path::decode_path;
use crate::routing::pattern::parse_pattern;

/// An immutable registered route.
#[derive(Debug)]
pub struct Route<H> {
    method: Method,
    pattern: String,
    handler: H,
    meta: RouteMeta,
}

impl<H> Route<H> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            method: self.method.clone(),
            pattern: self.pattern.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// Build-phase table: insert-only.
#[derive(Debug)]
pub struct RouteTable<H> {
    trees: HashMap<Method, Node<Arc<Route<H>>>>,
    routes: Vec<Arc<Route<H>>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            routes: Vec::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// On error the table is unchanged.
    pub fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
        meta: RouteMeta,
    ) -> Result<Arc<Route<H>>, RouteError> {
        let segments = parse_pattern(pattern)?;

        let route = Arc::new(Route {
            method: method.clone(),
            pattern: pattern.to_string(),
            handler,
            meta,
        });

        self.trees
            .entry(method.clone())
            .or_default()
            .insert(&segments, Arc::clone(&route))
            .map_err(|SlotTaken| RouteError::Conflict {
                method,
                pattern: pattern.to_string(),
            })?;

        self.routes.push(Arc::clone(&route));
        Ok(route)
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the table, turning each route into the payload built by `endpoint`.
    pub fn compile<U>(
        self,
        trailing_slash: TrailingSlash,
        mut endpoint: impl FnMut(&Arc<Route<H>>) -> U,
    ) -> CompiledTable<H, U> {
        let trees = self
            .trees
            .into_iter()
            .map(|(method, tree)| {
                let tree = tree.compile(&mut |route: Arc<Route<H>>| endpoint(&route));
                (method, tree)
            })
            .collect();

        CompiledTable {
            trees,
            routes: self.routes,
            trailing_slash,
        }
    }
}

/// Serving-phase table: lookup-only, shareable across threads.
#[derive(Debug)]
pub struct CompiledTable<H, U> {
    trees: HashMap<Method, Node<U>>,
    routes: Vec<Arc<Route<H>>>,
    trailing_slash: TrailingSlash,
}

impl<H, U> CompiledTable<H, U> {
    /// Resolve `method` and the raw request `path`, appending captures to `params`.
    pub fn find(&self, method: &Method, path: &str, params: &mut Params) -> Option<&U> {
        let tree = self.trees.get(method)?;
        matcher::find(tree, &decode_path(path), self.trailing_slash, params)
    }

    /// Resolve with a fresh capture list.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<(&U, Params)> {
        let mut params = Params::new();
        let found = self.find(method, path, &mut params)?;
        Some((found, params))
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of methods with at least one route.
    pub fn method_count(&self) -> usize {
        self.trees.len()
    }
}
