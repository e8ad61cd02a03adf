//! Request context pooling.
//!
//! # Responsibilities
//! - Hand out reset `RequestContext`s, reusing released ones when available
//! - Reset and take back contexts when a request finishes
//!
//! # Design Decisions
//! - Bounded lock-free queue; acquire/release pairs never wait on each other
//! - Contexts are reset on release, so the queue only ever holds clean ones
//! - Release happens in the guard's `Drop`, which also runs while unwinding
//! - A full queue simply drops the returned context

use std::ops::{Deref, DerefMut};

use axum::body::Bytes;
use axum::http::Request;
use crossbeam_queue::ArrayQueue;

use crate::http::context::RequestContext;
use crate::observability::metrics;

/// A pool of reusable request contexts.
#[derive(Debug)]
pub struct ContextPool {
    free: ArrayQueue<Box<RequestContext>>,
}

impl ContextPool {
    /// Create a pool retaining at most `capacity` idle contexts.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Take a context bound to `request`.
    pub fn acquire(&self, request: Request<Bytes>) -> PooledContext<'_> {
        let mut ctx = match self.free.pop() {
            Some(ctx) => {
                metrics::record_context_acquire(true);
                ctx
            }
            None => {
                metrics::record_context_acquire(false);
                Box::default()
            }
        };
        ctx.bind(request);

        PooledContext {
            ctx: Some(ctx),
            pool: self,
        }
    }

    /// Reset `ctx` and keep it for a later request.
    pub fn release(&self, mut ctx: Box<RequestContext>) {
        ctx.reset();
        if self.free.push(ctx).is_err() {
            tracing::trace!(capacity = self.free.capacity(), "Context pool full, dropping context");
        }
    }

    /// Number of idle contexts ready for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// A RAII guard that returns its context to the pool on drop.
#[derive(Debug)]
pub struct PooledContext<'p> {
    ctx: Option<Box<RequestContext>>,
    pool: &'p ContextPool,
}

impl Deref for PooledContext<'_> {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the context out.
        self.ctx.as_deref().unwrap_or_else(|| unreachable!("context used after release"))
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx.as_deref_mut().unwrap_or_else(|| unreachable!("context used after release"))
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}
