//! Handler and middleware contracts.

use std::sync::Arc;

use crate::http::context::RequestContext;

/// Error type returned by handlers, hooks and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request handler. `Ok(())` means the response in the context is final.
pub type Handler = Arc<dyn Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync>;

/// Wrap a closure or function as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps the next handler in the chain.
///
/// The returned handler may run code before and/or after calling `next`, or
/// never call it at all to short-circuit the chain.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: Handler) -> Handler;
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync,
{
    fn wrap(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// Wrap `endpoint` so that `middleware[0]` is the outermost layer.
pub(crate) fn compose(middleware: &[Arc<dyn Middleware>], endpoint: Handler) -> Handler {
    middleware
        .iter()
        .rev()
        .fold(endpoint, |next, layer| layer.wrap(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn tracer(log: Arc<Mutex<Vec<String>>>, name: &'static str) -> Arc<dyn Middleware> {
        Arc::new(move |next: Handler| -> Handler {
            let log = Arc::clone(&log);
            handler(move |ctx| {
                log.lock().unwrap().push(format!("{name}:before"));
                let result = next(ctx);
                log.lock().unwrap().push(format!("{name}:after"));
                result
            })
        })
    }

    #[test]
    fn test_first_registered_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_log = Arc::clone(&log);
        let endpoint = handler(move |_ctx| {
            inner_log.lock().unwrap().push("handler".into());
            Ok(())
        });

        let chain = compose(
            &[tracer(Arc::clone(&log), "a"), tracer(Arc::clone(&log), "b")],
            endpoint,
        );
        let mut ctx = RequestContext::default();
        chain(&mut ctx).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:before", "b:before", "handler", "b:after", "a:after"]
        );
    }

    #[test]
    fn test_no_middleware_is_identity() {
        let endpoint = handler(|ctx| {
            ctx.text(axum::http::StatusCode::OK, "plain");
            Ok(())
        });
        let chain = compose(&[], Arc::clone(&endpoint));
        assert!(Arc::ptr_eq(&chain, &endpoint));
    }
}
