//! Cross-origin resource sharing.

use axum::http::{header, HeaderValue, Method, StatusCode};

use crate::http::context::RequestContext;
use crate::http::handler::{handler, Handler, Middleware};

/// CORS policy.
///
/// The default allows any origin with the common methods and headers.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<Method>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds; `0` omits the header.
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ],
            allow_headers: ["Origin", "Content-Type", "Accept", "Authorization"]
                .map(String::from)
                .to_vec(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age: 0,
        }
    }
}

/// Header values computed once from a [`CorsConfig`].
struct CorsHeaders {
    any_origin: bool,
    origins: Vec<String>,
    methods: Option<HeaderValue>,
    headers: Option<HeaderValue>,
    expose: Option<HeaderValue>,
    credentials: bool,
    max_age: Option<HeaderValue>,
}

impl CorsHeaders {
    fn new(config: CorsConfig) -> Self {
        let methods: Vec<&str> = config.allow_methods.iter().map(Method::as_str).collect();
        Self {
            any_origin: config.allow_origins.iter().any(|origin| origin == "*"),
            methods: joined(&methods),
            headers: joined(&config.allow_headers),
            expose: joined(&config.expose_headers),
            credentials: config.allow_credentials,
            max_age: (config.max_age > 0).then(|| HeaderValue::from(config.max_age)),
            origins: config.allow_origins,
        }
    }

    fn apply(&self, ctx: &mut RequestContext) {
        let origin = if self.any_origin {
            Some(HeaderValue::from_static("*"))
        } else {
            ctx.headers()
                .get(header::ORIGIN)
                .filter(|origin| self.origins.iter().any(|allowed| allowed.as_bytes() == origin.as_bytes()))
                .cloned()
        };

        let headers = ctx.response_headers_mut();
        if let Some(origin) = origin {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        if let Some(methods) = &self.methods {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }
        if let Some(allow) = &self.headers {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, allow.clone());
        }
        if let Some(expose) = &self.expose {
            headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
        }
        if self.credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        if let Some(max_age) = &self.max_age {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age.clone());
        }
    }
}

/// `None` for an empty list or one that is not a valid header value.
fn joined<S: AsRef<str>>(items: &[S]) -> Option<HeaderValue> {
    if items.is_empty() {
        return None;
    }
    let value = items
        .iter()
        .map(|item| -> &str { item.as_ref() })
        .collect::<Vec<_>>()
        .join(", ");
    match HeaderValue::from_str(&value) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(value = %value, "Ignoring invalid CORS header value");
            None
        }
    }
}

/// Add CORS headers to every response and answer `OPTIONS` with 204.
///
/// Preflight requests only reach this middleware when an `OPTIONS` route
/// matches their path.
pub fn cors(config: CorsConfig) -> impl Middleware {
    let policy = std::sync::Arc::new(CorsHeaders::new(config));
    move |next: Handler| -> Handler {
        let policy = std::sync::Arc::clone(&policy);
        handler(move |ctx| {
            policy.apply(ctx);
            if ctx.method() == Method::OPTIONS {
                ctx.set_status(StatusCode::NO_CONTENT);
                return Ok(());
            }
            next(ctx)
        })
    }
}
