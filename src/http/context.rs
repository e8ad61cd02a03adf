//! Per-request context.
//!
//! # Responsibilities
//! - Hold the buffered request, captured path parameters and the response
//!   being built for exactly one request
//! - Provide a string-keyed value bag for middleware to pass data along
//! - Reset completely before it is handed to the next request
//!
//! # Design Decisions
//! - Owned by the pool and lent to one request at a time; never shared
//! - Response written into the context, turned into a real response once
//!   the chain has returned
//! - Value bag is dynamically typed: `get::<T>` downcasts and yields `None`
//!   on a type mismatch, so applications should wrap typed accessors

use std::any::Any;
use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::handler::BoxError;
use crate::routing::Params;

/// The response under construction.
#[derive(Debug, Default)]
pub(crate) struct ResponseParts {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

impl ResponseParts {
    fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
    }
}

/// Everything one request's middleware chain and handler can see.
#[derive(Default)]
pub struct RequestContext {
    pub(crate) request: Request<Bytes>,
    pub(crate) params: Params,
    pub(crate) response: ResponseParts,
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", self.request.method())
            .field("path", &self.request.uri().path())
            .field("params", &self.params)
            .field("status", &self.response.status)
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RequestContext {
    pub(crate) fn bind(&mut self, request: Request<Bytes>) {
        self.request = request;
    }

    /// Clear every request-scoped field, dropping the request and any stored values.
    pub(crate) fn reset(&mut self) {
        self.request = Request::default();
        self.params.clear();
        self.response.reset();
        self.values.clear();
    }

    // --- Request side ---

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Percent-decoded value of the named path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First value of the named query parameter, percent-decoded.
    pub fn query(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Every value of the named query parameter, in order.
    pub fn query_all(&self, name: &str) -> Vec<String> {
        self.query_pairs()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    fn query_pairs(&self) -> url::form_urlencoded::Parse<'_> {
        let query = self.request.uri().query().unwrap_or("");
        url::form_urlencoded::parse(query.as_bytes())
    }

    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    /// Deserialize the JSON request body.
    ///
    /// A missing `Content-Type` is accepted; any other type than
    /// `application/json` is rejected.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, BoxError> {
        if let Some(content_type) = self.request.headers().get(header::CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            let essence = content_type.split(';').next().unwrap_or_default().trim();
            if !essence.eq_ignore_ascii_case("application/json") {
                return Err(format!("unsupported content type: {content_type}").into());
            }
        }
        serde_json::from_slice(self.request.body())
            .map_err(|e| format!("failed to decode JSON: {e}").into())
    }

    // --- Response side ---

    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers.insert(name, value);
    }

    /// Append raw bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.response.body.extend_from_slice(bytes);
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }

    /// Replace the response with a plain-text body.
    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.replace_body(status, "text/plain; charset=utf-8", body.as_ref().as_bytes());
    }

    /// Replace the response with an HTML body.
    pub fn html(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.replace_body(status, "text/html; charset=utf-8", body.as_ref().as_bytes());
    }

    /// Replace the response with `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), BoxError> {
        let encoded = serde_json::to_vec(value)?;
        self.replace_body(status, "application/json", &encoded);
        Ok(())
    }

    fn replace_body(&mut self, status: StatusCode, content_type: &'static str, body: &[u8]) {
        self.response.status = status;
        self.response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.response.body.clear();
        self.response.body.extend_from_slice(body);
    }

    /// Move the built response out, leaving an empty one behind.
    pub(crate) fn take_response(&mut self) -> Response<Body> {
        let status = std::mem::replace(&mut self.response.status, StatusCode::OK);
        let headers = std::mem::take(&mut self.response.headers);
        let body = std::mem::take(&mut self.response.body);

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }

    // --- Value bag ---

    /// Store a value for the rest of this request.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Box::new(value));
    }

    /// Borrow a stored value; `None` if absent or stored with another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Any + Send + Sync>> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[cfg(test)]
    pub(crate) fn values_len(&self) -> usize {
        self.values.len()
    }
}
