//! Per-request context.
//!
//! One [`Context`] is created per request and borrowed mutably by every step
//! of the chain in turn: the request half is read-only, the
//! [`Response`](crate::Response) half and the extensions are written in chain
//! order.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Extensions, HeaderMap, Uri};

use crate::method::Method;
use crate::response::Response;

/// The route pattern a request's path matched, and the methods registered on
/// it. Set by [`Routes`](crate::Routes) even when the request method itself
/// has no chain on that pattern.
#[derive(Clone, Debug)]
pub struct RouteMatch {
    pattern: String,
    methods: Vec<Method>,
}

impl RouteMatch {
    pub(crate) fn new(pattern: String, methods: Vec<Method>) -> Self {
        Self { pattern, methods }
    }

    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn methods(&self) -> &[Method] { &self.methods }
}

/// An incoming request together with the response being built for it.
pub struct Context {
    method: http::Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    matched: Option<RouteMatch>,
    extensions: Extensions,
    response: Response,
}

impl Context {
    /// Builds a context from a request whose body has already been collected.
    pub fn from_request(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            matched: None,
            extensions: parts.extensions,
            response: Response::default(),
        }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// The route whose pattern matched this request's path, if any.
    pub fn matched(&self) -> Option<&RouteMatch> { self.matched.as_ref() }

    /// Typed per-request state shared between the steps of a chain.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    pub fn response(&self) -> &Response { &self.response }
    pub fn response_mut(&mut self) -> &mut Response { &mut self.response }

    /// Shorthand for `ctx.response_mut().text(..)`.
    pub fn text(&mut self, body: impl Into<String>) {
        self.response.text(body);
    }

    /// Shorthand for `ctx.response_mut().json(..)`.
    pub fn json(&mut self, body: Vec<u8>) {
        self.response.json(body);
    }

    pub(crate) fn set_route(&mut self, matched: RouteMatch, params: HashMap<String, String>) {
        self.matched = Some(matched);
        self.params = params;
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_request_parts() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/users/7?expand=true")
            .header("X-Request-Id", "abc")
            .body(Bytes::from_static(b"{}"))
            .unwrap();
        let ctx = Context::from_request(req);

        assert_eq!(*ctx.method(), http::Method::POST);
        assert_eq!(ctx.path(), "/users/7");
        assert_eq!(ctx.query(), Some("expand=true"));
        assert_eq!(ctx.header("x-request-id"), Some("abc"));
        assert_eq!(ctx.body(), b"{}");
        assert!(ctx.matched().is_none());
        assert_eq!(ctx.param("id"), None);
    }

    #[test]
    fn route_match_sets_params() {
        let req = http::Request::get("/users/7").body(Bytes::new()).unwrap();
        let mut ctx = Context::from_request(req);
        let params = HashMap::from([("id".to_owned(), "7".to_owned())]);
        ctx.set_route(RouteMatch::new("/users/{id}".into(), vec![Method::Get]), params);

        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.matched().map(RouteMatch::pattern), Some("/users/{id}"));
    }
}
