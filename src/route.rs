//! Route declarations.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware};

/// Argument names that are fields of the declaration itself and never
/// select a registry middleware, whatever is registered under them.
pub const RESERVED_FIELDS: [&str; 4] = ["url", "method", "middlewares", "handler"];

/// One route to compile.
///
/// Besides the URL, method, handler and route-local middlewares a
/// declaration carries named arguments. Each argument whose name matches a
/// middleware in the router's registry switches that middleware on for this
/// route and configures it with the argument's value; any other argument is
/// plain metadata and is ignored.
///
/// ```rust
/// use serde_json::json;
/// use waymark::{Method, RouteSpec};
/// use waymark::middleware::from_fn;
///
/// let route = RouteSpec::new("/admin/users")
///     .method(Method::Get)
///     .arg("needLogin", true)
///     .arg("rateLimit", json!({ "per_minute": 60 }))
///     .handler(from_fn(|ctx, _next| Box::pin(async move {
///         ctx.text("users");
///         Ok(())
///     })));
/// ```
#[derive(Clone)]
pub struct RouteSpec {
    pub(crate) url: String,
    pub(crate) method: Option<Method>,
    pub(crate) handler: Option<BoxedMiddleware>,
    pub(crate) middlewares: Vec<BoxedMiddleware>,
    pub(crate) args: IndexMap<String, Value>,
}

impl RouteSpec {
    /// A route answering every allowed method on `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            handler: None,
            middlewares: Vec::new(),
            args: IndexMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self { Self::new(url).method(Method::Get) }
    pub fn post(url: impl Into<String>) -> Self { Self::new(url).method(Method::Post) }
    pub fn put(url: impl Into<String>) -> Self { Self::new(url).method(Method::Put) }
    pub fn patch(url: impl Into<String>) -> Self { Self::new(url).method(Method::Patch) }
    pub fn delete(url: impl Into<String>) -> Self { Self::new(url).method(Method::Delete) }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// The terminal step. Runs behind the router's error boundary.
    pub fn handler(mut self, handler: impl Middleware) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Appends a route-local middleware. Route-local middlewares run after
    /// every registry middleware, in the order they were added.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Sets a named argument. Setting a name twice replaces the value but
    /// keeps the position of the first declaration.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Sets many named arguments at once, in iteration order.
    pub fn args<I, K>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.args.extend(args.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn url(&self) -> &str { &self.url }
    pub fn declared_method(&self) -> Option<Method> { self.method }

    pub fn get_arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Argument names in declaration order.
    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.args.keys().map(String::as_str)
    }
}
