//! The router instance.
//!
//! A [`Router`] owns everything one set of routes needs: its options, its
//! middleware registry and declared order, its pre-match stage, and the
//! radix tree the compiled chains live in. Set it up through `&mut self`,
//! then hand [`Router::routes`] and [`Router::allowed_methods`] to an
//! [`App`](crate::App). Both snapshot the router; later changes to it do
//! not reach middlewares already handed out.

use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::StatusCode;

use crate::compiler::RouteCompiler;
use crate::config::RouterOptions;
use crate::context::{Context, RouteMatch};
use crate::error::{Error, HandlerResult, HttpError};
use crate::matcher::Matcher;
use crate::method::Method;
use crate::middleware::trace::RequestTrace;
use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};
use crate::registry::{Factory, MiddlewareRegistry};
use crate::route::RouteSpec;

/// The application router.
///
/// ```rust
/// use waymark::{Factory, Router, RouterOptions, RouteSpec};
/// use waymark::middleware::from_fn;
/// use http::StatusCode;
///
/// # fn main() -> Result<(), waymark::Error> {
/// let mut router = Router::new(RouterOptions::new().prefix("/api"));
///
/// router
///     .register([("needLogin", Factory::new(|_| from_fn(|ctx, next| Box::pin(async move {
///         if ctx.header("authorization").is_none() {
///             ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
///             return Ok(());
///         }
///         next.run(ctx).await
///     }))))])
///     .declare_order(["needLogin"]);
///
/// router.add_routes([
///     RouteSpec::get("/me").arg("needLogin", true).handler(from_fn(|ctx, _next| Box::pin(async move {
///         ctx.text("me");
///         Ok(())
///     }))),
/// ])?;
/// # Ok(())
/// # }
/// ```
pub struct Router {
    options: RouterOptions,
    registry: MiddlewareRegistry,
    pre: Vec<BoxedMiddleware>,
    matcher: Matcher,
}

impl Router {
    pub fn new(options: RouterOptions) -> Self {
        let mut pre: Vec<BoxedMiddleware> = Vec::new();
        if options.request_logging {
            pre.push(Arc::new(RequestTrace));
        }
        Self {
            matcher: Matcher::new(options.strict_trailing_slash),
            registry: MiddlewareRegistry::new(),
            pre,
            options,
        }
    }

    /// Registers named middleware factories, overwriting same-named ones.
    pub fn register<I, K>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Factory)>,
        K: Into<String>,
    {
        self.registry.register(entries);
        self
    }

    /// Declares the execution order of registry middlewares. Once any order
    /// is declared, a registry middleware missing from it never runs.
    pub fn declare_order<I, K>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.registry.declare_order(keys);
        self
    }

    /// Adds a middleware to the pre-match stage: it runs for every request
    /// the router sees, before route matching, in the order added.
    pub fn with(&mut self, middleware: impl Middleware) -> &mut Self {
        self.pre.push(Arc::new(middleware));
        self
    }

    /// Compiles `routes` against the current registry and registers them.
    ///
    /// The batch is all or nothing: if any route fails to compile or to
    /// register, none of them is added. Middlewares registered afterwards do
    /// not apply to these routes.
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = RouteSpec>) -> Result<&mut Self, Error> {
        let compiler = RouteCompiler::new(
            &self.registry,
            self.options.error_handler.as_ref(),
            &self.options.prefix,
            &self.options.allowed_methods,
        );
        let compiled = routes
            .into_iter()
            .map(|route| compiler.compile(route))
            .collect::<Result<Vec<_>, _>>()?;

        let mut matcher = self.matcher.clone();
        for route in compiled {
            matcher.register(route.methods, &route.pattern, route.chain)?;
        }
        self.matcher = matcher;
        Ok(self)
    }

    pub fn registry(&self) -> &MiddlewareRegistry { &self.registry }
    pub fn options(&self) -> &RouterOptions { &self.options }

    /// The matching middleware: runs the pre-match stage, then the chains of
    /// the matched route, then whatever follows in the host pipeline.
    pub fn routes(&self) -> Routes {
        let mut stack = self.pre.clone();
        stack.push(Arc::new(MatchRoute {
            matcher: self.matcher.clone(),
            allowed: self.options.allowed_methods.clone(),
        }));
        Routes { stack: stack.into() }
    }

    /// Answers what no route did: `OPTIONS` with the path's `Allow` list,
    /// `405` for a method the path lacks, `501` for one the router does not
    /// implement at all.
    pub fn allowed_methods(&self, options: AllowedMethodsOptions) -> AllowedMethods {
        AllowedMethods { implemented: self.options.allowed_methods.clone(), options }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new(RouterOptions::default()) }
}

/// Middleware returned by [`Router::routes`].
pub struct Routes {
    stack: Arc<[BoxedMiddleware]>,
}

impl Middleware for Routes {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Next::new(&self.stack).then(next).run(ctx)
    }
}

struct MatchRoute {
    matcher: Matcher,
    allowed: Vec<Method>,
}

impl Middleware for MatchRoute {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        let method = Method::from_http(ctx.method()).filter(|m| self.allowed.contains(m));
        let Some(found) = self.matcher.find(method, ctx.path()) else {
            return next.run(ctx);
        };
        ctx.set_route(RouteMatch::new(found.pattern, found.methods), found.params);
        let chain = found.chain;
        Box::pin(async move { Next::new(&chain).then(next).run(ctx).await })
    }
}

/// Options for [`Router::allowed_methods`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowedMethodsOptions {
    /// Return an [`HttpError`] (`405`/`501`) instead of writing the response.
    pub throw: bool,
}

/// Middleware returned by [`Router::allowed_methods`].
pub struct AllowedMethods {
    implemented: Vec<Method>,
    options: AllowedMethodsOptions,
}

impl AllowedMethods {
    fn apply(&self, ctx: &mut Context) -> HandlerResult {
        if ctx.response().status() != StatusCode::NOT_FOUND {
            return Ok(());
        }
        let allowed = ctx.matched().map(|m| m.methods().to_vec()).unwrap_or_default();
        let allow = allow_header(&allowed);

        let method = Method::from_http(ctx.method()).filter(|m| self.implemented.contains(m));
        let Some(method) = method else {
            if self.options.throw {
                return Err(HttpError::from_status(StatusCode::NOT_IMPLEMENTED).into());
            }
            ctx.response_mut().set_status(StatusCode::NOT_IMPLEMENTED);
            ctx.response_mut().set_header(ALLOW, allow);
            return Ok(());
        };

        if allowed.is_empty() {
            return Ok(());
        }
        if method == Method::Options {
            let res = ctx.response_mut();
            res.set_status(StatusCode::OK);
            res.text("");
            res.set_header(ALLOW, allow);
        } else if !allowed.contains(&method) {
            if self.options.throw {
                return Err(HttpError::from_status(StatusCode::METHOD_NOT_ALLOWED).into());
            }
            ctx.response_mut().set_status(StatusCode::METHOD_NOT_ALLOWED);
            ctx.response_mut().set_header(ALLOW, allow);
        }
        Ok(())
    }
}

impl Middleware for AllowedMethods {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            next.run(ctx).await?;
            self.apply(ctx)
        })
    }
}

fn allow_header(methods: &[Method]) -> HeaderValue {
    let joined = methods.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
    // method names are plain ASCII tokens
    HeaderValue::from_str(&joined).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::Value;

    use super::*;
    use crate::middleware::from_fn;

    fn text(body: &'static str) -> impl Middleware {
        from_fn(move |ctx, _next| {
            Box::pin(async move {
                ctx.text(body);
                Ok(())
            })
        })
    }

    async fn call(mw: &impl Middleware, method: &str, path: &str) -> Context {
        let req = http::Request::builder().method(method).uri(path).body(Bytes::new()).unwrap();
        let mut ctx = Context::from_request(req);
        mw.call(&mut ctx, Next::end()).await.unwrap();
        ctx
    }

    fn body(ctx: &Context) -> &[u8] {
        ctx.response().body().map(|b| &b[..]).unwrap_or_default()
    }

    #[tokio::test]
    async fn need_login_runs_before_handler() {
        let mut router = Router::default();
        router.register([(
            "needLogin",
            Factory::new(|required: &Value| {
                let required = required.as_bool().unwrap_or(false);
                from_fn(move |ctx, next| {
                    Box::pin(async move {
                        if required && ctx.header("authorization").is_none() {
                            ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
                            return Ok(());
                        }
                        next.run(ctx).await
                    })
                })
            }),
        )]);
        router.add_routes([RouteSpec::get("/x").arg("needLogin", true).handler(text("secret"))]).unwrap();
        let routes = router.routes();

        let ctx = call(&routes, "GET", "/x").await;
        assert_eq!(ctx.response().status(), StatusCode::UNAUTHORIZED);
        assert!(ctx.response().body().is_none());
    }

    #[tokio::test]
    async fn pre_stage_runs_before_matching() {
        let mut router = Router::new(RouterOptions::new().request_logging(true));
        router.with(from_fn(|ctx, next| {
            Box::pin(async move {
                ctx.extensions_mut().insert("pre-stage");
                next.run(ctx).await
            })
        }));
        router.add_routes([RouteSpec::get("/users/{id}").handler(from_fn(|ctx, _next| {
            Box::pin(async move {
                let seen = ctx.extensions().get::<&str>().copied().unwrap_or("none");
                let body = format!("{seen} {}", ctx.param("id").unwrap_or("?"));
                ctx.text(body);
                Ok(())
            })
        }))])
        .unwrap();

        let ctx = call(&router.routes(), "GET", "/users/7").await;
        assert_eq!(body(&ctx), b"pre-stage 7");
        assert_eq!(ctx.matched().map(RouteMatch::pattern), Some("/users/{id}"));
    }

    #[tokio::test]
    async fn unmatched_request_falls_through() {
        let mut router = Router::default();
        router.add_routes([RouteSpec::get("/a").handler(text("a"))]).unwrap();
        let routes = router.routes();

        let ctx = call(&routes, "GET", "/b").await;
        assert!(ctx.matched().is_none());
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn method_outside_allowed_list_never_matches() {
        let mut router = Router::new(RouterOptions::new().allowed_methods([Method::Get]));
        router.add_routes([RouteSpec::post("/submit").handler(text("posted"))]).unwrap();

        let ctx = call(&router.routes(), "POST", "/submit").await;
        assert!(ctx.response().body().is_none());
        assert_eq!(ctx.matched().map(|m| m.methods().to_vec()), Some(vec![Method::Post]));
    }

    #[tokio::test]
    async fn routes_snapshot_ignores_later_routes() {
        let mut router = Router::default();
        let before = router.routes();
        router.add_routes([RouteSpec::get("/late").handler(text("late"))]).unwrap();

        assert!(call(&before, "GET", "/late").await.matched().is_none());
        assert_eq!(body(&call(&router.routes(), "GET", "/late").await), b"late");
    }

    #[test]
    fn allow_header_joins_methods() {
        assert_eq!(allow_header(&[Method::Get, Method::Head]), "GET, HEAD");
        assert_eq!(allow_header(&[]), "");
    }
}
