//! The host pipeline.
//!
//! An [`App`] is the outermost chain every request runs through: typically a
//! router's [`Routes`](crate::Routes) followed by its
//! [`AllowedMethods`](crate::AllowedMethods), possibly with several routers
//! side by side. Whatever escapes the pipeline as an error is answered here:
//! an [`HttpError`] with its own status, anything else with `500`.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::error;

use crate::context::Context;
use crate::error::{BoxError, HandlerResult, HttpError};
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::response::Response;

/// The application: an ordered list of middlewares run for every request.
///
/// ```rust,no_run
/// use waymark::{App, Router, Server};
///
/// # async fn run() -> Result<(), waymark::Error> {
/// let router = Router::default();
/// let app = App::new()
///     .with(router.routes())
///     .with(router.allowed_methods(Default::default()));
///
/// Server::bind("0.0.0.0:3000")?.serve(app).await
/// # }
/// ```
#[derive(Clone, Default)]
pub struct App {
    stack: Vec<BoxedMiddleware>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Middlewares run in the order they were added.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.stack.push(Arc::new(middleware));
        self
    }

    /// Runs the pipeline over `ctx`, leaving the response on it.
    pub async fn handle(&self, ctx: &mut Context) -> HandlerResult {
        Next::new(&self.stack).run(ctx).await
    }

    /// Runs one request through the pipeline and renders the response.
    pub async fn respond(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let head = *req.method() == http::Method::HEAD;
        let mut ctx = Context::from_request(req);

        match self.handle(&mut ctx).await {
            Ok(()) => ctx.into_response().into_http(head),
            Err(err) => {
                error!(method = %ctx.method(), path = ctx.path(), error = %err, "unhandled error");
                error_response(err).into_http(head)
            }
        }
    }
}

/// A fresh response carrying only the error's status and message, so nothing
/// a failed chain half-wrote leaks to the client.
fn error_response(err: BoxError) -> Response {
    let (status, message) = match err.downcast_ref::<HttpError>() {
        Some(http) => (http.status(), http.message().to_owned()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::INTERNAL_SERVER_ERROR.canonical_reason().unwrap_or_default().to_owned(),
        ),
    };
    let mut res = Response::default();
    res.set_status(status);
    res.text(message);
    res
}
