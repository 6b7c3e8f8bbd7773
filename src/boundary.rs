//! Error boundary around route handlers.
//!
//! Each invocation is a single attempt: the wrapped handler either returns,
//! or its error is handed to the router's [`ErrorHandler`] and the request
//! continues as if the handler had succeeded. Without an error handler the
//! error leaves the boundary untouched.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::{BoxError, HandlerResult};
use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};

/// Receives a handler's error together with the request context. Whatever it
/// writes onto the context's response is what the client gets.
pub type ErrorHandler = Arc<dyn Fn(BoxError, &mut Context) + Send + Sync>;

/// A handler wrapped so that its errors go to an [`ErrorHandler`].
pub struct ErrorBoundary {
    handler: BoxedMiddleware,
    on_error: Option<ErrorHandler>,
}

impl ErrorBoundary {
    pub fn wrap(handler: BoxedMiddleware, on_error: Option<ErrorHandler>) -> Self {
        Self { handler, on_error }
    }
}

impl Middleware for ErrorBoundary {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let err = match self.handler.call(ctx, next).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            match &self.on_error {
                Some(on_error) => {
                    debug!(error = %err, path = ctx.path(), "handler error delegated");
                    on_error(err, ctx);
                    Ok(())
                }
                None => Err(err),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::error::HttpError;
    use crate::middleware::from_fn;

    fn ctx() -> Context {
        Context::from_request(http::Request::get("/boom").body(Bytes::new()).unwrap())
    }

    fn failing() -> BoxedMiddleware {
        Arc::new(from_fn(|_ctx, _next| {
            Box::pin(async { Err(HttpError::new(StatusCode::CONFLICT, "taken").into()) })
        }))
    }

    #[tokio::test]
    async fn delegates_error_once_and_suppresses_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        let on_error: ErrorHandler = {
            let calls = Arc::clone(&calls);
            let seen = Arc::clone(&seen);
            Arc::new(move |err, ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                *seen.lock().unwrap() = Some((err.to_string(), ctx.path().to_owned()));
                ctx.response_mut().set_status(StatusCode::IM_A_TEAPOT);
            })
        };
        let boundary = ErrorBoundary::wrap(failing(), Some(on_error));
        let mut ctx = ctx();

        boundary.call(&mut ctx, Next::end()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            Some(("409 Conflict: taken".to_owned(), "/boom".to_owned())),
        );
        assert_eq!(ctx.response().status(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn propagates_original_error_without_handler() {
        let boundary = ErrorBoundary::wrap(failing(), None);

        let err = boundary.call(&mut ctx(), Next::end()).await.unwrap_err();

        let err = err.downcast::<HttpError>().unwrap();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "taken");
    }

    #[tokio::test]
    async fn success_skips_error_handler() {
        let on_error: ErrorHandler = Arc::new(|_, _| panic!("must not be called"));
        let ok: BoxedMiddleware = Arc::new(from_fn(|ctx, _next| {
            Box::pin(async move {
                ctx.text("fine");
                Ok(())
            })
        }));
        let mut ctx = ctx();

        ErrorBoundary::wrap(ok, Some(on_error)).call(&mut ctx, Next::end()).await.unwrap();

        assert_eq!(ctx.response().status(), StatusCode::OK);
    }
}
