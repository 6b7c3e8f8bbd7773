//! Per-request tracing.
//!
//! Opens an `info` span carrying the method and path, runs the rest of the
//! pipeline inside it, then logs the final status and latency. Errors that
//! escape the pipeline are logged and passed on untouched.

use std::time::Instant;

use tracing::{Instrument, error, info, info_span};

use crate::context::Context;
use crate::error::HandlerResult;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Request logging middleware, installed by
/// [`RouterOptions::request_logging`](crate::RouterOptions::request_logging).
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTrace;

impl Middleware for RequestTrace {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        let span = info_span!("request", method = %ctx.method(), path = %ctx.path());
        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(ctx).await;
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                match &result {
                    Ok(()) => {
                        let status = ctx.response().status().as_u16();
                        info!(status, latency_ms, "request finished");
                    }
                    Err(err) => error!(error = %err, latency_ms, "request failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::middleware::{BoxedMiddleware, from_fn};

    #[tokio::test]
    async fn passes_through_result_and_response() {
        let stack: Vec<BoxedMiddleware> = vec![
            Arc::new(RequestTrace),
            Arc::new(from_fn(|ctx, _next| {
                Box::pin(async move {
                    ctx.response_mut().set_status(StatusCode::ACCEPTED);
                    Ok(())
                })
            })),
        ];
        let mut ctx = Context::from_request(http::Request::get("/t").body(Bytes::new()).unwrap());

        Next::new(&stack).run(&mut ctx).await.unwrap();

        assert_eq!(ctx.response().status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn passes_errors_on() {
        let stack: Vec<BoxedMiddleware> = vec![
            Arc::new(RequestTrace),
            Arc::new(from_fn(|_ctx, _next| Box::pin(async { Err("broken".into()) }))),
        ];
        let mut ctx = Context::from_request(http::Request::get("/t").body(Bytes::new()).unwrap());

        let err = Next::new(&stack).run(&mut ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "broken");
    }
}
