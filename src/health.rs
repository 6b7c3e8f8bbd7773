//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them like any other handler:
//!
//! ```rust
//! use waymark::{Router, RouteSpec, health};
//! use waymark::middleware::from_fn;
//!
//! # fn main() -> Result<(), waymark::Error> {
//! let mut router = Router::default();
//! router.add_routes([
//!     RouteSpec::get("/healthz").handler(from_fn(health::liveness)),
//!     RouteSpec::get("/readyz").handler(from_fn(health::readiness)),
//! ])?;
//! # Ok(())
//! # }
//! ```

use crate::context::Context;
use crate::error::HandlerResult;
use crate::middleware::{BoxFuture, Next};

/// Kubernetes liveness probe handler.
///
/// Always answers `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive.
pub fn liveness<'a>(ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        ctx.text("ok");
        Ok(())
    })
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Answers `200 OK` with body `"ready"`. Replace it with your own handler
/// when readiness depends on a warm-up period or downstream services.
pub fn readiness<'a>(ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
    Box::pin(async move {
        ctx.text("ready");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn ctx() -> Context {
        Context::from_request(http::Request::get("/healthz").body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn liveness_answers_ok() {
        let mut ctx = ctx();
        liveness(&mut ctx, Next::end()).await.unwrap();
        assert_eq!(ctx.response().status(), StatusCode::OK);
        assert_eq!(ctx.response().body().map(|b| &b[..]), Some(&b"ok"[..]));
    }

    #[tokio::test]
    async fn readiness_answers_ready() {
        let mut ctx = ctx();
        readiness(&mut ctx, Next::end()).await.unwrap();
        assert_eq!(ctx.response().body().map(|b| &b[..]), Some(&b"ready"[..]));
    }
}
