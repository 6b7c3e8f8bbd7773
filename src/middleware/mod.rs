//! Middleware layer.
//!
//! A middleware is one step of a chain. It receives the request
//! [`Context`] and a [`Next`] continuation, may act before and after calling
//! `next.run(ctx).await`, or skip the call to short-circuit. Route handlers
//! have exactly the same shape; the last step of a route chain simply tends
//! not to call `next`.
//!
//! ```text
//! registry mw A → registry mw B → route-local mw → handler
//!       ↓               ↓                ↓            ↓
//!    before …        before …         before …     writes ctx
//!       ↑               ↑                ↑            │
//!    after  …  ←    after  …   ←     after  …   ←─────┘
//! ```
//!
//! Built-in middleware:
//! - [`trace::RequestTrace`]: per-request span with method, path, status, latency

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::HandlerResult;

pub mod trace;

pub use crate::handler::{FnHandler, from_fn};

/// A heap-allocated, type-erased future borrowing from the chain for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased middleware shared by every request that runs its chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// One composable request-processing step.
///
/// Implement it on your own types for stateful middleware; wrap closures and
/// plain functions with [`from_fn`].
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult>;
}

/// The remainder of a chain.
///
/// Consumed by [`Next::run`], so the rest of the chain runs at most once per
/// step. When the steps run out, control passes to the continuation the
/// chain was started with (`then`), which is how a route chain without a
/// handler falls through to the host pipeline.
pub struct Next<'a> {
    stack: &'a [BoxedMiddleware],
    then: Option<Box<Next<'a>>>,
}

impl<'a> Next<'a> {
    pub fn new(stack: &'a [BoxedMiddleware]) -> Self {
        Self { stack, then: None }
    }

    /// A continuation that does nothing and succeeds.
    pub fn end() -> Self {
        Self::new(&[])
    }

    /// Continue with `then` once this stack is exhausted.
    pub fn then(mut self, then: Next<'a>) -> Self {
        self.then = Some(Box::new(then));
        self
    }

    /// Runs the next step, or the continuation when none are left.
    pub fn run<'b>(self, ctx: &'b mut Context) -> BoxFuture<'b, HandlerResult>
    where
        'a: 'b,
    {
        match self.stack.split_first() {
            Some((head, rest)) => head.call(ctx, Next { stack: rest, then: self.then }),
            None => match self.then {
                Some(then) => then.run(ctx),
                None => Box::pin(async { Ok(()) }),
            },
        }
    }
}
