//! Function middleware and type erasure.
//!
//! # How closures become chain steps
//!
//! A chain holds steps of *different* types in one slice, so every step is
//! stored as a trait object (`Arc<dyn Middleware>`). Closures and plain
//! functions reach that form through [`from_fn`]:
//!
//! ```text
//! |ctx, next| Box::pin(async move { … })          ← user writes this
//!        ↓ from_fn(…)
//! FnHandler(closure)                              ← implements Middleware
//!        ↓ Arc::new(…) as BoxedMiddleware
//! step.call(ctx, next)  at request time           ← one vtable dispatch
//! ```
//!
//! The closure has to return a boxed future because the future borrows the
//! context for as long as it runs; `async fn` items cannot express that
//! borrow through an `Fn` bound.

use crate::context::Context;
use crate::error::HandlerResult;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Wraps a function or closure as a [`Middleware`].
///
/// ```rust
/// use waymark::middleware::{BoxFuture, Next, from_fn};
/// use waymark::{Context, HandlerResult};
///
/// // closure
/// let hello = from_fn(|ctx, _next| Box::pin(async move {
///     ctx.text("hello");
///     Ok(())
/// }));
///
/// // named function
/// fn timing<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
///     Box::pin(async move {
///         let started = std::time::Instant::now();
///         next.run(ctx).await?;
///         tracing::debug!(elapsed = ?started.elapsed(), "downstream finished");
///         Ok(())
///     })
/// }
/// let timing = from_fn(timing);
/// ```
pub fn from_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    FnHandler(f)
}

/// Newtype wrapper that holds a concrete function `F` and implements
/// [`Middleware`], bridging the typed world to the trait-object world.
pub struct FnHandler<F>(F);

impl<F> Middleware for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, HandlerResult> {
        (self.0)(ctx, next)
    }
}
