//! # waymark
//!
//! Declarative routes with named, centrally ordered middleware, on top of a
//! radix-tree router.
//!
//! ## The contract
//!
//! Path matching belongs to [`matchit`]. Transport belongs to hyper. What is
//! left for waymark is deciding, per route, *which* shared middlewares run
//! and *in what order*:
//!
//! - **Registry**: named middleware factories, registered once per router.
//! - **Route arguments**: a route enables a registered middleware by
//!   carrying an argument under its name; the value configures it.
//! - **Declared order**: one router-wide list decides execution order, so
//!   route authors never have to.
//! - **Error boundary**: an optional router-wide handler receives whatever
//!   a route handler fails with.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use waymark::middleware::from_fn;
//! use waymark::{App, Factory, Router, RouterOptions, RouteSpec, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), waymark::Error> {
//!     let mut router = Router::new(
//!         RouterOptions::new()
//!             .prefix("/api")
//!             .error_handler(|err, ctx| {
//!                 ctx.response_mut().set_status(StatusCode::BAD_GATEWAY);
//!                 ctx.text(err.to_string());
//!             }),
//!     );
//!
//!     router
//!         .register([("needLogin", Factory::new(|_| from_fn(|ctx, next| Box::pin(async move {
//!             if ctx.header("authorization").is_none() {
//!                 ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
//!                 return Ok(());
//!             }
//!             next.run(ctx).await
//!         }))))])
//!         .declare_order(["needLogin"]);
//!
//!     router.add_routes([
//!         RouteSpec::get("/users/{id}")
//!             .arg("needLogin", true)
//!             .handler(from_fn(|ctx, _next| Box::pin(async move {
//!                 let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!                 ctx.json(format!(r#"{{"id":"{id}"}}"#).into_bytes());
//!                 Ok(())
//!             }))),
//!     ])?;
//!
//!     let app = App::new()
//!         .with(router.routes())
//!         .with(router.allowed_methods(Default::default()));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod app;
mod boundary;
mod compiler;
mod config;
mod context;
mod error;
mod handler;
mod matcher;
mod method;
mod registry;
mod response;
mod route;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use app::App;
pub use boundary::{ErrorBoundary, ErrorHandler};
pub use config::{RouterOptions, ServerConfig};
pub use context::{Context, RouteMatch};
pub use error::{BoxError, Error, HandlerResult, HttpError};
pub use method::Method;
pub use registry::{Factory, MiddlewareRegistry};
pub use response::{ContentType, Response};
pub use route::{RESERVED_FIELDS, RouteSpec};
pub use router::{AllowedMethods, AllowedMethodsOptions, Router, Routes};
pub use server::Server;
