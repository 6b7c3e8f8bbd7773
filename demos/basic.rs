//! Two prefixed routers sharing one app, with registry middlewares and
//! health checks.
//!
//! Run with:
//!   RUST_LOG=info,waymark=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/one
//!   curl http://localhost:3000/two
//!   curl http://localhost:3000/api/users/42
//!   curl -H 'authorization: Bearer x' http://localhost:3000/api/users/42
//!   curl -X OPTIONS -i http://localhost:3000/api/users/42
//!   curl -X DELETE -i http://localhost:3000/api/users/42
//!   curl http://localhost:3000/api/broken
//!   curl http://localhost:3000/healthz

use http::StatusCode;
use http::header::{CACHE_CONTROL, HeaderValue};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use waymark::middleware::{Middleware, from_fn};
use waymark::{
    App, Factory, HttpError, Router, RouterOptions, RouteSpec, Server, ServerConfig, health,
};

#[derive(Deserialize)]
struct Cache {
    max_age: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = ServerConfig::from_env()?;

    let mut one = Router::new(RouterOptions::new().prefix("/one"));
    one.add_routes([RouteSpec::get("/").handler(text("This is one page"))])?;

    let mut two = Router::new(RouterOptions::new().prefix("/two"));
    two.add_routes([RouteSpec::get("/").handler(text("This is two page"))])?;

    let mut api = Router::new(
        RouterOptions::new()
            .prefix("/api")
            .request_logging(true)
            .error_handler(|err, ctx| {
                tracing::warn!(error = %err, path = ctx.path(), "api handler failed");
                ctx.response_mut().set_status(StatusCode::BAD_GATEWAY);
                ctx.text("upstream unavailable");
            }),
    );
    api.register([
        ("needLogin", Factory::new(|required| need_login(required.as_bool().unwrap_or(false)))),
        ("cache", Factory::typed(|cache: Cache| cache_control(cache.max_age))),
    ])
    .declare_order(["needLogin", "cache"]);
    api.add_routes([
        RouteSpec::get("/users/{id}")
            .arg("cache", serde_json::json!({ "max_age": 60 }))
            .arg("needLogin", true)
            .handler(from_fn(|ctx, _next| {
                Box::pin(async move {
                    let id = ctx.param("id").unwrap_or("unknown").to_owned();
                    ctx.json(format!(r#"{{"id":"{id}"}}"#).into_bytes());
                    Ok(())
                })
            })),
        RouteSpec::post("/users").arg("needLogin", true).handler(from_fn(|ctx, _next| {
            Box::pin(async move {
                let body = ctx.body().to_vec();
                ctx.response_mut().set_status(StatusCode::CREATED);
                ctx.json(body);
                Ok(())
            })
        })),
        RouteSpec::get("/broken").handler(from_fn(|_ctx, _next| {
            Box::pin(async { Err(HttpError::new(StatusCode::SERVICE_UNAVAILABLE, "db down").into()) })
        })),
    ])?;

    let mut probes = Router::default();
    probes.add_routes([
        RouteSpec::get("/healthz").handler(from_fn(health::liveness)),
        RouteSpec::get("/readyz").handler(from_fn(health::readiness)),
    ])?;

    let app = App::new()
        .with(one.routes())
        .with(two.routes())
        .with(api.routes())
        .with(api.allowed_methods(Default::default()))
        .with(probes.routes());

    Server::bind(&config.addr())?.serve(app).await?;
    Ok(())
}

fn text(body: &'static str) -> impl Middleware {
    from_fn(move |ctx, _next| {
        Box::pin(async move {
            ctx.text(body);
            Ok(())
        })
    })
}

fn need_login(required: bool) -> impl Middleware {
    from_fn(move |ctx, next| {
        Box::pin(async move {
            if required && ctx.header("authorization").is_none() {
                ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
                ctx.text("login required");
                return Ok(());
            }
            next.run(ctx).await
        })
    })
}

fn cache_control(max_age: u32) -> impl Middleware {
    let value = HeaderValue::from_str(&format!("max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"));
    from_fn(move |ctx, next| {
        let value = value.clone();
        Box::pin(async move {
            next.run(ctx).await?;
            ctx.response_mut().set_header(CACHE_CONTROL, value);
            Ok(())
        })
    })
}
