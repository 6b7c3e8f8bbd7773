//! Route compilation: from a [`RouteSpec`] to the chain a matcher runs.
//!
//! For one route the chain is, in order:
//!
//! 1. the registry middlewares the route has arguments for, ordered by the
//!    declared order when one exists, by argument declaration order otherwise;
//! 2. the route-local middlewares, verbatim;
//! 3. the handler behind the [`ErrorBoundary`], when there is one.
//!
//! A declared order both orders and filters: once any key is declared, a
//! registry middleware whose key is not in the declared order never runs.
//! Argument names that match nothing in the registry are metadata and are
//! ignored, as are the reserved field names.

use std::sync::Arc;

use tracing::debug;

use crate::boundary::{ErrorBoundary, ErrorHandler};
use crate::error::Error;
use crate::method::{self, Method};
use crate::middleware::BoxedMiddleware;
use crate::registry::MiddlewareRegistry;
use crate::route::{RESERVED_FIELDS, RouteSpec};

/// A route ready to be registered with the matcher.
pub(crate) struct CompiledRoute {
    pub methods: Vec<Method>,
    pub pattern: String,
    pub chain: Arc<[BoxedMiddleware]>,
}

pub(crate) struct RouteCompiler<'r> {
    registry: &'r MiddlewareRegistry,
    error_handler: Option<&'r ErrorHandler>,
    prefix: &'r str,
    allowed: &'r [Method],
}

impl<'r> RouteCompiler<'r> {
    pub fn new(
        registry: &'r MiddlewareRegistry,
        error_handler: Option<&'r ErrorHandler>,
        prefix: &'r str,
        allowed: &'r [Method],
    ) -> Self {
        Self { registry, error_handler, prefix, allowed }
    }

    /// The registry keys that apply to `route`, in execution order.
    pub fn resolve<'s>(&self, route: &'s RouteSpec) -> Vec<&'s str> {
        let candidates: Vec<&str> = route
            .arg_names()
            .filter(|name| !RESERVED_FIELDS.contains(name))
            .filter(|name| self.registry.contains(name))
            .collect();

        if !self.registry.has_order() {
            return candidates;
        }
        self.registry
            .order()
            .filter_map(|key| candidates.iter().find(|c| **c == key).copied())
            .collect()
    }

    pub fn compile(&self, route: RouteSpec) -> Result<CompiledRoute, Error> {
        let pattern = format!("{}{}", self.prefix, route.url);
        let keys = self.resolve(&route);

        let capacity = keys.len() + route.middlewares.len() + 1;
        let mut chain: Vec<BoxedMiddleware> = Vec::with_capacity(capacity);
        for key in &keys {
            // resolve() only yields keys present in both the registry and the args
            let (Some(factory), Some(value)) = (self.registry.get(key), route.get_arg(key)) else {
                continue;
            };
            let middleware = factory.build(value).map_err(|source| Error::MiddlewareArgument {
                name: (*key).to_owned(),
                path: pattern.clone(),
                source,
            })?;
            chain.push(middleware);
        }

        let ignored: Vec<&str> = route
            .arg_names()
            .filter(|name| !RESERVED_FIELDS.contains(name) && !keys.contains(name))
            .collect();
        if !ignored.is_empty() {
            debug!(path = %pattern, ?ignored, "route arguments not applied as middleware");
        }
        debug!(path = %pattern, method = ?route.method, middlewares = ?keys, "route compiled");

        chain.extend(route.middlewares.iter().cloned());
        if let Some(handler) = route.handler.clone() {
            let boundary = ErrorBoundary::wrap(handler, self.error_handler.cloned());
            chain.push(Arc::new(boundary));
        }

        Ok(CompiledRoute {
            methods: method::resolve(route.method, self.allowed),
            pattern,
            chain: chain.into(),
        })
    }
}
