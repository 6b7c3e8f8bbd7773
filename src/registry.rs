//! Named middleware factories and the declared execution order.
//!
//! Routes do not list registry middleware directly. They carry arguments
//! (see [`RouteSpec::arg`](crate::RouteSpec::arg)); an argument whose name
//! matches a registered factory enables that middleware on the route and is
//! the value the factory is configured with.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BoxError;
use crate::middleware::{BoxedMiddleware, Middleware};

type FactoryFn = dyn Fn(&Value) -> Result<BoxedMiddleware, BoxError> + Send + Sync;

fn erase<F>(f: F) -> Arc<FactoryFn>
where
    F: Fn(&Value) -> Result<BoxedMiddleware, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds a middleware instance from a route's argument value.
#[derive(Clone)]
pub struct Factory(Arc<FactoryFn>);

impl Factory {
    /// A factory reading the raw JSON value.
    ///
    /// ```rust
    /// use waymark::Factory;
    /// use waymark::middleware::from_fn;
    /// use http::StatusCode;
    ///
    /// let need_login = Factory::new(|required| {
    ///     let required = required.as_bool().unwrap_or(false);
    ///     from_fn(move |ctx, next| Box::pin(async move {
    ///         if required && ctx.header("authorization").is_none() {
    ///             ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
    ///             return Ok(());
    ///         }
    ///         next.run(ctx).await
    ///     }))
    /// });
    /// ```
    pub fn new<F, M>(f: F) -> Self
    where
        F: Fn(&Value) -> M + Send + Sync + 'static,
        M: Middleware,
    {
        Self(erase(move |value| Ok(Arc::new(f(value)) as BoxedMiddleware)))
    }

    /// A factory whose argument is first deserialized into `T`.
    ///
    /// A value that does not decode fails route compilation with
    /// [`Error::MiddlewareArgument`](crate::Error::MiddlewareArgument).
    pub fn typed<T, F, M>(f: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(T) -> M + Send + Sync + 'static,
        M: Middleware,
    {
        Self(erase(move |value| {
            let config = T::deserialize(value)?;
            Ok(Arc::new(f(config)) as BoxedMiddleware)
        }))
    }

    pub(crate) fn build(&self, value: &Value) -> Result<BoxedMiddleware, BoxError> {
        (self.0)(value)
    }
}

/// Store of named middleware factories plus the declared ordering.
///
/// Owned by one [`Router`](crate::Router) and written only while it is being
/// set up.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, Factory>,
    order: IndexSet<String>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `entries` into the store. A name already present is overwritten.
    pub fn register<I, K>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Factory)>,
        K: Into<String>,
    {
        for (name, factory) in entries {
            self.factories.insert(name.into(), factory);
        }
        self
    }

    pub fn register_one(&mut self, name: impl Into<String>, factory: Factory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Appends `keys` to the declared order. A key keeps the position of its
    /// first declaration; unknown keys are kept but inert.
    pub fn declare_order<I, K>(&mut self, keys: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.order.insert(key.into());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Factory> {
        self.factories.get(name)
    }

    /// The declared order, first declaration first.
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn has_order(&self) -> bool {
        !self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::middleware::from_fn;

    fn noop() -> Factory {
        Factory::new(|_| from_fn(|ctx, next| next.run(ctx)))
    }

    #[test]
    fn register_overwrites_same_name() {
        let mut registry = MiddlewareRegistry::new();
        registry.register([("auth", noop()), ("cache", noop())]);
        registry.register([("auth", noop())]);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("auth"));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn order_keeps_first_declaration() {
        let mut registry = MiddlewareRegistry::new();
        registry.declare_order(["c", "a"]).declare_order(["b", "c", "a"]);

        assert_eq!(registry.order().collect::<Vec<_>>(), ["c", "a", "b"]);
        assert!(registry.is_empty());
        assert!(registry.has_order());
    }

    #[test]
    fn typed_factory_rejects_bad_argument() {
        #[derive(Deserialize)]
        struct Limit {
            #[allow(dead_code)]
            per_minute: u32,
        }
        let factory = Factory::typed(|_: Limit| from_fn(|ctx, next| next.run(ctx)));

        assert!(factory.build(&json!({ "per_minute": 60 })).is_ok());
        assert!(factory.build(&json!("sixty")).is_err());
    }
}
