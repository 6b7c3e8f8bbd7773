//! Router and server configuration.
//!
//! [`RouterOptions`] is built in code, once, when the router is constructed.
//! [`ServerConfig`] is read from environment variables with development
//! defaults:
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `3000`)

use std::fmt;
use std::sync::Arc;

use crate::boundary::ErrorHandler;
use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::method::Method;

/// Construction-time options of one [`Router`](crate::Router).
///
/// ```rust
/// use http::StatusCode;
/// use waymark::{Method, RouterOptions};
///
/// let options = RouterOptions::new()
///     .prefix("/api")
///     .strict_trailing_slash(true)
///     .allowed_methods([Method::Get, Method::Post])
///     .request_logging(true)
///     .error_handler(|err, ctx| {
///         tracing::warn!(error = %err, "handler failed");
///         ctx.response_mut().set_status(StatusCode::BAD_GATEWAY);
///     });
/// ```
#[derive(Clone)]
pub struct RouterOptions {
    pub(crate) prefix: String,
    pub(crate) strict_trailing_slash: bool,
    pub(crate) allowed_methods: Vec<Method>,
    pub(crate) error_handler: Option<ErrorHandler>,
    pub(crate) request_logging: bool,
}

impl RouterOptions {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            strict_trailing_slash: false,
            allowed_methods: Method::DEFAULT_ALLOWED.to_vec(),
            error_handler: None,
            request_logging: false,
        }
    }

    /// Prepended to every route pattern registered on the router.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// When `false` (the default) `/users/` and `/users` reach the same route.
    pub fn strict_trailing_slash(mut self, strict: bool) -> Self {
        self.strict_trailing_slash = strict;
        self
    }

    /// The only methods the router matches, and what a route without a
    /// method answers.
    pub fn allowed_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.allowed_methods = methods.into_iter().collect();
        self
    }

    /// Receives every error a route handler returns, instead of letting it
    /// reach the host.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(BoxError, &mut Context) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Installs [`RequestTrace`](crate::middleware::trace::RequestTrace)
    /// ahead of route matching.
    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }
}

impl Default for RouterOptions {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for RouterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterOptions")
            .field("prefix", &self.prefix)
            .field("strict_trailing_slash", &self.strict_trailing_slash)
            .field("allowed_methods", &self.allowed_methods)
            .field("error_handler", &self.error_handler.is_some())
            .field("request_logging", &self.request_logging)
            .finish()
    }
}

/// Where the [`Server`](crate::Server) listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got `{raw}`")))?,
            None => 3000,
        };
        Ok(Self { host, port })
    }

    /// `host:port`, ready for [`Server::bind`](crate::Server::bind).
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn router_defaults() {
        let options = RouterOptions::default();
        assert_eq!(options.prefix, "");
        assert!(!options.strict_trailing_slash);
        assert_eq!(options.allowed_methods, Method::DEFAULT_ALLOWED);
        assert!(options.error_handler.is_none());
        assert!(!options.request_logging);
    }

    #[test]
    fn server_defaults_without_env() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn server_reads_host_and_port() {
        let env = HashMap::from([("HOST", "127.0.0.1"), ("PORT", "8080")]);
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config, ServerConfig { host: "127.0.0.1".into(), port: 8080 });
    }

    #[test]
    fn server_rejects_bad_port() {
        let err = ServerConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_owned()));
        assert!(matches!(err, Err(Error::Config(msg)) if msg.contains("`http`")));
    }
}
