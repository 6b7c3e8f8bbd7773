//! Unified error types.

use http::StatusCode;
use thiserror::Error;

/// Any error a handler or middleware may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What every middleware, handler and continuation resolves to.
pub type HandlerResult = Result<(), BoxError>;

/// The error type returned by waymark's fallible setup operations.
///
/// Failures inside a request are expressed as [`BoxError`]s flowing out of a
/// chain, not as `Error`s. This type surfaces setup problems: an address that
/// does not parse, a route pattern the radix tree rejects, a middleware
/// argument a typed factory cannot decode.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    #[error("invalid argument for middleware `{name}` on route `{path}`: {source}")]
    MiddlewareArgument {
        name: String,
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("configuration: {0}")]
    Config(String),
}

/// A handler error that carries the HTTP status it should be answered with.
///
/// Return it from a handler (`Err(HttpError::new(..).into())`) and the
/// [`App`](crate::App) renders `status` with `message` as the plain-text body
/// instead of the generic `500`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// An error whose message is the status' canonical reason phrase.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or_default())
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn message(&self) -> &str { &self.message }
}
