//! Route methods.
//!
//! Only the RFC 9110 methods can be declared on a route. A route declared
//! without a method answers every method in the router's allowed list (see
//! [`RouterOptions::allowed_methods`](crate::RouterOptions::allowed_methods)).
//! Request methods outside that list never match a route; they surface as
//! `501 Not Implemented` through [`AllowedMethods`](crate::AllowedMethods).

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A method a route can be declared for. Ordered alphabetically, which is
/// also the order of `Allow` headers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

const NAMES: [(Method, &str); 9] = [
    (Method::Connect, "CONNECT"),
    (Method::Delete, "DELETE"),
    (Method::Get, "GET"),
    (Method::Head, "HEAD"),
    (Method::Options, "OPTIONS"),
    (Method::Patch, "PATCH"),
    (Method::Post, "POST"),
    (Method::Put, "PUT"),
    (Method::Trace, "TRACE"),
];

impl Method {
    /// The methods a router matches when none are configured.
    pub const DEFAULT_ALLOWED: [Method; 7] = [
        Method::Head,
        Method::Options,
        Method::Get,
        Method::Put,
        Method::Patch,
        Method::Post,
        Method::Delete,
    ];

    /// Uppercase wire name, e.g. `"GET"`.
    pub fn as_str(self) -> &'static str {
        NAMES[self as usize].1
    }

    /// Case-insensitive lookup, so `"get"` and `"GET"` agree.
    pub fn from_name(name: &str) -> Result<Self, Error> {
        name.to_ascii_uppercase().parse()
    }

    /// Maps a request method from the wire. Extension methods yield `None`.
    pub fn from_http(method: &http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

/// Case-sensitive, as method names are on the wire.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(method, _)| *method)
            .ok_or_else(|| Error::UnknownMethod(s.to_owned()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a route's declared method into the methods it is registered for.
///
/// `None` means ALL: every method the router allows. A GET route also answers
/// HEAD, as long as the router allows HEAD at all.
pub(crate) fn resolve(declared: Option<Method>, allowed: &[Method]) -> Vec<Method> {
    let mut methods = match declared {
        Some(method) => vec![method],
        None => allowed.to_vec(),
    };
    let head_allowed = allowed.contains(&Method::Head);
    if head_allowed && methods.contains(&Method::Get) && !methods.contains(&Method::Head) {
        methods.push(Method::Head);
    }
    methods
}
