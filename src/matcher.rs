//! Radix-tree path matching.
//!
//! One `matchit` tree over all patterns, O(path-length) lookup. Each pattern
//! owns an endpoint listing the chains registered on it in registration
//! order, each with the methods it answers. A request runs every chain on
//! the matched pattern that accepts its method, one after the other.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::method::Method;
use crate::middleware::BoxedMiddleware;

#[derive(Clone)]
struct Layer {
    methods: Vec<Method>,
    chain: Arc<[BoxedMiddleware]>,
}

#[derive(Clone)]
struct Endpoint {
    pattern: String,
    layers: Vec<Layer>,
}

/// The outcome of matching one request path.
pub(crate) struct Found {
    pub pattern: String,
    /// Every method registered on the pattern, sorted and deduplicated.
    pub methods: Vec<Method>,
    pub params: HashMap<String, String>,
    /// The steps to run for the request's method; empty when the pattern
    /// matched but the method did not.
    pub chain: Vec<BoxedMiddleware>,
}

#[derive(Clone)]
pub(crate) struct Matcher {
    tree: MatchitRouter<usize>,
    by_pattern: HashMap<String, usize>,
    endpoints: Vec<Endpoint>,
    strict_trailing_slash: bool,
}

impl Matcher {
    pub fn new(strict_trailing_slash: bool) -> Self {
        Self {
            tree: MatchitRouter::new(),
            by_pattern: HashMap::new(),
            endpoints: Vec::new(),
            strict_trailing_slash,
        }
    }

    /// Adds a chain for `methods` on `pattern`. Registering a pattern again
    /// appends a layer that runs after the earlier ones.
    pub fn register(
        &mut self,
        methods: Vec<Method>,
        pattern: &str,
        chain: Arc<[BoxedMiddleware]>,
    ) -> Result<(), Error> {
        let pattern = self.normalize(pattern).to_owned();
        let index = match self.by_pattern.get(&pattern) {
            Some(&index) => index,
            None => {
                let index = self.endpoints.len();
                self.tree
                    .insert(pattern.as_str(), index)
                    .map_err(|source| Error::InvalidRoute { path: pattern.clone(), source })?;
                self.by_pattern.insert(pattern.clone(), index);
                self.endpoints.push(Endpoint { pattern, layers: Vec::new() });
                index
            }
        };
        self.endpoints[index].layers.push(Layer { methods, chain });
        Ok(())
    }

    /// Matches `path`. `None` when no pattern matches at all.
    pub fn find(&self, method: Option<Method>, path: &str) -> Option<Found> {
        let matched = self.tree.at(self.normalize(path)).ok()?;
        let endpoint = &self.endpoints[*matched.value];

        let mut methods: Vec<Method> =
            endpoint.layers.iter().flat_map(|l| l.methods.iter().copied()).collect();
        methods.sort_unstable();
        methods.dedup();

        let chain = match method {
            Some(method) => endpoint
                .layers
                .iter()
                .filter(|l| l.methods.contains(&method))
                .flat_map(|l| l.chain.iter().cloned())
                .collect(),
            None => Vec::new(),
        };

        Some(Found {
            pattern: endpoint.pattern.clone(),
            methods,
            params: matched.params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
            chain,
        })
    }

    /// Without strict trailing slashes `/a/` and `/a` are the same path.
    fn normalize<'p>(&self, path: &'p str) -> &'p str {
        if self.strict_trailing_slash || path.len() <= 1 {
            return path;
        }
        path.strip_suffix('/').unwrap_or(path)
    }
}
