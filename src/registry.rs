//! Name-to-middleware resolution.

use std::collections::HashMap;
use std::sync::Arc;

use crate::middleware::Middleware;

/// Resolves middleware names for [`Pipeline::add_name`](crate::Pipeline::add_name).
///
/// Implement this to plug in an existing service container; [`Registry`]
/// is the shipped map-backed implementation.
pub trait Factory: Send + Sync + 'static {
    /// Returns the middleware registered under `name`, or `None` when the
    /// name is unknown.
    fn resolve(&self, name: &str) -> Option<Arc<dyn Middleware>>;
}

type Constructor = Box<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// A map from name to middleware constructor. Each [`resolve`](Factory::resolve)
/// call builds a fresh instance.
///
/// ```rust
/// use strate::{Pipeline, Registry, middleware::Trace};
///
/// let registry = Registry::new().register("trace", || Trace::new().with_priority(100));
/// let pipeline = Pipeline::new().factory(registry).add_name("trace")?;
/// # Ok::<(), strate::Error>(())
/// ```
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers `build` under `name`. Re-registering a name replaces the
    /// previous constructor.
    pub fn register<M, F>(mut self, name: impl Into<String>, build: F) -> Self
    where
        M: Middleware,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let constructor: Constructor = Box::new(move || Arc::new(build()));
        self.constructors.insert(name.into(), constructor);
        self
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory for Registry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.constructors.get(name).map(|build| build())
    }
}
