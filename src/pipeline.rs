//! The pipeline: middleware registration, ordering, execution.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::chain;
use crate::error::Error;
use crate::handler::{Handler, empty_ok};
use crate::middleware::Middleware;
use crate::registry::Factory;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;

/// One registered middleware plus its declared gates, snapshotted at
/// registration time. Changing what `priority()` or `route()` would return
/// after registration has no effect on an already-built pipeline.
#[derive(Clone)]
pub(crate) struct Entry {
    middleware: Arc<dyn Middleware>,
    route: Option<Arc<Route>>,
    priority: i32,
}

impl Entry {
    pub(crate) fn new(middleware: Arc<dyn Middleware>) -> Self {
        let route = middleware.route().map(Arc::new);
        let priority = middleware.priority();
        Self {
            middleware,
            route,
            priority,
        }
    }

    pub(crate) fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }

    pub(crate) fn priority(&self) -> i32 {
        self.priority
    }

    /// Both gates must open: the per-request condition first, then the
    /// route restriction.
    pub(crate) fn should_execute(&self, req: &Request) -> bool {
        if !self.middleware.should_execute(req) {
            return false;
        }
        match &self.route {
            Some(route) => route.matches(req.path(), req.method().as_str()),
            None => true,
        }
    }
}

/// A priority-ordered middleware chain in front of a fallback handler.
///
/// Middleware is registered with [`add`](Pipeline::add) (or by name with
/// [`add_name`](Pipeline::add_name) once a [`Factory`] is attached) and
/// kept sorted by declared priority, higher first. Equal priorities keep
/// their registration order. Each request runs through the open-gated
/// middleware in that order; whatever none of them short-circuits reaches
/// the fallback, which answers `200 OK` with an empty body unless replaced
/// via [`fallback`](Pipeline::fallback).
///
/// A pipeline is built by value and then only ever borrowed, so a built
/// pipeline can be shared freely across tasks behind an `Arc`.
///
/// ```rust
/// use strate::{Next, Pipeline, Request, Response};
///
/// let pipeline = Pipeline::new()
///     .add(|req: Request, next: Next| async move {
///         next.handle(req).await.with_header("x-request-id", "42")
///     })
///     .fallback(|_req: Request| async { Response::text("hello") });
/// ```
pub struct Pipeline {
    entries: Vec<Entry>,
    fallback: Arc<dyn Handler>,
    factory: Option<Arc<dyn Factory>>,
}

impl Pipeline {
    /// An empty pipeline over the default fallback (`200 OK`, empty body).
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: Arc::new(empty_ok),
            factory: None,
        }
    }

    /// Replaces the fallback handler at the end of the chain.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Arc::new(handler);
        self
    }

    /// Attaches the factory consulted by [`add_name`](Pipeline::add_name).
    pub fn factory(mut self, factory: impl Factory) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Registers a middleware. The list is re-sorted after every insert,
    /// so registration order never matters across different priorities.
    pub fn add(mut self, middleware: impl Middleware) -> Self {
        self.push(Arc::new(middleware));
        self
    }

    /// Registers a middleware by name, resolved through the attached
    /// [`Factory`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMiddleware`] for an empty name;
    /// [`Error::Unresolvable`] when no factory is attached or the factory
    /// does not know the name.
    pub fn add_name(mut self, name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::InvalidMiddleware(
                "middleware name must not be empty".to_owned(),
            ));
        }
        let resolved = self
            .factory
            .as_ref()
            .and_then(|factory| factory.resolve(name))
            .ok_or_else(|| Error::Unresolvable(name.to_owned()))?;
        self.push(resolved);
        Ok(self)
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs `req` through the chain.
    pub async fn handle(&self, req: Request) -> Response {
        let chain = chain::assemble(&self.entries, &self.fallback);
        chain.handle(req).await
    }

    fn push(&mut self, middleware: Arc<dyn Middleware>) {
        let entry = Entry::new(middleware);
        debug!(
            priority = entry.priority(),
            registered = self.entries.len() + 1,
            "middleware added"
        );
        self.entries.push(entry);
        // Stable sort: entries with equal priority keep their registration
        // order however often the list is re-sorted.
        self.entries.sort_by_key(|entry| Reverse(entry.priority()));
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports the pipeline's shape: entry priorities in execution order and
/// whether a factory is attached.
impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let priorities: Vec<i32> = self.entries.iter().map(Entry::priority).collect();
        f.debug_struct("Pipeline")
            .field("priorities", &priorities)
            .field("factory", &self.factory.is_some())
            .finish_non_exhaustive()
    }
}

/// A pipeline is itself a handler, so pipelines nest: one can serve as
/// another's fallback, and [`Server::serve`](crate::Server::serve) takes
/// one directly.
#[async_trait]
impl Handler for Pipeline {
    async fn handle(&self, req: Request) -> Response {
        Pipeline::handle(self, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::chain::Next;
    use crate::registry::Registry;

    struct Fixed {
        priority: i32,
    }

    #[async_trait]
    impl Middleware for Fixed {
        async fn process(&self, req: Request, next: Next) -> Response {
            next.handle(req).await
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    struct ApiOnly;

    #[async_trait]
    impl Middleware for ApiOnly {
        async fn process(&self, req: Request, next: Next) -> Response {
            next.handle(req).await
        }

        fn route(&self) -> Option<Route> {
            Some(Route::new("api/*").methods(["GET", "POST"]))
        }
    }

    struct HeaderGated;

    #[async_trait]
    impl Middleware for HeaderGated {
        async fn process(&self, req: Request, next: Next) -> Response {
            next.handle(req).await
        }

        fn should_execute(&self, req: &Request) -> bool {
            req.header("x-feature").is_some()
        }
    }

    struct GatedApi;

    #[async_trait]
    impl Middleware for GatedApi {
        async fn process(&self, req: Request, next: Next) -> Response {
            next.handle(req).await
        }

        fn route(&self) -> Option<Route> {
            Some(Route::new("api/*"))
        }

        fn should_execute(&self, req: &Request) -> bool {
            req.header("x-feature").is_some()
        }
    }

    #[test]
    fn entry_without_declarations_always_executes() {
        let entry = Entry::new(Arc::new(Fixed { priority: 0 }));
        assert_eq!(entry.priority(), 0);
        assert!(entry.should_execute(&Request::get("/any/path")));
        assert!(entry.should_execute(&Request::post("/other")));
    }

    #[test]
    fn entry_snapshots_the_declared_priority() {
        let entry = Entry::new(Arc::new(Fixed { priority: 100 }));
        assert_eq!(entry.priority(), 100);
    }

    #[test]
    fn entry_route_gate_checks_path_and_method() {
        let entry = Entry::new(Arc::new(ApiOnly));
        assert!(entry.should_execute(&Request::get("/api/users")));
        assert!(entry.should_execute(&Request::post("/api/users")));
        assert!(!entry.should_execute(&Request::get("/public/index")));
        assert!(!entry.should_execute(&Request::new(
            http::Method::DELETE,
            "/api/users"
        )));
    }

    #[test]
    fn entry_condition_gate_is_per_request() {
        let entry = Entry::new(Arc::new(HeaderGated));
        assert!(entry.should_execute(&Request::get("/").with_header("x-feature", "on")));
        assert!(!entry.should_execute(&Request::get("/")));
    }

    #[test]
    fn both_gates_must_open() {
        let entry = Entry::new(Arc::new(GatedApi));
        let on = |path: &str| Request::get(path).with_header("x-feature", "on");

        assert!(entry.should_execute(&on("/api/users")));
        assert!(!entry.should_execute(&on("/public/index")));
        assert!(!entry.should_execute(&Request::get("/api/users")));
    }

    #[test]
    fn entries_sort_by_priority_descending() {
        let pipeline = Pipeline::new()
            .add(Fixed { priority: -50 })
            .add(Fixed { priority: 100 })
            .add(Fixed { priority: 0 });

        let priorities: Vec<i32> = pipeline.entries.iter().map(Entry::priority).collect();
        assert_eq!(priorities, [100, 0, -50]);
    }

    #[test]
    fn len_tracks_registrations() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());

        let pipeline = pipeline.add(Fixed { priority: 0 }).add(ApiOnly);
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn debug_reports_priorities_and_factory() {
        let pipeline = Pipeline::new()
            .add(Fixed { priority: 10 })
            .add(Fixed { priority: -5 });
        let rendered = format!("{pipeline:?}");
        assert!(rendered.contains("priorities: [10, -5]"));
        assert!(rendered.contains("factory: false"));

        let with_factory = Pipeline::new().factory(Registry::new());
        assert!(format!("{with_factory:?}").contains("factory: true"));
    }

    #[test]
    fn add_name_rejects_the_empty_name() {
        let err = Pipeline::new().add_name("").unwrap_err();
        assert!(matches!(err, Error::InvalidMiddleware(_)));
    }

    #[test]
    fn add_name_without_a_factory_is_unresolvable() {
        let err = Pipeline::new().add_name("auth").unwrap_err();
        assert!(matches!(err, Error::Unresolvable(name) if name == "auth"));
    }

    #[test]
    fn add_name_resolves_through_the_factory() {
        let registry = Registry::new().register("fixed", || Fixed { priority: 7 });
        let pipeline = Pipeline::new()
            .factory(registry)
            .add_name("fixed")
            .unwrap();

        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.entries[0].priority(), 7);
    }

    #[test]
    fn add_name_unknown_name_is_unresolvable() {
        let registry = Registry::new().register("fixed", || Fixed { priority: 7 });
        let err = Pipeline::new()
            .factory(registry)
            .add_name("missing")
            .unwrap_err();
        assert!(matches!(err, Error::Unresolvable(name) if name == "missing"));
    }

    #[tokio::test]
    async fn empty_pipeline_answers_ok_with_empty_body() {
        let res = Pipeline::new().handle(Request::get("/whatever")).await;
        assert_eq!(res.status_code(), http::StatusCode::OK);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn custom_fallback_replaces_the_default() {
        let pipeline = Pipeline::new().fallback(|_req: Request| async {
            Response::text("not found").with_status(http::StatusCode::NOT_FOUND)
        });

        let res = pipeline.handle(Request::get("/nope")).await;
        assert_eq!(res.status_code(), http::StatusCode::NOT_FOUND);
        assert_eq!(res.body(), &b"not found"[..]);
    }
}
