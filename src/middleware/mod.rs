//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, request-id injection,
//! authentication, response decoration.
//!
//! A middleware declares three optional things about itself, read once when
//! it is registered:
//!
//! - a **priority** ([`Middleware::priority`], default 0) — higher runs
//!   earlier, i.e. outermost in the chain;
//! - a **route restriction** ([`Middleware::route`]) — a [`Route`] pattern
//!   plus method allowlist the request must match;
//! - a **dynamic condition** ([`Middleware::should_execute`]) — a
//!   per-request predicate, checked before the route.
//!
//! All three default to "no restriction". A middleware whose gates do not
//! open for a request is skipped whole: its `process` is never called, the
//! request flows to the next entry exactly as if the middleware were not
//! registered.
//!
//! Built-in middleware:
//! - [`Trace`] — one log line per request with method, path, status, latency

use std::future::Future;

use async_trait::async_trait;

use crate::chain::Next;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;

mod trace;

pub use trace::Trace;

/// A unit of request/response processing in the pipeline.
///
/// `process` owns the request and decides what to do with the rest of the
/// chain: delegate with [`Next::handle`] (and optionally transform the
/// returned response), or short-circuit by answering without delegating —
/// which prevents every lower-priority middleware and the fallback from
/// running.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use http::StatusCode;
/// use strate::{Middleware, Next, Request, Response, Route};
///
/// struct RequireApiKey;
///
/// #[async_trait]
/// impl Middleware for RequireApiKey {
///     async fn process(&self, req: Request, next: Next) -> Response {
///         if req.header("x-api-key").is_none() {
///             return Response::status(StatusCode::UNAUTHORIZED);
///         }
///         next.handle(req).await
///     }
///
///     // Only guard the API surface, and run early.
///     fn route(&self) -> Option<Route> {
///         Some(Route::new("api/**").methods(["GET", "POST", "PUT", "DELETE"]))
///     }
///
///     fn priority(&self) -> i32 {
///         50
///     }
/// }
/// ```
///
/// Simple middleware can be written as closures — any
/// `Fn(Request, Next) -> Future<Output = Response>` qualifies, with the
/// default (unrestricted) gates and priority 0:
///
/// ```rust
/// use strate::{Next, Pipeline, Request};
///
/// let pipeline = Pipeline::new().add(|req: Request, next: Next| async move {
///     next.handle(req).await.with_header("x-powered-by", "strate")
/// });
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Runs this middleware's logic around the rest of the chain.
    async fn process(&self, req: Request, next: Next) -> Response;

    /// Declared ordering key: higher runs earlier (outermost). Read once at
    /// registration.
    fn priority(&self) -> i32 {
        0
    }

    /// Declared route restriction. Read once at registration; `None` means
    /// the middleware runs for every path and method.
    fn route(&self) -> Option<Route> {
        None
    }

    /// Per-request gate, evaluated before the route restriction on every
    /// request. Returning `false` skips the middleware for this request
    /// without breaking the chain.
    fn should_execute(&self, _req: &Request) -> bool {
        true
    }
}

/// Any `Fn(Request, Next) -> Future<Output = Response>` is a middleware.
#[async_trait]
impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn process(&self, req: Request, next: Next) -> Response {
        (self)(req, next).await
    }
}
