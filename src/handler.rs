//! The [`Handler`] trait and the default fallback.
//!
//! A handler is anything that can turn a [`Request`] into a [`Response`]
//! on its own — no delegation, no `next`. Handlers terminate a pipeline:
//! the fallback is a handler, [`Next`](crate::Next) presents the remaining
//! chain as one, and a whole [`Pipeline`](crate::Pipeline) is one too, which
//! is what lets pipelines nest and plug straight into
//! [`Server::serve`](crate::Server::serve).
//!
//! You rarely implement this trait by hand. Any `async fn` with the
//! signature below is a handler through the blanket impl:
//!
//! ```text
//! async fn name(req: Request) -> impl IntoResponse
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A request-to-response endpoint.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, req: Request) -> Response;
}

/// Any `Fn(Request) -> Future` is a handler: named `async fn` items,
/// closures returning async blocks, or structs implementing `Fn`.
#[async_trait]
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    async fn handle(&self, req: Request) -> Response {
        (self)(req).await.into_response()
    }
}

/// The default fallback: an empty `200 OK`, whatever the request.
///
/// Installed by [`Pipeline::new`](crate::Pipeline::new); replace it with
/// [`Pipeline::fallback`](crate::Pipeline::fallback).
pub async fn empty_ok(_req: Request) -> Response {
    Response::new()
}
