//! # strate
//!
//! A priority-ordered middleware pipeline for async HTTP services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your router dispatches, your proxy terminates TLS, your handlers hold
//! the business logic. strate owns the layer between: the ordered chain of
//! middleware every request passes through on the way in and every
//! response passes through on the way out.
//!
//! What strate intentionally leaves to the neighbours:
//!
//! - **Routing** — the fallback handler at the end of the chain is yours;
//!   put a router there
//! - **TLS, body limits, slow clients** — proxy territory
//! - **Error policy** — a middleware that fails, fails; catch failures
//!   where you want them caught by wrapping [`Next::handle`] in an
//!   outermost middleware
//!
//! What's left for strate — the part that changes between applications:
//!
//! - **Priority ordering** — higher runs earlier (outermost); equal
//!   priorities keep registration order
//! - **Gating** — glob or regex route patterns, method allowlists, and
//!   per-request conditions decide who runs, request by request
//! - **Chain execution** — middleware wrap each other around a fallback
//!   handler; not calling `next` short-circuits everything below
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use strate::{Next, Pipeline, Request, Response, Server, middleware::Trace};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Pipeline::new()
//!         .add(Trace::new().with_priority(100))
//!         .add(require_api_key)
//!         .fallback(|_req: Request| async { Response::text("hello") });
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn require_api_key(req: Request, next: Next) -> Response {
//!     if req.header("x-api-key").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.handle(req).await
//! }
//! ```

mod chain;
mod error;
mod handler;
mod pipeline;
mod registry;
mod request;
mod response;
mod route;
mod server;

pub mod middleware;

pub use chain::Next;
pub use error::Error;
pub use handler::{Handler, empty_ok};
pub use middleware::Middleware;
pub use pipeline::Pipeline;
pub use registry::{Factory, Registry};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use route::Route;
pub use server::Server;
