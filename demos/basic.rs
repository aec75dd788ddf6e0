//! Minimal strate example — a guarded JSON API behind a middleware chain.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/hello
//!   curl http://localhost:3000/api/users              # 401 — no key
//!   curl -H 'x-api-key: secret' http://localhost:3000/api/users
//!   curl -H 'x-debug: 1' http://localhost:3000/debug/whatever

use async_trait::async_trait;
use http::StatusCode;
use strate::{Middleware, Next, Pipeline, Request, Response, Route, Server, middleware::Trace};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Pipeline::new()
        .add(Trace::new().with_priority(100))
        .add(request_id)
        .add(ApiKey)
        .add(DebugEcho)
        .fallback(hello);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// Runs for every request at the default priority 0.
async fn request_id(req: Request, next: Next) -> Response {
    next.handle(req).await.with_header("x-request-id", "demo-1")
}

async fn hello(_req: Request) -> Response {
    Response::json(r#"{"message":"hello"}"#)
}

// Guards the API surface: runs early, only under /api, and answers 401
// itself when the key is missing — nothing below it sees the request.
struct ApiKey;

#[async_trait]
impl Middleware for ApiKey {
    async fn process(&self, req: Request, next: Next) -> Response {
        if req.header("x-api-key") != Some("secret") {
            return Response::status(StatusCode::UNAUTHORIZED);
        }
        next.handle(req).await
    }

    fn priority(&self) -> i32 {
        50
    }

    fn route(&self) -> Option<Route> {
        Some(Route::new("api/**").methods(["GET", "POST", "PUT", "DELETE"]))
    }
}

// Skipped entirely unless the client opts in with x-debug.
struct DebugEcho;

#[async_trait]
impl Middleware for DebugEcho {
    async fn process(&self, req: Request, _next: Next) -> Response {
        Response::json(format!(
            r#"{{"method":"{}","path":"{}"}}"#,
            req.method(),
            req.path()
        ))
    }

    fn route(&self) -> Option<Route> {
        Some(Route::new("debug/**"))
    }

    fn should_execute(&self, req: &Request) -> bool {
        req.header("x-debug").is_some()
    }
}
