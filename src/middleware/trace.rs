//! Built-in request logging.

use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use crate::chain::Next;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Emits one `info` line per request: method, path, response status and
/// latency in milliseconds.
///
/// Latency is measured around everything below this middleware in the
/// chain, so place it with [`Trace::with_priority`]: a high priority times
/// the whole pipeline, a low one times just the fallback.
///
/// ```rust
/// use strate::{middleware::Trace, Pipeline};
///
/// let pipeline = Pipeline::new().add(Trace::new().with_priority(100));
/// ```
pub struct Trace {
    priority: i32,
}

impl Trace {
    pub fn new() -> Self {
        Self { priority: 0 }
    }

    /// Sets where the timer sits in the chain. Higher wraps more.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Middleware for Trace {
    async fn process(&self, req: Request, next: Next) -> Response {
        let method = req.method().clone();
        let path = req.path().to_owned();
        let start = Instant::now();

        let response = next.handle(req).await;

        info!(
            method = %method,
            path,
            status = response.status_code().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request"
        );
        response
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
