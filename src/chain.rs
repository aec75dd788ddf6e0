//! Chain assembly.
//!
//! A pipeline run is a chain of [`Link`]s built back to front: starting
//! from the fallback handler, each registered middleware is wrapped around
//! what has been built so far, so the highest-priority entry ends up
//! outermost. Gates are checked per link at call time; a closed gate makes
//! the link transparent and the request flows on untouched.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::handler::Handler;
use crate::pipeline::Entry;
use crate::request::Request;
use crate::response::Response;

/// A handle onto the remainder of the chain.
///
/// Passed to [`Middleware::process`](crate::Middleware::process); calling
/// [`handle`](Next::handle) runs everything below the current middleware
/// and yields the response on the way back up. Not calling it
/// short-circuits the chain.
pub struct Next {
    inner: Arc<dyn Handler>,
}

impl Next {
    pub(crate) fn new(inner: Arc<dyn Handler>) -> Self {
        Self { inner }
    }

    /// Delegates to the rest of the chain.
    pub async fn handle(&self, req: Request) -> Response {
        self.inner.handle(req).await
    }
}

/// One middleware wrapped around the rest of the chain.
struct Link {
    entry: Entry,
    rest: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Link {
    async fn handle(&self, req: Request) -> Response {
        if self.entry.should_execute(&req) {
            let next = Next::new(Arc::clone(&self.rest));
            self.entry.middleware().process(req, next).await
        } else {
            trace!(path = req.path(), "middleware skipped");
            self.rest.handle(req).await
        }
    }
}

/// Folds `entries` (already sorted highest priority first) around the
/// fallback, innermost first.
pub(crate) fn assemble(entries: &[Entry], fallback: &Arc<dyn Handler>) -> Arc<dyn Handler> {
    let mut chain = Arc::clone(fallback);
    for entry in entries.iter().rev() {
        chain = Arc::new(Link {
            entry: entry.clone(),
            rest: chain,
        });
    }
    chain
}
