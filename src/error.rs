//! Unified error type.

use thiserror::Error;

/// The error type returned by strate's fallible operations.
///
/// Only registration and transport can fail. Execution-time failures inside
/// a middleware are that middleware's business — the pipeline neither
/// catches nor translates them. If you want an error-to-status policy, put
/// an error-handling middleware at the head of the chain.
///
/// Malformed route patterns are deliberately *not* an error: a pattern that
/// looks like a regex but does not compile degrades to a literal glob, and a
/// pattern that matches nothing is an admissible outcome.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// [`add_name`](crate::Pipeline::add_name) was given an empty identifier.
    #[error("invalid middleware: {0}")]
    InvalidMiddleware(String),

    /// [`add_name`](crate::Pipeline::add_name) was given an identifier no
    /// factory can resolve.
    #[error("no middleware registered under `{0}`")]
    Unresolvable(String),

    /// Binding the listener or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
