//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request.
///
/// The pipeline treats this as an opaque value: it reads the path and method
/// for admission gating and otherwise hands the request through unchanged.
/// Middleware own the request for the duration of their frame and may modify
/// it before delegating to [`Next`](crate::Next).
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Builds a request with no headers and an empty body.
    ///
    /// # Panics
    ///
    /// Panics if `uri` is not a valid URI.
    pub fn new(method: Method, uri: &str) -> Self {
        let uri: Uri = uri.parse().expect("invalid request uri");
        Self { method, uri, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// `GET` request shorthand. See [`Request::new`].
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// `POST` request shorthand. See [`Request::new`].
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Returns `self` with the header appended.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header name or value.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name: http::HeaderName = name.parse().expect("invalid header name");
        let value: http::HeaderValue = value.parse().expect("invalid header value");
        self.headers.append(name, value);
        self
    }

    /// Returns `self` with the body replaced.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, body }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request path, as sent by the client.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Case-insensitive header lookup. Returns the first value, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
