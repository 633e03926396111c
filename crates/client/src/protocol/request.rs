use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use crate::ensure;
use crate::parser::ContentParser;
use crate::protocol::ClientError;

/// The methods the client issues requests with.
pub const SUPPORTED_METHODS: [Method; 5] = [Method::GET, Method::PUT, Method::POST, Method::DELETE, Method::HEAD];

/// Everything needed to run one request attempt.
///
/// A descriptor is immutable once an attempt begins. Following a redirect does not
/// modify it; [`RequestDescriptor::redirected`] derives a new descriptor that shares
/// headers and payload but targets a new url, possibly with a new method.
#[derive(Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    headers: HeaderMap,
    payload: Option<Bytes>,
    timeout: Option<Duration>,
    follow_redirect: Option<bool>,
    content_parser: Option<Arc<dyn ContentParser>>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Result<Self, ClientError> {
        ensure!(SUPPORTED_METHODS.contains(&method), ClientError::UnsupportedMethod(method));
        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            payload: None,
            timeout: None,
            follow_redirect: None,
            content_parser: None,
        })
    }

    pub fn parse(method: Method, url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(url).map_err(|e| ClientError::invalid_url(url, e))?;
        Self::new(method, parsed)
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Option<Bytes>) -> Self {
        self.payload = payload;
        self
    }

    /// A zero duration means no deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|timeout| !timeout.is_zero());
        self
    }

    #[must_use]
    pub fn with_follow_redirect(mut self, follow_redirect: Option<bool>) -> Self {
        self.follow_redirect = follow_redirect;
        self
    }

    #[must_use]
    pub fn with_content_parser(mut self, content_parser: Option<Arc<dyn ContentParser>>) -> Self {
        self.content_parser = content_parser;
        self
    }

    /// Derives the descriptor of the next hop of a redirect chain.
    #[must_use]
    pub fn redirected(&self, method: Method, url: Url) -> Self {
        Self { method, url, ..self.clone() }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The follow flag; only an explicit `Some(false)` disables following redirects.
    pub fn follow_redirect(&self) -> Option<bool> {
        self.follow_redirect
    }

    pub fn content_parser(&self) -> Option<&Arc<dyn ContentParser>> {
        self.content_parser.as_ref()
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("payload_len", &self.payload.as_ref().map(Bytes::len))
            .field("timeout", &self.timeout)
            .field("follow_redirect", &self.follow_redirect)
            .field("content_parser", &self.content_parser.is_some())
            .finish()
    }
}
