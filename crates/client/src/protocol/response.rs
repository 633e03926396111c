use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::body::Termination;
use crate::redirect::Hop;

/// A completed response of one hop.
///
/// The raw body is kept exactly as received, it is never decoded to text here.
/// `parsed` is only present when a content parser ran and succeeded.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    raw_body: Bytes,
    parsed: Option<Value>,
    termination: Termination,
    redirects: Vec<Hop>,
}

impl ResponseRecord {
    pub(crate) fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap, raw_body: Bytes, termination: Termination) -> Self {
        Self { method, url, status, headers, raw_body, parsed: None, termination, redirects: Vec::new() }
    }

    pub(crate) fn set_parsed(&mut self, parsed: Value) {
        self.parsed = Some(parsed);
    }

    pub(crate) fn set_redirects(&mut self, redirects: Vec<Hop>) {
        self.redirects = redirects;
    }

    /// The method this hop was issued with.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The url this hop was issued to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    pub fn parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    /// How the body stream terminated. [`Termination::Close`] means no `end` signal was seen.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// The hops that led to this response, oldest first. Empty when no redirect was followed.
    pub fn redirects(&self) -> &[Hop] {
        &self.redirects
    }

    /// The url the logical request was originally issued to.
    pub fn original_url(&self) -> &Url {
        self.redirects.first().map_or(&self.url, Hop::url)
    }
}
