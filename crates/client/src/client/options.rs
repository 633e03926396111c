use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::client::header_pair;
use crate::parser::ContentParser;
use crate::protocol::ClientError;

/// Per-call settings. Anything left unset falls back to the client-level value.
///
/// Invalid headers or payloads that fail to encode are not reported here; the request
/// then fails with a single `error` event once it is driven.
#[derive(Default, Clone)]
pub struct RequestOptions {
    pub(crate) headers: HeaderMap,
    pub(crate) payload: Option<Bytes>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) follow_redirect: Option<bool>,
    pub(crate) content_parser: Option<Arc<dyn ContentParser>>,
    error: Option<Arc<ClientError>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a call-level header. It wins over a client-level header of the same name.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        match header_pair(key, value) {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.fail(ClientError::invalid_header(e)),
        }
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// The raw request payload, sent as is.
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Encodes `form` as `application/x-www-form-urlencoded`, the default content type of a payload.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => self.payload = Some(Bytes::from(encoded)),
            Err(e) => self.fail(ClientError::encode(e)),
        }
        self
    }

    /// Encodes `json` as the payload and sets `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(encoded) => {
                self.payload = Some(Bytes::from(encoded));
                self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Err(e) => self.fail(ClientError::encode(e)),
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn follow_redirect(mut self, follow_redirect: bool) -> Self {
        self.follow_redirect = Some(follow_redirect);
        self
    }

    pub fn content_parser(mut self, content_parser: impl ContentParser + 'static) -> Self {
        self.content_parser = Some(Arc::new(content_parser));
        self
    }

    /// The first error recorded while the options were built.
    pub(crate) fn take_error(&mut self) -> Option<Arc<ClientError>> {
        self.error.take()
    }

    fn fail(&mut self, error: ClientError) {
        self.error.get_or_insert_with(|| Arc::new(error));
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("payload_len", &self.payload.as_ref().map(Bytes::len))
            .field("timeout", &self.timeout)
            .field("follow_redirect", &self.follow_redirect)
            .field("content_parser", &self.content_parser.is_some())
            .field("error", &self.error)
            .finish()
    }
}
