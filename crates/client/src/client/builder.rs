use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::USER_AGENT;
use http::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::debug;

use crate::VERSION;
use crate::client::{Client, ClientInner, header_pair};
use crate::config::ClientConfig;
use crate::orchestrator::Orchestrator;
use crate::parser::ContentParser;
use crate::redirect::RedirectPolicy;
use crate::transport::Transport;
use crate::utils::merge_headers;

const DEFAULT_USER_AGENT: &str = concat!("micro-client/", env!("CARGO_PKG_VERSION"));

/// Builds a [`Client`].
///
/// Only the transport is mandatory. Every other setting has a default:
///
/// - `User-Agent: micro-client/<version>`
/// - no timeout
/// - redirects are followed, at most [`RedirectPolicy::DEFAULT_MAX_REDIRECTS`] of them
/// - no content parser
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    headers: HeaderMap,
    timeout: Option<Duration>,
    follow_redirect: Option<bool>,
    max_redirects: usize,
    content_parser: Option<Arc<dyn ContentParser>>,
    error: Option<ClientBuildError>,
}

#[derive(Error, Debug)]
pub enum ClientBuildError {
    #[error("transport must be set")]
    MissingTransport,
    #[error("invalid client header: {reason}")]
    InvalidHeader { reason: String },
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            transport: None,
            headers,
            timeout: None,
            follow_redirect: None,
            max_redirects: RedirectPolicy::DEFAULT_MAX_REDIRECTS,
            content_parser: None,
            error: None,
        }
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a client-level header, replacing any previous value of the same name.
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
            Err(e) => {
                self.error.get_or_insert(ClientBuildError::InvalidHeader { reason: e.to_string() });
            }
        }
        self
    }

    /// Merges `headers` into the client-level headers, `headers` wins on key collision.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = merge_headers(&self.headers, &headers);
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

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn content_parser(mut self, content_parser: impl ContentParser + 'static) -> Self {
        self.content_parser = Some(Arc::new(content_parser));
        self
    }

    /// Applies every setting present in `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        if let Some(timeout) = config.timeout() {
            self.timeout = Some(timeout);
        }
        if let Some(follow_redirect) = config.follow_redirect {
            self.follow_redirect = Some(follow_redirect);
        }
        if let Some(max_redirects) = config.max_redirects {
            self.max_redirects = max_redirects;
        }
        config.headers.into_iter().fold(self, |builder, (key, value)| builder.header(key, value))
    }

    pub fn build(self) -> Result<Client, ClientBuildError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let transport = self.transport.ok_or(ClientBuildError::MissingTransport)?;

        debug!(version = VERSION, headers = self.headers.len(), timeout = ?self.timeout, max_redirects = self.max_redirects, "build client");

        let orchestrator = Orchestrator::new(transport).with_headers(self.headers).with_max_redirects(self.max_redirects);
        Ok(Client {
            inner: Arc::new(ClientInner {
                orchestrator,
                timeout: self.timeout,
                follow_redirect: self.follow_redirect,
                content_parser: self.content_parser,
            }),
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("transport", &self.transport.is_some())
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("follow_redirect", &self.follow_redirect)
            .field("max_redirects", &self.max_redirects)
            .field("content_parser", &self.content_parser.is_some())
            .field("error", &self.error)
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
