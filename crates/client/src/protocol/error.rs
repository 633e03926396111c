use std::error::Error;
use std::io;
use std::time::Duration;

use http::Method;
use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failure reported by a [`Transport`](crate::transport::Transport) while a call is in flight.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect error: {reason}")]
    Connect { reason: String },

    #[error("connection closed before the response completed")]
    PrematureClose,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("transport error: {source}")]
    Other { source: BoxError },
}

impl TransportError {
    pub fn connect<S: ToString>(str: S) -> Self {
        Self::Connect { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn other<E: Into<BoxError>>(e: E) -> Self {
        Self::Other { source: e.into() }
    }
}

/// Terminal failure of one request attempt, delivered through the `error` event.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported http method: {0}")]
    UnsupportedMethod(Method),

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("failed to encode request payload: {source}")]
    Encode { source: BoxError },

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: TransportError,
    },

    #[error("HTTP timeout was triggered after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("malformed chunk: expected a byte sequence, received text of {len} bytes")]
    MalformedChunk { len: usize },

    #[error("invalid status code {0}, expected 100..=599")]
    InvalidStatus(u16),

    #[error("content parse error: {source}")]
    ContentParse { source: BoxError },

    #[error("redirect response {status} has no location header")]
    MissingLocation { status: u16 },

    #[error("invalid redirect location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("too many redirects, the limit is {max}")]
    TooManyRedirects { max: usize },
}

impl ClientError {
    pub fn invalid_url<S: ToString>(url: S, source: url::ParseError) -> Self {
        Self::InvalidUrl { url: url.to_string(), source }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn encode<E: Into<BoxError>>(e: E) -> Self {
        Self::Encode { source: e.into() }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    pub fn content_parse<E: Into<BoxError>>(e: E) -> Self {
        Self::ContentParse { source: e.into() }
    }

    pub fn invalid_location<L: ToString, S: ToString>(location: L, reason: S) -> Self {
        Self::InvalidLocation { location: location.to_string(), reason: reason.to_string() }
    }

    pub fn too_many_redirects(max: usize) -> Self {
        Self::TooManyRedirects { max }
    }

    /// Returns true if the attempt was aborted by the configured deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// Returns true if the failure came from the transport collaborator.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_differs_from_transport_message() {
        let timeout = ClientError::timeout(Duration::from_millis(250));
        let transport = ClientError::from(TransportError::connect("connection refused"));

        assert_eq!(timeout.to_string(), "HTTP timeout was triggered after 250ms");
        assert_eq!(transport.to_string(), "transport error: connect error: connection refused");
        assert!(timeout.is_timeout());
        assert!(!timeout.is_transport());
        assert!(transport.is_transport());
    }

    #[test]
    fn io_error_converts_into_transport_error() {
        let e = TransportError::io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(e, TransportError::Io { .. }));
    }
}
