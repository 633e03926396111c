//! The transport collaborator.
//!
//! The client never opens sockets itself. A [`Transport`] takes a [`TransportRequest`]
//! and answers with the response status, headers and a stream of [`StreamSignal`]s
//! carrying the body. Anything able to do that (an `http` ecosystem client, an in-memory
//! fake, a recorded fixture) can drive the client.
//!
//! Transport implementations that keep I/O running outside of the returned future
//! should watch [`TransportRequest::abort`]: it is cancelled when the deadline of the
//! attempt elapses.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, future};
use http::{HeaderMap, Method, StatusCode};
use http_body::Body;
use http_body_util::BodyStream;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::protocol::{BoxError, TransportError};

/// The body of a response as a stream of signals.
pub type SignalStream = BoxStream<'static, StreamSignal>;

/// One piece of body data as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Raw bytes, the only accepted kind of chunk
    Bytes(Bytes),
    /// Already decoded text, rejected by the body accumulator
    Text(String),
}

/// An event of a response body stream.
#[derive(Debug)]
pub enum StreamSignal {
    /// A chunk of body data
    Data(Chunk),
    /// The body is complete
    End,
    /// The underlying connection closed
    Close,
    /// The transport failed while streaming the body
    Error(TransportError),
}

/// Parameters of a single transport call.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub payload: Option<Bytes>,
    pub timeout: Option<Duration>,
    pub abort: CancellationToken,
}

/// The response head and body stream returned by a transport call.
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: SignalStream,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: SignalStream) -> Self {
        Self { status, headers, body }
    }

    /// A response whose body stream replays the given signals.
    pub fn from_signals(status: StatusCode, headers: HeaderMap, signals: Vec<StreamSignal>) -> Self {
        Self::new(status, headers, stream::iter(signals).boxed())
    }

    /// A response whose body is the given byte chunks followed by an `End` signal.
    pub fn from_chunks<I>(status: StatusCode, headers: HeaderMap, chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut signals: Vec<StreamSignal> = chunks.into_iter().map(|bytes| StreamSignal::Data(Chunk::Bytes(bytes))).collect();
        signals.push(StreamSignal::End);
        Self::from_signals(status, headers, signals)
    }

    /// A response built from an [`http::Response`] whose body implements [`http_body::Body`].
    pub fn from_http<B>(response: http::Response<B>) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body_signals(body))
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse").field("status", &self.status).field("headers", &self.headers).finish_non_exhaustive()
    }
}

/// Converts an [`http_body::Body`] into a [`SignalStream`].
///
/// Data frames become `Data` signals, the end of the body becomes `End` and a body error
/// becomes `Error`. Trailers are dropped.
pub fn body_signals<B>(body: B) -> SignalStream
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let frames = BodyStream::new(body).filter_map(|frame| {
        future::ready(match frame {
            Ok(frame) => frame.into_data().ok().map(|bytes| StreamSignal::Data(Chunk::Bytes(bytes))),
            Err(e) => Some(StreamSignal::Error(TransportError::other(e))),
        })
    });

    frames.chain(stream::once(future::ready(StreamSignal::End))).boxed()
}

/// Issues requests on behalf of the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the call and resolves once the response head is available.
    async fn call(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn call(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).call(request).await
    }
}
