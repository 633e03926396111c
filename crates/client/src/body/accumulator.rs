use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, error, trace, warn};

use crate::protocol::ClientError;
use crate::transport::{Chunk, SignalStream, StreamSignal};

/// How a body stream terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An explicit end-of-body signal
    End,
    /// The connection closed (or the stream ran dry) without an end-of-body signal
    Close,
}

/// Completion state of a [`BodyAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Pending,
    Completed,
    Failed,
}

/// Buffers the chunks of one response body.
///
/// The accumulator completes at most once: whichever of `end` or `close` arrives first
/// produces the body, every later termination signal is ignored.
#[derive(Debug)]
pub struct BodyAccumulator {
    chunks: Vec<Bytes>,
    length: usize,
    completion: Completion,
}

impl Default for BodyAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyAccumulator {
    pub fn new() -> Self {
        Self { chunks: Vec::new(), length: 0, completion: Completion::Pending }
    }

    /// Buffers a chunk.
    ///
    /// Text chunks are rejected with [`ClientError::MalformedChunk`] and fail the accumulator.
    /// Chunks arriving after completion or failure are dropped.
    pub fn push(&mut self, chunk: Chunk) -> Result<(), ClientError> {
        if self.completion != Completion::Pending {
            trace!(completion = ?self.completion, "drop chunk received after completion");
            return Ok(());
        }

        match chunk {
            Chunk::Bytes(bytes) => {
                self.length += bytes.len();
                self.chunks.push(bytes);
                Ok(())
            }
            Chunk::Text(text) => {
                error!(len = text.len(), "received a text chunk, body chunks must be bytes");
                self.fail();
                Err(ClientError::MalformedChunk { len: text.len() })
            }
        }
    }

    /// Marks the accumulation as failed and discards everything buffered so far.
    pub fn fail(&mut self) {
        self.completion = Completion::Failed;
        self.chunks.clear();
        self.length = 0;
    }

    /// Concatenates the buffered chunks into the raw body.
    ///
    /// Returns `Some` only for the first termination signal of a pending accumulator.
    pub fn finish(&mut self, termination: Termination) -> Option<Bytes> {
        if self.completion != Completion::Pending {
            trace!(?termination, completion = ?self.completion, "ignore duplicated termination signal");
            return None;
        }
        self.completion = Completion::Completed;

        if termination == Termination::Close {
            warn!(length = self.length, "body stream closed without an end signal, treat as completed");
        }

        let chunk_count = self.chunks.len();
        let body = match chunk_count {
            0 => Bytes::new(),
            1 => self.chunks.pop().unwrap_or_default(),
            _ => {
                let mut buf = BytesMut::with_capacity(self.length);
                for chunk in self.chunks.drain(..) {
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        };

        debug!(chunks = chunk_count, length = body.len(), "body accumulated");
        Some(body)
    }

    pub fn completion(&self) -> Completion {
        self.completion
    }

    /// Number of bytes buffered so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Drives a body stream to its first termination and returns the raw body.
///
/// A stream that runs dry without any termination signal counts as [`Termination::Close`].
pub async fn accumulate(mut stream: SignalStream) -> Result<(Bytes, Termination), ClientError> {
    let mut accumulator = BodyAccumulator::new();

    let termination = loop {
        match stream.next().await {
            Some(StreamSignal::Data(chunk)) => accumulator.push(chunk)?,
            Some(StreamSignal::End) => break Termination::End,
            Some(StreamSignal::Close) | None => break Termination::Close,
            Some(StreamSignal::Error(e)) => {
                error!(cause = %e, buffered = accumulator.len(), "body stream failed");
                accumulator.fail();
                return Err(e.into());
            }
        }
    };

    let body = accumulator.finish(termination).unwrap_or_default();
    Ok((body, termination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TransportError;
    use futures::stream;

    fn bytes(s: &'static str) -> Chunk {
        Chunk::Bytes(Bytes::from_static(s.as_bytes()))
    }

    #[test]
    fn concatenates_chunks_in_order() {
        let mut accumulator = BodyAccumulator::new();
        for chunk in ["ab", "cd", "ef"] {
            accumulator.push(bytes(chunk)).unwrap();
        }
        assert_eq!(accumulator.len(), 6);

        let body = accumulator.finish(Termination::End).unwrap();
        assert_eq!(&body[..], b"abcdef");
        assert_eq!(accumulator.completion(), Completion::Completed);
    }

    #[test]
    fn close_after_end_has_no_effect() {
        let mut accumulator = BodyAccumulator::new();
        accumulator.push(bytes("ab")).unwrap();

        assert!(accumulator.finish(Termination::End).is_some());
        assert!(accumulator.finish(Termination::Close).is_none());
        assert!(accumulator.finish(Termination::End).is_none());
    }

    #[test]
    fn close_without_end_completes_once() {
        let mut accumulator = BodyAccumulator::new();
        accumulator.push(bytes("ab")).unwrap();

        let body = accumulator.finish(Termination::Close).unwrap();
        assert_eq!(&body[..], b"ab");
        assert!(accumulator.finish(Termination::End).is_none());
    }

    #[test]
    fn text_chunk_fails_fast() {
        let mut accumulator = BodyAccumulator::new();
        accumulator.push(bytes("ab")).unwrap();

        let err = accumulator.push(Chunk::Text("cd".to_string())).unwrap_err();
        assert!(matches!(err, ClientError::MalformedChunk { len: 2 }));
        assert_eq!(accumulator.completion(), Completion::Failed);
        assert!(accumulator.is_empty());
        assert!(accumulator.finish(Termination::End).is_none());
    }

    #[test]
    fn empty_body() {
        let mut accumulator = BodyAccumulator::new();
        let body = accumulator.finish(Termination::End).unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn accumulate_stops_at_first_termination() {
        let signals = vec![
            StreamSignal::Data(bytes("ab")),
            StreamSignal::Data(bytes("cd")),
            StreamSignal::Data(bytes("ef")),
            StreamSignal::End,
            StreamSignal::Close,
        ];

        let (body, termination) = accumulate(stream::iter(signals).boxed()).await.unwrap();
        assert_eq!(&body[..], b"abcdef");
        assert_eq!(termination, Termination::End);
    }

    #[tokio::test]
    async fn accumulate_reports_close_without_end() {
        let signals = vec![StreamSignal::Data(bytes("ab")), StreamSignal::Close];

        let (body, termination) = accumulate(stream::iter(signals).boxed()).await.unwrap();
        assert_eq!(&body[..], b"ab");
        assert_eq!(termination, Termination::Close);
    }

    #[tokio::test]
    async fn accumulate_treats_exhausted_stream_as_close() {
        let signals = vec![StreamSignal::Data(bytes("ab"))];

        let (_, termination) = accumulate(stream::iter(signals).boxed()).await.unwrap();
        assert_eq!(termination, Termination::Close);
    }

    #[tokio::test]
    async fn accumulate_surfaces_transport_errors() {
        let signals = vec![StreamSignal::Data(bytes("ab")), StreamSignal::Error(TransportError::PrematureClose), StreamSignal::End];

        let err = accumulate(stream::iter(signals).boxed()).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { source: TransportError::PrematureClose }));
    }

    #[tokio::test]
    async fn accumulate_rejects_text_chunks() {
        let signals = vec![StreamSignal::Data(Chunk::Text("ab".to_string())), StreamSignal::End];

        let err = accumulate(stream::iter(signals).boxed()).await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedChunk { .. }));
    }
}
