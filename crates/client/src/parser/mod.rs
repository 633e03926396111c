//! Content parsers.
//!
//! A content parser turns the raw body of a response into structured data before the
//! response is classified. Parsed data is represented as a [`serde_json::Value`].
//!
//! If parsing fails, the response produces a single `error` event and no status events.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::protocol::BoxError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentParser: Send + Sync {
    /// Parses a raw body. Called at most once per response.
    async fn parse(&self, raw: Bytes) -> Result<Value, BoxError>;
}

/// Parses the body as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

#[async_trait]
impl ContentParser for JsonParser {
    async fn parse(&self, raw: Bytes) -> Result<Value, BoxError> {
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Decodes the body as UTF-8 text, producing a [`Value::String`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TextParser;

#[async_trait]
impl ContentParser for TextParser {
    async fn parse(&self, raw: Bytes) -> Result<Value, BoxError> {
        let text = std::str::from_utf8(&raw)?;
        Ok(Value::String(text.to_owned()))
    }
}

/// a [`ContentParser`] backed by an async fn
pub struct ParserFn<F> {
    f: F,
}

impl<F> fmt::Debug for ParserFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParserFn")
    }
}

#[async_trait]
impl<F, Fut, E> ContentParser for ParserFn<F>
where
    F: Fn(Bytes) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, E>> + Send,
    E: Into<BoxError>,
{
    async fn parse(&self, raw: Bytes) -> Result<Value, BoxError> {
        (self.f)(raw).await.map_err(Into::into)
    }
}

pub fn parser_fn<F, Fut, E>(f: F) -> ParserFn<F>
where
    F: Fn(Bytes) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, E>> + Send,
    E: Into<BoxError>,
{
    ParserFn { f }
}
