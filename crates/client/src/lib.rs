//! An asynchronous micro HTTP client that turns every response into a cascade of events.
//!
//! Instead of handing back a response for the caller to inspect, the client classifies
//! each completed response and notifies listeners at every granularity: the exact code
//! (`"404"`), the class (`"4XX"`), the reason name (`"not-found"`), the category
//! (`"http-client-error"`) and finally `"complete"`. Failures (invalid urls, transport
//! errors, timeouts, parser errors, broken redirects) produce a single `"error"` event.
//!
//! # Features
//!
//! - `get`, `put`, `post`, `del` and `head` with per-call options
//! - Client-level headers, timeout, redirect policy and content parser
//! - Redirect following for 301, 302 (same method) and 303 (`GET`), one listener
//!   registry for the whole chain
//! - A pluggable [`Transport`](transport::Transport), the client never opens sockets itself
//! - Pluggable content parsers, with JSON and text parsers bundled
//! - Events delivered to synchronous listeners, into any [`EventSink`](event::EventSink),
//!   or as a [`futures::Stream`]
//!
//! # Example
//!
//! ```no_run
//! use micro_client::transport::{Transport, TransportRequest, TransportResponse};
//! use micro_client::protocol::TransportError;
//! use micro_client::{Client, JsonParser, RequestOptions};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use http::{HeaderMap, StatusCode};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn call(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
//!         Ok(TransportResponse::from_chunks(StatusCode::OK, HeaderMap::new(), [Bytes::from_static(br#"{"id":7}"#)]))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder().transport(Canned).content_parser(JsonParser).build().unwrap();
//!
//!     let _ = client
//!         .get("http://example.test/users/7", RequestOptions::new())
//!         .on("success", |event| println!("user: {:?}", event.payload()))
//!         .on("http-error", |event| println!("failed with {}", event.kind()))
//!         .on("error", |event| println!("request error: {:?}", event.client_error()))
//!         .send()
//!         .await;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`body`]: accumulates the body signal stream into the raw body
//! - [`parser`]: optional transformation of the raw body into structured data
//! - [`classify`]: maps a status code to its ordered event cascade
//! - [`redirect`]: follows redirects, tracking every hop
//! - [`orchestrator`]: runs one logical request through all of the above
//! - [`client`]: the public entry point

pub mod body;
pub mod classify;
pub mod client;
pub mod config;
pub mod event;
pub mod orchestrator;
pub mod parser;
pub mod protocol;
pub mod redirect;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
pub use utils::merge_headers;

pub use client::{Client, ClientBuildError, ClientBuilder, RequestHandle, RequestOptions};
pub use config::ClientConfig;
pub use event::{Event, EventEmitter, EventFilter, EventKind, EventSink, EventStream, Payload};
pub use orchestrator::Outcome;
pub use parser::{ContentParser, JsonParser, TextParser, parser_fn};
pub use protocol::{ClientError, RequestDescriptor, ResponseRecord, TransportError};

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
