//! The public client API.
//!
//! ```ignore
//! let client = Client::builder().transport(transport).timeout(Duration::from_secs(5)).build()?;
//!
//! let outcome = client
//!     .get("http://example.test/users/7", RequestOptions::new().content_parser(JsonParser))
//!     .on("success", |event| println!("user: {:?}", event.payload()))
//!     .on("4XX", |event| println!("client error: {}", event.kind()))
//!     .on("error", |event| println!("failed: {:?}", event.client_error()))
//!     .send()
//!     .await;
//! ```

mod builder;
mod handle;
mod options;

pub use builder::ClientBuildError;
pub use builder::ClientBuilder;
pub use handle::RequestHandle;
pub use options::RequestOptions;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderName, HeaderValue, Method};

use crate::orchestrator::Orchestrator;
use crate::parser::ContentParser;
use crate::protocol::{ClientError, RequestDescriptor};

/// An event-driven http client. Cloning is cheap, clones share their configuration.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    orchestrator: Orchestrator,
    timeout: Option<Duration>,
    follow_redirect: Option<bool>,
    content_parser: Option<Arc<dyn ContentParser>>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> RequestHandle {
        self.request(Method::GET, url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> RequestHandle {
        self.request(Method::PUT, url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> RequestHandle {
        self.request(Method::POST, url, options)
    }

    pub fn del(&self, url: &str, options: RequestOptions) -> RequestHandle {
        self.request(Method::DELETE, url, options)
    }

    pub fn head(&self, url: &str, options: RequestOptions) -> RequestHandle {
        self.request(Method::HEAD, url, options)
    }

    /// Prepares a request. An invalid url, an unsupported method or invalid options are
    /// reported through the `error` event once the handle is driven.
    pub fn request(&self, method: Method, url: &str, options: RequestOptions) -> RequestHandle {
        RequestHandle::new(self.clone(), self.describe(method, url, options))
    }

    fn describe(&self, method: Method, url: &str, mut options: RequestOptions) -> Result<RequestDescriptor, Arc<ClientError>> {
        if let Some(error) = options.take_error() {
            return Err(error);
        }

        let inner = &self.inner;
        let descriptor = RequestDescriptor::parse(method, url).map_err(Arc::new)?;
        Ok(descriptor
            .with_headers(options.headers)
            .with_payload(options.payload)
            .with_timeout(options.timeout.or(inner.timeout))
            .with_follow_redirect(options.follow_redirect.or(inner.follow_redirect))
            .with_content_parser(options.content_parser.or_else(|| inner.content_parser.clone())))
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("orchestrator", &self.inner.orchestrator)
            .field("timeout", &self.inner.timeout)
            .field("follow_redirect", &self.inner.follow_redirect)
            .field("content_parser", &self.inner.content_parser.is_some())
            .finish()
    }
}

pub(crate) fn header_pair<K, V>(key: K, value: V) -> Result<(HeaderName, HeaderValue), http::Error>
where
    HeaderName: TryFrom<K>,
    <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
    HeaderValue: TryFrom<V>,
    <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
{
    let name = HeaderName::try_from(key).map_err(Into::<http::Error>::into)?;
    let value = HeaderValue::try_from(value).map_err(Into::<http::Error>::into)?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;
    use futures::StreamExt;
    use http::header::LOCATION;
    use http::{HeaderMap, StatusCode};
    use serde_json::json;

    use crate::event::{Event, EventFilter, EventKind, Payload};
    use crate::parser::{JsonParser, TextParser};
    use crate::transport::{MockTransport, TransportResponse};

    fn respond(status: StatusCode, body: &'static str) -> TransportResponse {
        TransportResponse::from_chunks(status, HeaderMap::new(), [Bytes::from_static(body.as_bytes())])
    }

    fn client(transport: MockTransport) -> Client {
        Client::builder().transport(transport).build().unwrap()
    }

    /// Records the name of every event a handle's listener sees.
    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&Event) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event: &Event| sink.lock().unwrap().push(event.kind().to_string()))
    }

    #[tokio::test]
    async fn listeners_fire_at_every_granularity() {
        let mut transport = MockTransport::new();
        transport.expect_call().times(1).returning(|_| Ok(respond(StatusCode::NOT_FOUND, "missing")));

        let (exact, on_exact) = recorder();
        let (class, on_class) = recorder();
        let (reason, on_reason) = recorder();
        let (category, on_category) = recorder();
        let (all, on_all) = recorder();

        let response = client(transport)
            .get("http://a.test/nothing", RequestOptions::new())
            .on("404", on_exact)
            .on("4XX", on_class)
            .on("not-found", on_reason)
            .on(EventKind::HttpClientError, on_category)
            .on(EventFilter::Any, on_all)
            .send()
            .await
            .unwrap();

        assert_eq!(*exact.lock().unwrap(), vec!["404"]);
        assert_eq!(*class.lock().unwrap(), vec!["4XX"]);
        assert_eq!(*reason.lock().unwrap(), vec!["not-found"]);
        assert_eq!(*category.lock().unwrap(), vec!["http-client-error"]);
        assert_eq!(*all.lock().unwrap(), vec!["4XX", "404", "not-found", "http-error", "http-client-error", "complete"]);
        assert_eq!(response.raw_body(), "missing");
    }

    #[tokio::test]
    async fn invalid_url_is_an_error_event() {
        // no expectation: the transport must not be called
        let transport = MockTransport::new();
        let (seen, on_any) = recorder();

        let err = client(transport).get("not a url", RequestOptions::new()).on(EventFilter::Any, on_any).send().await.unwrap_err();

        assert_eq!(*seen.lock().unwrap(), vec!["error"]);
        assert!(matches!(*err, ClientError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn unsupported_method_is_an_error_event() {
        let (seen, on_any) = recorder();

        let err = client(MockTransport::new())
            .request(Method::PATCH, "http://a.test/", RequestOptions::new())
            .on(EventFilter::Any, on_any)
            .send()
            .await
            .unwrap_err();

        assert_eq!(*seen.lock().unwrap(), vec!["error"]);
        assert!(matches!(*err, ClientError::UnsupportedMethod(_)));
    }

    #[tokio::test]
    async fn invalid_option_is_an_error_event() {
        let (seen, on_error) = recorder();

        let err = client(MockTransport::new())
            .post("http://a.test/", RequestOptions::new().header("bad header", "1"))
            .on("error", on_error)
            .send()
            .await
            .unwrap_err();

        assert_eq!(*seen.lock().unwrap(), vec!["error"]);
        assert!(matches!(*err, ClientError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn verbs_map_to_methods() {
        let mut transport = MockTransport::new();
        for method in [Method::GET, Method::PUT, Method::POST, Method::DELETE, Method::HEAD] {
            transport.expect_call().withf(move |request| request.method == method).times(1).returning(|_| Ok(respond(StatusCode::OK, "")));
        }
        let client = client(transport);

        for handle in [
            client.get("http://a.test/", RequestOptions::new()),
            client.put("http://a.test/", RequestOptions::new()),
            client.post("http://a.test/", RequestOptions::new()),
            client.del("http://a.test/", RequestOptions::new()),
            client.head("http://a.test/", RequestOptions::new()),
        ] {
            handle.send().await.unwrap();
        }
    }

    #[tokio::test]
    async fn client_parser_applies_unless_overridden() {
        let mut transport = MockTransport::new();
        transport.expect_call().times(2).returning(|_| Ok(respond(StatusCode::OK, r#"{"a":1}"#)));

        let client = Client::builder().transport(transport).content_parser(JsonParser).build().unwrap();

        let parsed = client.get("http://a.test/", RequestOptions::new()).send().await.unwrap();
        assert_eq!(parsed.parsed(), Some(&json!({"a": 1})));

        let text = client.get("http://a.test/", RequestOptions::new().content_parser(TextParser)).send().await.unwrap();
        assert_eq!(text.parsed(), Some(&json!(r#"{"a":1}"#)));
    }

    #[tokio::test]
    async fn call_options_override_client_defaults() {
        let mut transport = MockTransport::new();
        transport
            .expect_call()
            .withf(|request| request.timeout == Some(Duration::from_millis(50)))
            .times(1)
            .returning(|_| {
                let mut headers = HeaderMap::new();
                headers.insert(LOCATION, HeaderValue::from_static("/elsewhere"));
                Ok(TransportResponse::from_chunks(StatusCode::FOUND, headers, []))
            });

        let client = Client::builder().transport(transport).timeout(Duration::from_secs(30)).follow_redirect(true).build().unwrap();

        let response = client
            .get("http://a.test/", RequestOptions::new().timeout(Duration::from_millis(50)).follow_redirect(false))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn client_follow_flag_is_the_fallback() {
        let mut transport = MockTransport::new();
        transport.expect_call().times(1).returning(|_| {
            let mut headers = HeaderMap::new();
            headers.insert(LOCATION, HeaderValue::from_static("/elsewhere"));
            Ok(TransportResponse::from_chunks(StatusCode::MOVED_PERMANENTLY, headers, []))
        });

        let client = Client::builder().transport(transport).follow_redirect(false).build().unwrap();
        let response = client.get("http://a.test/", RequestOptions::new()).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn dispatch_feeds_listeners_and_sink() {
        let mut transport = MockTransport::new();
        transport.expect_call().returning(|_| Ok(respond(StatusCode::OK, "hi")));
        let (seen, on_success) = recorder();

        let mut events: Vec<Event> = Vec::new();
        client(transport).get("http://a.test/", RequestOptions::new()).on("success", on_success).dispatch(&mut events).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["success"]);
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0].payload(), Payload::Body(body) if body == "hi"));
    }

    #[tokio::test]
    async fn spawned_request_streams_events() {
        let mut transport = MockTransport::new();
        transport.expect_call().returning(|_| Ok(respond(StatusCode::INTERNAL_SERVER_ERROR, "boom")));

        let mut stream = client(transport).post("http://a.test/", RequestOptions::new().payload("x=1")).spawn();

        let mut names = Vec::new();
        while let Some(event) = stream.next().await {
            names.push(event.kind().to_string());
        }

        assert_eq!(names, vec!["5XX", "500", "internal-server-error", "http-error", "http-server-error", "complete"]);
        let response = stream.outcome().await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct Stalled;

    #[async_trait::async_trait]
    impl crate::transport::Transport for Stalled {
        async fn call(&self, _request: crate::transport::TransportRequest) -> Result<TransportResponse, crate::TransportError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn aborted_stream_ends_without_events() {
        let client = Client::builder().transport(Stalled).build().unwrap();
        let mut stream = client.get("http://a.test/", RequestOptions::new()).spawn();

        stream.abort();

        assert!(stream.next().await.is_none());
        assert!(stream.outcome().await.unwrap_err().is_cancelled());
    }
}
