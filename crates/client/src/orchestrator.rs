//! Running one logical request.
//!
//! The [`Orchestrator`] drives a request through as many attempts as its redirect chain
//! needs. Each attempt goes through these steps:
//!
//! 1. merge the client headers with the call headers and issue the transport call
//! 2. accumulate the body, all under the attempt deadline
//! 3. run the content parser, if any
//! 4. emit the classification events
//! 5. hand the response to the [`RedirectController`]
//!
//! Every event of every hop goes into the same [`EventSink`]. A failure at any step emits
//! exactly one `error` event and ends the logical request.

use std::fmt;
use std::sync::Arc;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::body::accumulate;
use crate::classify::{check_status, classify};
use crate::event::{Event, EventSink};
use crate::protocol::{ClientError, RequestDescriptor, ResponseRecord};
use crate::redirect::{NextHop, RedirectChain, RedirectController, RedirectPolicy};
use crate::transport::{Transport, TransportRequest};
use crate::utils::merge_headers;

/// The terminal outcome of a logical request: the final response, or the error that was emitted.
pub type Outcome = Result<Arc<ResponseRecord>, Arc<ClientError>>;

/// Runs logical requests against a [`Transport`].
#[derive(Clone)]
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    max_redirects: usize,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, headers: HeaderMap::new(), max_redirects: RedirectPolicy::DEFAULT_MAX_REDIRECTS }
    }

    /// Headers sent with every request; call headers win on key collision.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Runs `request` to its terminal outcome, emitting every event into `sink`.
    pub async fn run(&self, request: RequestDescriptor, sink: &mut dyn EventSink) -> Outcome {
        let mut request = request;
        let mut chain = RedirectChain::new();

        loop {
            info!(method = %request.method(), url = %request.url(), hop = chain.len(), "issue request");

            let mut response = match self.attempt(&request).await {
                Ok(response) => response,
                Err(e) => return fail(sink, e),
            };

            if let Some(parser) = request.content_parser() {
                match parser.parse(response.raw_body().clone()).await {
                    Ok(parsed) => response.set_parsed(parsed),
                    Err(e) => {
                        warn!(url = %request.url(), cause = %e, "content parser failed");
                        return fail(sink, ClientError::content_parse(e));
                    }
                }
            }

            if !chain.is_empty() {
                debug!(hops = chain.len(), original = ?chain.original_url().map(Url::as_str), "response reached through redirects");
            }
            response.set_redirects(chain.hops().to_vec());
            let classification = classify(response.status());
            let response = Arc::new(response);

            debug!(status = response.status().as_u16(), events = ?classification.names(), "classified response");
            for kind in classification.kinds() {
                sink.emit(Event::response(*kind, Arc::clone(&response)));
            }

            let controller = RedirectController::new(RedirectPolicy::new(request.follow_redirect(), self.max_redirects));
            match controller.next_hop(chain, &request, &response, classification.redirect()) {
                Ok(Some(NextHop { request: next, chain: next_chain })) => {
                    request = next;
                    chain = next_chain;
                }
                Ok(None) => return Ok(response),
                Err(e) => return fail(sink, e),
            }
        }
    }

    /// One transport call plus body accumulation, bounded by the request timeout.
    async fn attempt(&self, request: &RequestDescriptor) -> Result<ResponseRecord, ClientError> {
        let abort = CancellationToken::new();
        let transport_request = self.transport_request(request, abort.clone())?;

        let exchange = async {
            let response = self.transport.call(transport_request).await.inspect_err(|e| {
                error!(url = %request.url(), cause = %e, "transport call failed");
            })?;
            check_status(response.status)?;

            let (raw_body, termination) = accumulate(response.body).await?;

            Ok(ResponseRecord::new(request.method().clone(), request.url().clone(), response.status, response.headers, raw_body, termination))
        };

        let Some(timeout) = request.timeout().filter(|timeout| !timeout.is_zero()) else {
            return exchange.await;
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                abort.cancel();
                error!(url = %request.url(), timeout_ms = timeout.as_millis(), "request timed out");
                Err(ClientError::timeout(timeout))
            }
        }
    }

    fn transport_request(&self, request: &RequestDescriptor, abort: CancellationToken) -> Result<TransportRequest, ClientError> {
        let mut headers = merge_headers(&self.headers, request.headers());

        if let Some(payload) = request.payload() {
            if !headers.contains_key(CONTENT_TYPE) {
                let form = HeaderValue::from_str(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref()).map_err(ClientError::invalid_header)?;
                headers.insert(CONTENT_TYPE, form);
            }
            headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));
        }

        Ok(TransportRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers,
            payload: request.payload().cloned(),
            timeout: request.timeout(),
            abort,
        })
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator").field("headers", &self.headers).field("max_redirects", &self.max_redirects).finish_non_exhaustive()
    }
}

fn fail(sink: &mut dyn EventSink, error: ClientError) -> Outcome {
    let error = Arc::new(error);
    sink.emit(Event::error(Arc::clone(&error)));
    Err(error)
}
