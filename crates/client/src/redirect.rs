//! Redirect following.
//!
//! Each followed redirect appends an immutable [`Hop`] to a [`RedirectChain`]. The chain
//! is moved from one hop to the next, it is never shared or mutated in place. The chain
//! length is capped by [`RedirectPolicy::max_redirects`]; exceeding it fails the request
//! with [`ClientError::TooManyRedirects`].

use http::header::LOCATION;
use http::{Method, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::RedirectDirective;
use crate::ensure;
use crate::protocol::{ClientError, RequestDescriptor, ResponseRecord};

/// One followed redirect: the request that was answered with a redirect status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    method: Method,
    url: Url,
    status: StatusCode,
}

impl Hop {
    pub fn new(method: Method, url: Url, status: StatusCode) -> Self {
        Self { method, url, status }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Whether and how far redirects are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectPolicy {
    follow: Option<bool>,
    max_redirects: usize,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self { follow: None, max_redirects: Self::DEFAULT_MAX_REDIRECTS }
    }
}

impl RedirectPolicy {
    pub const DEFAULT_MAX_REDIRECTS: usize = 10;

    pub fn new(follow: Option<bool>, max_redirects: usize) -> Self {
        Self { follow, max_redirects }
    }

    /// Only an explicit `false` disables following, an absent flag means follow.
    pub fn follows(&self) -> bool {
        self.follow != Some(false)
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }
}

/// The hops of one logical request, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectChain {
    hops: Vec<Hop>,
}

impl RedirectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hop, failing once the chain would exceed `max` hops.
    pub fn advance(self, hop: Hop, max: usize) -> Result<Self, ClientError> {
        ensure!(self.hops.len() < max, ClientError::too_many_redirects(max));
        let mut hops = self.hops;
        hops.push(hop);
        Ok(Self { hops })
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The url of the first hop, if any redirect was followed.
    pub fn original_url(&self) -> Option<&Url> {
        self.hops.first().map(Hop::url)
    }
}

/// The request to issue next, with the chain that leads to it.
#[derive(Debug)]
pub struct NextHop {
    pub request: RequestDescriptor,
    pub chain: RedirectChain,
}

/// Decides whether a classified response is followed and builds the next request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectController {
    policy: RedirectPolicy,
}

impl RedirectController {
    pub fn new(policy: RedirectPolicy) -> Self {
        Self { policy }
    }

    /// Returns `Ok(None)` when the response is not followed.
    pub fn next_hop(
        &self,
        chain: RedirectChain,
        request: &RequestDescriptor,
        response: &ResponseRecord,
        directive: Option<RedirectDirective>,
    ) -> Result<Option<NextHop>, ClientError> {
        let Some(directive) = directive else {
            return Ok(None);
        };

        if !self.policy.follows() {
            debug!(status = response.status().as_u16(), "redirect following is disabled");
            return Ok(None);
        }

        let next = redirect_request(request, response, directive)?;
        let hop = Hop::new(request.method().clone(), request.url().clone(), response.status());
        let chain = chain.advance(hop, self.policy.max_redirects)?;

        info!(
            from = %request.url(),
            to = %next.url(),
            method = %next.method(),
            hops = chain.len(),
            "follow redirect"
        );

        Ok(Some(NextHop { request: next, chain }))
    }
}

/// Builds the request of the next hop by resolving `Location` against the current url.
pub fn redirect_request(request: &RequestDescriptor, response: &ResponseRecord, directive: RedirectDirective) -> Result<RequestDescriptor, ClientError> {
    let status = response.status().as_u16();

    let Some(location) = response.headers().get(LOCATION) else {
        warn!(status, url = %request.url(), "redirect response without location header");
        return Err(ClientError::MissingLocation { status });
    };

    // raw utf-8 is percent-encoded by the url parser
    let location = String::from_utf8_lossy(location.as_bytes());

    let url = request.url().join(&location).map_err(|e| ClientError::invalid_location(&location, e))?;
    ensure!(matches!(url.scheme(), "http" | "https"), ClientError::invalid_location(&location, format!("unsupported scheme {}", url.scheme())));

    Ok(request.redirected(directive.next_method(request.method()), url))
}
