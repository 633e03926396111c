//! Client configuration loaded through serde.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// The client-level settings, deserializable from any serde format.
///
/// Absent fields keep the builder defaults. Apply with [`ClientBuilder::config`](crate::ClientBuilder::config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Deadline of each attempt, in milliseconds
    pub timeout_ms: Option<u64>,
    pub follow_redirect: Option<bool>,
    pub max_redirects: Option<usize>,
}

impl ClientConfig {
    /// `timeout_ms: 0` means no deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}
