//! Utility macros and functions for the client crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the client implementation.

use http::HeaderMap;

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(hops.len() < max, ClientError::too_many_redirects(max));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Merges two header maps, `overrides` wins on key collision.
///
/// Header names are case-insensitive, so `user-agent` in `overrides` replaces every
/// `User-Agent` value of `defaults`. Multiple values of one name in `overrides` are kept.
pub fn merge_headers(defaults: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for name in overrides.keys() {
        merged.remove(name);
    }
    for (name, value) in overrides {
        merged.append(name, value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::{ACCEPT, USER_AGENT};

    #[test]
    fn call_level_header_wins() {
        let mut defaults = HeaderMap::new();
        defaults.insert(USER_AGENT, HeaderValue::from_static("node-wwwdude"));
        defaults.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let mut overrides = HeaderMap::new();
        overrides.insert("user-agent", HeaderValue::from_static("X"));

        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(merged.get_all(USER_AGENT).iter().collect::<Vec<_>>(), vec!["X"]);
        assert_eq!(merged.get(ACCEPT).unwrap(), "*/*");
    }

    #[test]
    fn keeps_multiple_values_of_overrides() {
        let defaults = HeaderMap::new();
        let mut overrides = HeaderMap::new();
        overrides.append("x-tag", HeaderValue::from_static("a"));
        overrides.append("x-tag", HeaderValue::from_static("b"));

        let merged = merge_headers(&defaults, &overrides);
        assert_eq!(merged.get_all("x-tag").iter().count(), 2);
    }
}
