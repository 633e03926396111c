//! Response classification.
//!
//! A completed response with status `C` produces these events, in this order:
//!
//! 1. the class, `4XX` for `404`
//! 2. the code, `404`
//! 3. the reason name from [`status`](crate::protocol::status), `not-found`; skipped for unmapped codes
//! 4. depending on the range:
//!    - `C >= 400`: `http-error`, then `http-client-error` (`C < 500`) or `http-server-error`
//!    - `300 <= C < 400`: `redirect`
//!    - `200 <= C < 300`: `success`
//! 5. `complete`
//!
//! 301 and 302 are followed with the same method, 303 is followed with `GET`.
//! 307 and 308 are classified as `redirect` but never followed.

use http::{Method, StatusCode};

use crate::ensure;
use crate::event::{EventKind, StatusClass};
use crate::protocol::{ClientError, status};

/// How a redirect response is followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDirective {
    /// Re-issue with the method of the current hop (301, 302)
    PreserveMethod,
    /// Re-issue as `GET` (303)
    ForceGet,
}

impl RedirectDirective {
    /// The method of the next hop.
    pub fn next_method(self, current: &Method) -> Method {
        match self {
            RedirectDirective::PreserveMethod => current.clone(),
            RedirectDirective::ForceGet => Method::GET,
        }
    }
}

/// The events of one response and whether it should be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    kinds: Vec<EventKind>,
    redirect: Option<RedirectDirective>,
}

impl Classification {
    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    pub fn redirect(&self) -> Option<RedirectDirective> {
        self.redirect
    }

    /// The event names, in emission order.
    pub fn names(&self) -> Vec<String> {
        self.kinds.iter().map(ToString::to_string).collect()
    }
}

/// Rejects status codes outside of `100..=599`.
pub fn check_status(status: StatusCode) -> Result<(), ClientError> {
    let code = status.as_u16();
    ensure!((100..=599).contains(&code), ClientError::InvalidStatus(code));
    Ok(())
}

pub fn classify(status: StatusCode) -> Classification {
    let code = status.as_u16();
    let mut kinds = Vec::with_capacity(6);
    let mut redirect = None;

    kinds.push(EventKind::Class(StatusClass::of(status)));
    kinds.push(EventKind::Code(status));
    if let Some(reason) = status::reason(code) {
        kinds.push(EventKind::Reason(reason));
    }

    if code >= 400 {
        kinds.push(EventKind::HttpError);
        if code < 500 {
            kinds.push(EventKind::HttpClientError);
        } else {
            kinds.push(EventKind::HttpServerError);
        }
    } else if code >= 300 {
        kinds.push(EventKind::Redirect);
        redirect = match code {
            301 | 302 => Some(RedirectDirective::PreserveMethod),
            303 => Some(RedirectDirective::ForceGet),
            // 307/308 should preserve the method as well, they are deliberately not followed
            _ => None,
        };
    } else if code >= 200 {
        kinds.push(EventKind::Success);
    }

    kinds.push(EventKind::Complete);

    Classification { kinds, redirect }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_code(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    /// class, code and the reason if the table has one
    fn prefix(code: u16) -> Vec<String> {
        let mut names = vec![format!("{}XX", code / 100), code.to_string()];
        if let Some(reason) = status::reason(code) {
            names.push(reason.to_string());
        }
        names
    }

    fn expected(code: u16, tail: &[&str]) -> Vec<String> {
        let mut names = prefix(code);
        names.extend(tail.iter().map(ToString::to_string));
        names
    }

    #[test]
    fn success_range() {
        for code in 200..=299 {
            let classification = classify(status_code(code));
            assert_eq!(classification.names(), expected(code, &["success", "complete"]), "code {code}");
            assert_eq!(classification.redirect(), None);
        }
    }

    #[test]
    fn client_error_range() {
        for code in 400..=499 {
            let classification = classify(status_code(code));
            assert_eq!(classification.names(), expected(code, &["http-error", "http-client-error", "complete"]), "code {code}");
            assert_eq!(classification.redirect(), None);
        }
    }

    #[test]
    fn server_error_range() {
        for code in 500..=599 {
            let classification = classify(status_code(code));
            assert_eq!(classification.names(), expected(code, &["http-error", "http-server-error", "complete"]), "code {code}");
        }
    }

    #[test]
    fn not_found_cascade() {
        assert_eq!(classify(StatusCode::NOT_FOUND).names(), vec!["4XX", "404", "not-found", "http-error", "http-client-error", "complete"]);
    }

    #[test]
    fn unmapped_reason_is_skipped() {
        assert_eq!(classify(status_code(299)).names(), vec!["2XX", "299", "success", "complete"]);
    }

    #[test]
    fn followable_redirects() {
        assert_eq!(classify(StatusCode::MOVED_PERMANENTLY).names(), vec!["3XX", "301", "moved-permanently", "redirect", "complete"]);
        assert_eq!(classify(StatusCode::MOVED_PERMANENTLY).redirect(), Some(RedirectDirective::PreserveMethod));
        assert_eq!(classify(StatusCode::FOUND).redirect(), Some(RedirectDirective::PreserveMethod));
        assert_eq!(classify(StatusCode::SEE_OTHER).redirect(), Some(RedirectDirective::ForceGet));
    }

    #[test]
    fn temporary_and_permanent_redirect_are_not_followed() {
        let classification = classify(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(classification.names(), vec!["3XX", "307", "temporary-redirect", "redirect", "complete"]);
        assert_eq!(classification.redirect(), None);
        assert_eq!(classify(StatusCode::PERMANENT_REDIRECT).redirect(), None);
        assert_eq!(classify(StatusCode::NOT_MODIFIED).redirect(), None);
    }

    #[test]
    fn informational_has_no_category() {
        assert_eq!(classify(StatusCode::CONTINUE).names(), vec!["1XX", "100", "continue", "complete"]);
    }

    #[test]
    fn directive_methods() {
        assert_eq!(RedirectDirective::PreserveMethod.next_method(&Method::POST), Method::POST);
        assert_eq!(RedirectDirective::ForceGet.next_method(&Method::PUT), Method::GET);
    }

    #[test]
    fn status_range_check() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(status_code(599)).is_ok());
        assert!(matches!(check_status(status_code(600)), Err(ClientError::InvalidStatus(600))));
    }
}
