use std::fmt;

use http::StatusCode;

/// The hundreds digit of a status code, displayed as `1XX` .. `5XX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusClass(u8);

impl StatusClass {
    pub fn of(status: StatusCode) -> Self {
        // status codes are 100..=999, so the hundreds digit fits a u8
        Self(u8::try_from(status.as_u16() / 100).unwrap_or(u8::MAX))
    }

    fn matches_name(self, name: &str) -> bool {
        let bytes = name.as_bytes();
        bytes.len() == 3 && bytes[0] == b'0' + self.0 && &bytes[1..] == b"XX"
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}XX", self.0)
    }
}

/// The kinds of events a request produces.
///
/// One response produces several kinds, see [`classify`](crate::classify::classify) for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The status class, named like `4XX`
    Class(StatusClass),
    /// The exact status code, named like `404`
    Code(StatusCode),
    /// The reason name from the status table, like `not-found`
    Reason(&'static str),
    /// `success`, for 2XX
    Success,
    /// `redirect`, for 3XX
    Redirect,
    /// `http-error`, for 4XX and 5XX
    HttpError,
    /// `http-client-error`, for 4XX
    HttpClientError,
    /// `http-server-error`, for 5XX
    HttpServerError,
    /// `complete`, always the last event of a classified response
    Complete,
    /// `error`, a terminal failure of the request attempt
    Error,
}

impl EventKind {
    /// Returns true if the event name of this kind equals `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            EventKind::Class(class) => class.matches_name(name),
            EventKind::Code(status) => status.as_str() == name,
            EventKind::Reason(reason) => *reason == name,
            other => other.static_name() == Some(name),
        }
    }

    fn static_name(&self) -> Option<&'static str> {
        match self {
            EventKind::Class(_) | EventKind::Code(_) | EventKind::Reason(_) => None,
            EventKind::Success => Some("success"),
            EventKind::Redirect => Some("redirect"),
            EventKind::HttpError => Some("http-error"),
            EventKind::HttpClientError => Some("http-client-error"),
            EventKind::HttpServerError => Some("http-server-error"),
            EventKind::Complete => Some("complete"),
            EventKind::Error => Some("error"),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Class(class) => fmt::Display::fmt(class, f),
            EventKind::Code(status) => f.write_str(status.as_str()),
            EventKind::Reason(reason) => f.write_str(reason),
            other => f.write_str(other.static_name().unwrap_or_default()),
        }
    }
}

/// Selects the events a listener receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event
    Any,
    /// Events whose name equals the given one, e.g. `404`, `4XX`, `not-found`, `success`
    Name(String),
    /// Events of exactly this kind
    Kind(EventKind),
}

impl EventFilter {
    pub fn matches(&self, kind: &EventKind) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Name(name) => kind.matches_name(name),
            EventFilter::Kind(expected) => expected == kind,
        }
    }
}

impl From<&str> for EventFilter {
    fn from(name: &str) -> Self {
        EventFilter::Name(name.to_string())
    }
}

impl From<String> for EventFilter {
    fn from(name: String) -> Self {
        EventFilter::Name(name)
    }
}

impl From<u16> for EventFilter {
    fn from(code: u16) -> Self {
        EventFilter::Name(code.to_string())
    }
}

impl From<StatusCode> for EventFilter {
    fn from(status: StatusCode) -> Self {
        EventFilter::Kind(EventKind::Code(status))
    }
}

impl From<EventKind> for EventFilter {
    fn from(kind: EventKind) -> Self {
        EventFilter::Kind(kind)
    }
}
