//! The bundled status-code-to-reason table.
//!
//! Names follow the IANA HTTP status code registry, lower-cased with words joined by `-`,
//! so they can be used directly as event names (`404` is `not-found`).
//! The table is fixed at compile time and not configurable.

/// Every status code the table knows about, in ascending order.
pub const STATUS_CODES: &[(u16, &str)] = &[
    (100, "continue"),
    (101, "switching-protocols"),
    (102, "processing"),
    (103, "early-hints"),
    (200, "ok"),
    (201, "created"),
    (202, "accepted"),
    (203, "non-authoritative-information"),
    (204, "no-content"),
    (205, "reset-content"),
    (206, "partial-content"),
    (207, "multi-status"),
    (208, "already-reported"),
    (226, "im-used"),
    (300, "multiple-choices"),
    (301, "moved-permanently"),
    (302, "found"),
    (303, "see-other"),
    (304, "not-modified"),
    (305, "use-proxy"),
    (307, "temporary-redirect"),
    (308, "permanent-redirect"),
    (400, "bad-request"),
    (401, "unauthorized"),
    (402, "payment-required"),
    (403, "forbidden"),
    (404, "not-found"),
    (405, "method-not-allowed"),
    (406, "not-acceptable"),
    (407, "proxy-authentication-required"),
    (408, "request-timeout"),
    (409, "conflict"),
    (410, "gone"),
    (411, "length-required"),
    (412, "precondition-failed"),
    (413, "content-too-large"),
    (414, "uri-too-long"),
    (415, "unsupported-media-type"),
    (416, "range-not-satisfiable"),
    (417, "expectation-failed"),
    (418, "im-a-teapot"),
    (421, "misdirected-request"),
    (422, "unprocessable-content"),
    (423, "locked"),
    (424, "failed-dependency"),
    (425, "too-early"),
    (426, "upgrade-required"),
    (428, "precondition-required"),
    (429, "too-many-requests"),
    (431, "request-header-fields-too-large"),
    (451, "unavailable-for-legal-reasons"),
    (500, "internal-server-error"),
    (501, "not-implemented"),
    (502, "bad-gateway"),
    (503, "service-unavailable"),
    (504, "gateway-timeout"),
    (505, "http-version-not-supported"),
    (506, "variant-also-negotiates"),
    (507, "insufficient-storage"),
    (508, "loop-detected"),
    (510, "not-extended"),
    (511, "network-authentication-required"),
];

/// Looks up the reason name of a status code, `None` for unmapped codes.
pub fn reason(code: u16) -> Option<&'static str> {
    STATUS_CODES.binary_search_by_key(&code, |&(c, _)| c).ok().map(|index| STATUS_CODES[index].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_lookup() {
        assert!(STATUS_CODES.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn known_codes() {
        assert_eq!(reason(200), Some("ok"));
        assert_eq!(reason(301), Some("moved-permanently"));
        assert_eq!(reason(404), Some("not-found"));
        assert_eq!(reason(500), Some("internal-server-error"));
    }

    #[test]
    fn unmapped_codes() {
        assert_eq!(reason(299), None);
        assert_eq!(reason(420), None);
        assert_eq!(reason(599), None);
    }

    #[test]
    fn names_are_event_friendly() {
        for (_, name) in STATUS_CODES {
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '-'), "bad name {name}");
        }
    }
}
