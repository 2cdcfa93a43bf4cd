//! Upload URL construction

use crate::request::QueryParams;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a URL query: alphanumerics plus these.
const QUERY_ALLOWED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// Append `?k1=v1&k2=v2...` to `endpoint` in key order, then percent-encode
/// the whole string for the query character class.
///
/// With no parameters the endpoint is only encoded, never given a `?`.
pub fn build_url(endpoint: &str, params: &QueryParams) -> String {
    let raw = if params.is_empty() {
        endpoint.to_string()
    } else {
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("{}?{}", endpoint, query.join("&"))
    };

    utf8_percent_encode(&raw, QUERY_ALLOWED).to_string()
}
