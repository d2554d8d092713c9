//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type: a fully read response
//! with normalized headers and a parsed body.

use std::collections::HashMap;

/// A response received from the server.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lowercase name. Repeated headers are
    /// joined with `", "`.
    pub headers: HashMap<String, String>,
    /// The parsed response body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns a header value by its lowercase name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Normalizes transport headers into a lowercase-keyed map.
    pub(crate) fn parse_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let value = value.to_str().unwrap_or_default();
            result
                .entry(name.as_str().to_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        result
    }

    /// Parses a body as JSON, falling back to the raw text.
    pub(crate) fn parse_body(text: String) -> serde_json::Value {
        if text.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;

    #[test]
    fn test_is_ok_for_2xx_only() {
        let ok = HttpResponse::new(204, HashMap::new(), json!(null));
        let redirect = HttpResponse::new(304, HashMap::new(), json!(null));
        let missing = HttpResponse::new(404, HashMap::new(), json!(null));

        assert!(ok.is_ok());
        assert!(!redirect.is_ok());
        assert!(!missing.is_ok());
    }

    #[test]
    fn test_parse_headers_lowercases_and_joins() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-Id", HeaderValue::from_static("abc"));
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("Set-Cookie", HeaderValue::from_static("b=2"));

        let parsed = HttpResponse::parse_headers(&headers);
        assert_eq!(parsed.get("x-request-id"), Some(&"abc".to_string()));
        assert_eq!(parsed.get("set-cookie"), Some(&"a=1, b=2".to_string()));
        assert!(!parsed.contains_key("X-Request-Id"));
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(HttpResponse::parse_body(String::new()), json!(null));
        assert_eq!(
            HttpResponse::parse_body(r#"{"id":1}"#.to_string()),
            json!({"id": 1})
        );
        assert_eq!(
            HttpResponse::parse_body("plain text".to_string()),
            json!("plain text")
        );
    }

    #[test]
    fn test_header_lookup() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let response = HttpResponse::new(200, headers, json!({}));

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("Content-Type"), None);
    }
}
