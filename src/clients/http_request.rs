//! HTTP request types.
//!
//! This module provides the method and body-format enums used to describe
//! a request, and [`OutgoingRequest`], the mutable view of a request that
//! decorator hooks operate on just before dispatch.

use std::fmt;

/// HTTP methods supported by the builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partially updating resources.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns `true` if requests with this method carry a body.
    ///
    /// GET and DELETE never send one, even when a body was set.
    #[must_use]
    pub const fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Encoding of a request body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyFormat {
    /// JSON body (`application/json`).
    Json,
    /// Multipart form body (`multipart/form-data`).
    FormData,
    /// No declared format; no `Content-Type` header is set.
    #[default]
    None,
}

impl BodyFormat {
    /// Returns the MIME type for this format, or `None` for [`BodyFormat::None`].
    #[must_use]
    pub const fn as_content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::FormData => Some("multipart/form-data"),
            Self::None => None,
        }
    }
}

/// A request about to be dispatched, as seen by request hooks.
///
/// The method and URL are fixed by the time hooks run; hooks may read and
/// change headers. Header names match case-insensitively, and setting an
/// existing header replaces its value in place.
#[derive(Clone, Debug)]
pub struct OutgoingRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
}

impl OutgoingRequest {
    /// Creates a request for `method` and the fully resolved `url`.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the fully resolved URL, including the query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the value of a header, if set.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Removes a header, returning its previous value.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let index = self
            .headers
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.headers.remove(index).1)
    }

    /// Iterates over headers in the order they were first set.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_only_post_put_patch_allow_body() {
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
        assert!(HttpMethod::Patch.allows_body());
    }

    #[test]
    fn test_body_format_content_type() {
        assert_eq!(BodyFormat::Json.as_content_type(), Some("application/json"));
        assert_eq!(
            BodyFormat::FormData.as_content_type(),
            Some("multipart/form-data")
        );
        assert_eq!(BodyFormat::None.as_content_type(), None);
        assert_eq!(BodyFormat::default(), BodyFormat::None);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut request = OutgoingRequest::new(HttpMethod::Get, "https://api.example.com/");
        request.set_header("X-Token", "first");
        request.set_header("Accept", "application/json");
        request.set_header("x-token", "second");

        assert_eq!(request.header("X-TOKEN"), Some("second"));
        let names: Vec<&str> = request.headers().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["X-Token", "Accept"]);
    }

    #[test]
    fn test_remove_header() {
        let mut request = OutgoingRequest::new(HttpMethod::Delete, "https://api.example.com/1");
        request.set_header("Authorization", "Bearer abc");

        assert_eq!(
            request.remove_header("authorization"),
            Some("Bearer abc".to_string())
        );
        assert!(request.header("Authorization").is_none());
        assert!(request.remove_header("Authorization").is_none());
    }
}
