//! HTTP-specific error types.
//!
//! # Error Handling
//!
//! Errors are split by who is expected to handle them:
//!
//! - [`HttpError`]: Transport-classified failures (non-2xx responses and
//!   network failures). These never reach the caller as `Err`; they are
//!   captured into a failed [`ApiResult`](crate::clients::ApiResult).
//! - [`CallError`]: Everything `call()` can return. Only the non-transport
//!   variants (invalid headers, invalid URLs, request construction) escape
//!   to the caller, since those indicate a programming error.
//! - [`ActionFailure`]: The tagged failure produced by
//!   [`ApiResult::evaluate`](crate::clients::ApiResult::evaluate).
//!
//! # Example
//!
//! ```rust,ignore
//! use api_builder::clients::HttpError;
//!
//! let result = api.get("users").call(&ctx).await?;
//! match result.error() {
//!     None => println!("ok: {:?}", result.data()),
//!     Some(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Some(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use std::collections::HashMap;

use thiserror::Error;

/// Error returned when the server answers with a non-2xx status.
///
/// The full response is retained so callers can inspect what the server
/// sent back.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Human readable description of the failure.
    pub message: String,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// The parsed response body.
    pub body: serde_json::Value,
}

/// A failure the transport itself classified as an error.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server responded with a non-2xx status code.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// No usable response was received (DNS, connection, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the response status, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Returns the response headers, if a response was received.
    #[must_use]
    pub const fn headers(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Response(e) => Some(&e.headers),
            Self::Network(_) => None,
        }
    }
}

/// Errors returned from executing a request.
///
/// [`CallError::Http`] is consumed by
/// [`ApiResult::handle`](crate::clients::ApiResult::handle) and turned into a
/// failed result. Every other variant propagates to the caller untouched.
#[derive(Debug, Error)]
pub enum CallError {
    /// A transport-classified failure.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A hook set a header whose name or value is not valid HTTP.
    #[error("Invalid header '{name}'.")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },

    /// The resolved request URL could not be parsed.
    #[error("Invalid request URL '{url}'.")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
    },

    /// The transport rejected the request before sending it.
    #[error("Failed to build request: {0}")]
    Build(reqwest::Error),
}

impl From<reqwest::Error> for CallError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::Build(error)
        } else {
            Self::Http(HttpError::Network(error))
        }
    }
}

/// The tagged failure produced by evaluating a failed result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Request failed with status {status}.")]
pub struct ActionFailure {
    /// The status of the failed result (0 when no response was received).
    pub status: u16,
}
