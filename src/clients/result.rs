//! The uniform success/failure wrapper returned by every call.
//!
//! [`ApiResult`] replaces error propagation for expected request outcomes:
//! any status code and any connectivity failure ends up in an `ApiResult`,
//! and callers branch on [`ApiResult::is_success`] or use the conditional
//! hooks instead of matching on errors.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::clients::errors::{ActionFailure, CallError, HttpError};
use crate::clients::http_response::HttpResponse;

#[derive(Debug)]
enum Outcome {
    Success {
        status: u16,
        data: serde_json::Value,
        headers: HashMap<String, String>,
    },
    Failure {
        status: Option<u16>,
        error: HttpError,
    },
}

/// The outcome of a request: exactly one of success or failure.
///
/// An `ApiResult` is immutable. Cloning it is cheap and yields a handle to
/// the same underlying outcome, which is how cached results are shared;
/// [`ApiResult::ptr_eq`] tells whether two handles are the same result.
///
/// # Example
///
/// ```rust,ignore
/// let result = api.get("users").call(&ctx).await?;
///
/// result
///     .on_success(|r| println!("users: {:?}", r.data()))
///     .on_failure_with([401_u16, 403], |_| println!("not allowed"))
///     .on_failure_with(404_u16, |_| println!("no users"));
/// ```
#[derive(Clone, Debug)]
pub struct ApiResult {
    inner: Arc<Outcome>,
}

/// The set of statuses a conditional hook is restricted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusFilter(Vec<u16>);

impl StatusFilter {
    /// Returns `true` if `status` is in the filter.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        self.0.contains(&status)
    }
}

impl From<u16> for StatusFilter {
    fn from(status: u16) -> Self {
        Self(vec![status])
    }
}

impl<const N: usize> From<[u16; N]> for StatusFilter {
    fn from(statuses: [u16; N]) -> Self {
        Self(statuses.to_vec())
    }
}

impl From<&[u16]> for StatusFilter {
    fn from(statuses: &[u16]) -> Self {
        Self(statuses.to_vec())
    }
}

impl From<Vec<u16>> for StatusFilter {
    fn from(statuses: Vec<u16>) -> Self {
        Self(statuses)
    }
}

impl ApiResult {
    /// Awaits a pending transport response and classifies it.
    ///
    /// - A response the transport accepted becomes a success carrying its
    ///   status, body and headers.
    /// - A transport-classified failure ([`CallError::Http`]) becomes a
    ///   failure carrying the best available status and headers.
    ///
    /// # Errors
    ///
    /// Any other [`CallError`] is returned unchanged; only transport
    /// outcomes are normalized.
    pub async fn handle<F>(pending: F) -> Result<Self, CallError>
    where
        F: Future<Output = Result<HttpResponse, CallError>>,
    {
        match pending.await {
            Ok(response) => Ok(Self::success(response)),
            Err(CallError::Http(error)) => Ok(Self::failure(error)),
            Err(other) => Err(other),
        }
    }

    fn success(response: HttpResponse) -> Self {
        Self {
            inner: Arc::new(Outcome::Success {
                status: response.code,
                data: response.body,
                headers: response.headers,
            }),
        }
    }

    fn failure(error: HttpError) -> Self {
        Self {
            inner: Arc::new(Outcome::Failure {
                status: error.status(),
                error,
            }),
        }
    }

    /// Returns the success payload, or `None` on failure.
    #[must_use]
    pub fn data(&self) -> Option<&serde_json::Value> {
        match self.inner.as_ref() {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    /// Deserializes the success payload into `T`.
    ///
    /// Returns `Ok(None)` on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.data().map(|data| T::deserialize(data)).transpose()
    }

    /// Returns the failure, or `None` on success.
    #[must_use]
    pub fn error(&self) -> Option<&HttpError> {
        match self.inner.as_ref() {
            Outcome::Success { .. } => None,
            Outcome::Failure { error, .. } => Some(error),
        }
    }

    /// Returns the response status, or 0 when no response was received.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self.inner.as_ref() {
            Outcome::Success { status, .. } => *status,
            Outcome::Failure { status, .. } => status.unwrap_or(0),
        }
    }

    /// Returns `true` for a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.inner.as_ref(), Outcome::Success { .. })
    }

    /// Returns `true` for a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Looks up a response header.
    ///
    /// The lookup is case-sensitive against the stored names, which are
    /// lowercase. Returns `None` when no headers were received.
    #[must_use]
    pub fn get_header(&self, key: &str) -> Option<&str> {
        let headers = match self.inner.as_ref() {
            Outcome::Success { headers, .. } => Some(headers),
            Outcome::Failure { error, .. } => error.headers(),
        };
        headers?.get(key).map(String::as_str)
    }

    /// Runs `handler` if this is a success.
    pub fn on_success<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(&Self),
    {
        if self.is_success() {
            handler(self);
        }
        self
    }

    /// Runs `handler` if this is a success whose status is in `status`.
    pub fn on_success_with<S, F>(&self, status: S, handler: F) -> &Self
    where
        S: Into<StatusFilter>,
        F: FnOnce(&Self),
    {
        if self.is_success() && status.into().matches(self.status()) {
            handler(self);
        }
        self
    }

    /// Runs `handler` if this is a failure.
    pub fn on_failure<F>(&self, handler: F) -> &Self
    where
        F: FnOnce(&Self),
    {
        if self.is_failure() {
            handler(self);
        }
        self
    }

    /// Runs `handler` if this is a failure whose status is in `status`.
    pub fn on_failure_with<S, F>(&self, status: S, handler: F) -> &Self
    where
        S: Into<StatusFilter>,
        F: FnOnce(&Self),
    {
        if self.is_failure() && status.into().matches(self.status()) {
            handler(self);
        }
        self
    }

    /// Returns the success payload, or an [`ActionFailure`] carrying the
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`ActionFailure`] if this result is a failure.
    pub fn evaluate(&self) -> Result<&serde_json::Value, ActionFailure> {
        self.data().ok_or(ActionFailure {
            status: self.status(),
        })
    }

    /// Returns `true` if both handles refer to the same result.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// Verify ApiResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiResult>();
};
