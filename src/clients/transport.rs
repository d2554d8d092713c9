//! The per-call transport handle.
//!
//! A fresh [`TransportHandle`] is created for every `call()`. Decorators
//! register request and response hooks on it; the handle then performs the
//! exchange, running request hooks before dispatch and response hooks once
//! a response has been read, both in registration order.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::clients::errors::{CallError, HttpError, HttpResponseError};
use crate::clients::http_request::{BodyFormat, OutgoingRequest};
use crate::clients::http_response::HttpResponse;

/// A hook run on the outgoing request before dispatch.
pub type RequestHook = Box<dyn Fn(&mut OutgoingRequest) + Send + Sync>;

/// A hook run on every response that reaches the client.
pub type ResponseHook = Box<dyn Fn(&HttpResponse) + Send + Sync>;

/// An encoded request body.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// Sent as a serialized JSON document.
    Json(serde_json::Value),
    /// Sent as `multipart/form-data`, one text part per top-level key.
    Form(serde_json::Value),
}

impl RequestBody {
    /// Encodes `value` according to `format`.
    ///
    /// [`BodyFormat::None`] falls back to a JSON-serialized body.
    #[must_use]
    pub fn new(format: BodyFormat, value: serde_json::Value) -> Self {
        match format {
            BodyFormat::FormData => Self::Form(value),
            BodyFormat::Json | BodyFormat::None => Self::Json(value),
        }
    }

    fn into_form(value: serde_json::Value) -> reqwest::multipart::Form {
        let form = reqwest::multipart::Form::new();
        match value {
            serde_json::Value::Object(fields) => fields.into_iter().fold(form, |form, (key, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                form.text(key, text)
            }),
            serde_json::Value::Null => form,
            other => form.text("data", other.to_string()),
        }
    }
}

/// The handle decorators attach hooks to and through which the network
/// exchange happens.
pub struct TransportHandle {
    client: reqwest::Client,
    timeout: Option<Duration>,
    request_hooks: Vec<RequestHook>,
    response_hooks: Vec<ResponseHook>,
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportHandle")
            .field("timeout", &self.timeout)
            .field("request_hooks", &self.request_hooks.len())
            .field("response_hooks", &self.response_hooks.len())
            .finish_non_exhaustive()
    }
}

impl TransportHandle {
    /// Creates a handle with no hooks that dispatches through `client`.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
            request_hooks: Vec::new(),
            response_hooks: Vec::new(),
        }
    }

    /// Applies a timeout to the transport call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Registers a hook that may mutate the outgoing request.
    pub fn on_request<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut OutgoingRequest) + Send + Sync + 'static,
    {
        self.request_hooks.push(Box::new(hook));
        self
    }

    /// Registers a hook that inspects the response.
    ///
    /// Response hooks see every response that arrives, whatever its status.
    /// They do not run when no response was received.
    pub fn on_response<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&HttpResponse) + Send + Sync + 'static,
    {
        self.response_hooks.push(Box::new(hook));
        self
    }

    /// Returns the number of registered request hooks.
    #[must_use]
    pub fn request_hook_count(&self) -> usize {
        self.request_hooks.len()
    }

    /// Returns the number of registered response hooks.
    #[must_use]
    pub fn response_hook_count(&self) -> usize {
        self.response_hooks.len()
    }

    /// Performs the exchange.
    ///
    /// Non-2xx responses are reported as [`HttpError::Response`] and
    /// connectivity failures as [`HttpError::Network`], both wrapped in
    /// [`CallError::Http`].
    ///
    /// For a multipart body any `Content-Type` header on the request,
    /// including one set by a hook, is replaced by the multipart type with
    /// its boundary.
    ///
    /// # Errors
    ///
    /// Besides transport failures, returns [`CallError::InvalidUrl`],
    /// [`CallError::InvalidHeader`] or [`CallError::Build`] when the request
    /// cannot be constructed.
    pub async fn send(
        &self,
        mut request: OutgoingRequest,
        body: Option<RequestBody>,
    ) -> Result<HttpResponse, CallError> {
        for hook in &self.request_hooks {
            hook(&mut request);
        }

        let url = reqwest::Url::parse(request.url()).map_err(|_| CallError::InvalidUrl {
            url: request.url().to_string(),
        })?;

        // Multipart bodies carry their own content type with the boundary
        let is_form = matches!(body, Some(RequestBody::Form(_)));
        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            if is_form && name.eq_ignore_ascii_case("content-type") {
                tracing::debug!(content_type = value, "Ignoring Content-Type for multipart body");
                continue;
            }
            let invalid = || CallError::InvalidHeader {
                name: name.to_string(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(header_name, header_value);
        }

        tracing::debug!(method = %request.method(), url = %url, "Dispatching request");

        let mut builder = self
            .client
            .request(request.method().as_reqwest(), url)
            .headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.body(value.to_string()),
            Some(RequestBody::Form(value)) => builder.multipart(RequestBody::into_form(value)),
            None => builder,
        };

        let res = builder.send().await?;

        let code = res.status().as_u16();
        let headers = HttpResponse::parse_headers(res.headers());
        let text = res.text().await.map_err(HttpError::Network)?;
        let response = HttpResponse::new(code, headers, HttpResponse::parse_body(text));

        for hook in &self.response_hooks {
            hook(&response);
        }

        if response.is_ok() {
            return Ok(response);
        }

        tracing::debug!(code, url = %request.url(), "Request failed");
        Err(HttpError::Response(HttpResponseError {
            code,
            message: format!("Request failed with status code {code}"),
            headers: response.headers,
            body: response.body,
        })
        .into())
    }
}

// Verify TransportHandle is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TransportHandle>();
};
