//! HTTP transport types.
//!
//! This module provides the layer between the request builders and the
//! network: the per-call transport handle decorators hook into, the request
//! and response types, and the result wrapper every call produces.
//!
//! # Overview
//!
//! - [`TransportHandle`]: The per-call handle decorators register hooks on
//! - [`OutgoingRequest`]: The request as seen by request hooks
//! - [`HttpResponse`]: A response as seen by response hooks
//! - [`ApiResult`]: The success/failure outcome of a call
//! - [`CallContext`]: Ambient per-call state (cookies) shared with decorators
//! - [`HttpMethod`] / [`BodyFormat`]: Request method and body encoding
//! - [`HttpError`] / [`CallError`]: Transport and call errors
//!
//! # Outcome classification
//!
//! Classification follows the transport: a 2xx response is a success, a
//! non-2xx response or a connectivity failure is a failure. Both are
//! returned inside an [`ApiResult`]; neither is an `Err` for the caller.

mod context;
mod errors;
mod http_request;
mod http_response;
mod result;
mod transport;

pub use context::CallContext;
pub use errors::{ActionFailure, CallError, HttpError, HttpResponseError};
pub use http_request::{BodyFormat, HttpMethod, OutgoingRequest};
pub use http_response::HttpResponse;
pub use result::{ApiResult, StatusFilter};
pub use transport::{RequestBody, RequestHook, ResponseHook, TransportHandle};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
