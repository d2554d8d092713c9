//! Header and token decorators.

use std::fmt;
use std::sync::Arc;

use crate::clients::{CallContext, TransportHandle};
use crate::decorators::Decorator;

/// Sets a fixed header on every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddHeader {
    key: String,
    value: String,
}

impl AddHeader {
    /// Creates a decorator that sets `key` to `value`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Decorator for AddHeader {
    fn decorate(&self, handle: &mut TransportHandle, _ctx: &CallContext) {
        let key = self.key.clone();
        let value = self.value.clone();
        handle.on_request(move |req| req.set_header(key.as_str(), value.as_str()));
    }
}

type TokenFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Forwards an auth-token cookie as an authorization header.
///
/// Before dispatch, if the call context holds the auth cookie, the header is
/// set to the formatted token. When the server answers 401 the cookie is
/// removed from the context.
///
/// # Defaults
///
/// - header: `Authorization`
/// - cookie: `auth-token`
/// - format: `Bearer {token}`
///
/// # Example
///
/// ```rust
/// use api_builder::decorators::AuthorizationHeader;
///
/// let decorator = AuthorizationHeader::new()
///     .header("X-Api-Token")
///     .cookie("session")
///     .format_token(|token| format!("Token {token}"));
/// ```
#[derive(Clone)]
pub struct AuthorizationHeader {
    header: String,
    cookie: String,
    format_token: TokenFormatter,
}

impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationHeader")
            .field("header", &self.header)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

impl Default for AuthorizationHeader {
    fn default() -> Self {
        Self {
            header: "Authorization".to_string(),
            cookie: "auth-token".to_string(),
            format_token: Arc::new(|token: &str| format!("Bearer {token}")),
        }
    }
}

impl AuthorizationHeader {
    /// Creates the decorator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header the token is sent in.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Sets the cookie the token is read from.
    #[must_use]
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    /// Sets how the token is rendered into the header value.
    #[must_use]
    pub fn format_token<F>(mut self, format: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.format_token = Arc::new(format);
        self
    }
}

impl Decorator for AuthorizationHeader {
    fn decorate(&self, handle: &mut TransportHandle, ctx: &CallContext) {
        let header = self.header.clone();
        let cookie = self.cookie.clone();
        let format_token = Arc::clone(&self.format_token);
        let request_ctx = ctx.clone();
        handle.on_request(move |req| {
            if let Some(token) = request_ctx.cookie(&cookie) {
                req.set_header(header.as_str(), format_token(&token));
            }
        });

        let cookie = self.cookie.clone();
        let response_ctx = ctx.clone();
        handle.on_response(move |res| {
            if res.code == 401 {
                response_ctx.remove_cookie(&cookie);
            }
        });
    }
}

/// Keeps auth tokens fresh across calls.
///
/// Before dispatch, the refresh-token cookie is forwarded in a request
/// header. When a non-401 response carries rotated tokens, they are written
/// back into the call context's cookies.
///
/// # Defaults
///
/// - refresh cookie: `refresh-token`
/// - auth cookie: `auth-token`
/// - refresh header sent: `x-Refresh-Token`
/// - auth token header received: `x-Set-Auth-Token`
/// - refresh token header received: `x-Set-Refresh-Token`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoRefresh {
    refresh_token_cookie: String,
    auth_token_cookie: String,
    send_refresh_header: String,
    receive_auth_header: String,
    receive_refresh_header: String,
}

impl Default for AutoRefresh {
    fn default() -> Self {
        Self {
            refresh_token_cookie: "refresh-token".to_string(),
            auth_token_cookie: "auth-token".to_string(),
            send_refresh_header: "x-Refresh-Token".to_string(),
            receive_auth_header: "x-Set-Auth-Token".to_string(),
            receive_refresh_header: "x-Set-Refresh-Token".to_string(),
        }
    }
}

impl AutoRefresh {
    /// Creates the decorator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cookie holding the refresh token.
    #[must_use]
    pub fn refresh_token_cookie(mut self, name: impl Into<String>) -> Self {
        self.refresh_token_cookie = name.into();
        self
    }

    /// Sets the cookie holding the auth token.
    #[must_use]
    pub fn auth_token_cookie(mut self, name: impl Into<String>) -> Self {
        self.auth_token_cookie = name.into();
        self
    }

    /// Sets the request header the refresh token is sent in.
    #[must_use]
    pub fn send_refresh_header(mut self, name: impl Into<String>) -> Self {
        self.send_refresh_header = name.into();
        self
    }

    /// Sets the response header a new auth token arrives in.
    #[must_use]
    pub fn receive_auth_header(mut self, name: impl Into<String>) -> Self {
        self.receive_auth_header = name.into();
        self
    }

    /// Sets the response header a new refresh token arrives in.
    #[must_use]
    pub fn receive_refresh_header(mut self, name: impl Into<String>) -> Self {
        self.receive_refresh_header = name.into();
        self
    }
}

impl Decorator for AutoRefresh {
    fn decorate(&self, handle: &mut TransportHandle, ctx: &CallContext) {
        let refresh_cookie = self.refresh_token_cookie.clone();
        let send_header = self.send_refresh_header.clone();
        let request_ctx = ctx.clone();
        handle.on_request(move |req| {
            if let Some(token) = request_ctx.cookie(&refresh_cookie) {
                req.set_header(send_header.as_str(), token);
            }
        });

        // Response headers are stored lowercase
        let rotations = [
            (
                self.receive_auth_header.to_lowercase(),
                self.auth_token_cookie.clone(),
            ),
            (
                self.receive_refresh_header.to_lowercase(),
                self.refresh_token_cookie.clone(),
            ),
        ];
        let response_ctx = ctx.clone();
        handle.on_response(move |res| {
            if res.code == 401 {
                return;
            }
            for (header, cookie) in &rotations {
                if let Some(token) = res.header(header) {
                    response_ctx.set_cookie(cookie.as_str(), token);
                }
            }
        });
    }
}
