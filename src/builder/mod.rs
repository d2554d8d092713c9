//! The request factory.
//!
//! [`ApiBuilder`] owns everything shared between requests: the base URL,
//! the HTTP client, the cache store, and the two decorator chains (global
//! and auth-only). Its factory methods create per-request builders that
//! borrow it for the duration of a single call.
//!
//! # Factory methods
//!
//! | method | returns | notes |
//! |---|---|---|
//! | `get` | [`CacheableClient`] | the only cacheable request shape |
//! | `delete`, `post`, `put`, `patch` | [`Client`] | no body |
//! | `json().post/put/patch` | [`BodyClient`] | `application/json` body |
//! | `form().post/put/patch` | [`BodyClient`] | `multipart/form-data` body |
//! | `auth().…` | same as above | runs the auth chain first, never cached |

mod client;

pub use client::{BodyClient, CacheableClient, Client};

use std::sync::Arc;

use client::RequestOptions;

use crate::cache::CacheStore;
use crate::clients::{BodyFormat, HttpMethod, SDK_VERSION};
use crate::config::{ApiConfig, BaseUrl};
use crate::decorators::Decorator;
use crate::error::ConfigError;

/// Factory for requests against one base URL.
///
/// Decorator lists are append-only and meant to be filled during setup;
/// requests only read them.
///
/// # Thread Safety
///
/// `ApiBuilder` is `Send + Sync`, so one instance can serve concurrent calls.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use api_builder::{ApiBuilder, CallContext, InMemoryCache};
/// use api_builder::decorators::{AddHeader, AuthorizationHeader, AutoRefresh};
///
/// let mut api = ApiBuilder::from_base_url("https://api.example.com")?;
/// api.set_cache_store(Arc::new(InMemoryCache::new()));
/// api.add_auth_decorator(AutoRefresh::new());
/// api.add_auth_decorator(AuthorizationHeader::new());
/// api.add_decorator(AddHeader::new("X-Client", "web"));
///
/// let ctx = CallContext::new().with_cookie("auth-token", "abc");
///
/// let users = api.get("users").query([("page", "1")]).cache(60).call(&ctx).await?;
/// let me = api.auth().get("me").call(&ctx).await?;
/// let created = api
///     .auth()
///     .json()
///     .post("users")
///     .body(serde_json::json!({"name": "Ada"}))
///     .call(&ctx)
///     .await?;
/// ```
pub struct ApiBuilder {
    config: ApiConfig,
    http_client: reqwest::Client,
    default_headers: Vec<(String, String)>,
    decorators: Vec<Arc<dyn Decorator>>,
    auth_decorators: Vec<Arc<dyn Decorator>>,
    cache_store: Option<Arc<dyn CacheStore>>,
}

impl std::fmt::Debug for ApiBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBuilder")
            .field("config", &self.config)
            .field("default_headers", &self.default_headers)
            .field("decorators", &self.decorators.len())
            .field("auth_decorators", &self.auth_decorators.len())
            .field("cache_store", &self.cache_store.is_some())
            .finish_non_exhaustive()
    }
}

// Verify ApiBuilder is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiBuilder>();
};

impl ApiBuilder {
    /// Creates a factory from a configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}api-builder v{SDK_VERSION} | Rust {rust_version}");

        let default_headers = vec![
            ("User-Agent".to_string(), user_agent),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        let http_client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
            default_headers,
            decorators: Vec::new(),
            auth_decorators: Vec::new(),
            cache_store: None,
        }
    }

    /// Creates a factory with default configuration for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is invalid.
    pub fn from_base_url(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::new(ApiConfig::from(BaseUrl::new(base_url)?)))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Returns the headers set on every request before decorators run.
    #[must_use]
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub(crate) const fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Appends a decorator to the global chain, applied to every request.
    pub fn add_decorator<D>(&mut self, decorator: D) -> &mut Self
    where
        D: Decorator + 'static,
    {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Returns the global decorator chain.
    #[must_use]
    pub fn decorators(&self) -> &[Arc<dyn Decorator>] {
        &self.decorators
    }

    /// Appends a decorator to the auth chain, applied only to requests
    /// created through [`auth`](Self::auth), before the global chain.
    pub fn add_auth_decorator<D>(&mut self, decorator: D) -> &mut Self
    where
        D: Decorator + 'static,
    {
        self.auth_decorators.push(Arc::new(decorator));
        self
    }

    /// Returns the auth decorator chain.
    #[must_use]
    pub fn auth_decorators(&self) -> &[Arc<dyn Decorator>] {
        &self.auth_decorators
    }

    /// Registers the cache store used by cacheable GET requests.
    pub fn set_cache_store(&mut self, store: Arc<dyn CacheStore>) -> &mut Self {
        self.cache_store = Some(store);
        self
    }

    /// Returns the cache store, if one is registered.
    #[must_use]
    pub const fn cache_store(&self) -> Option<&Arc<dyn CacheStore>> {
        self.cache_store.as_ref()
    }

    fn compose(&self, path: &str, method: HttpMethod, options: RequestOptions) -> Client<'_> {
        Client::new(self, self.config.base_url().join(path), method, options)
    }

    /// Creates a GET request. The only request shape that can be cached.
    #[must_use]
    pub fn get(&self, path: &str) -> CacheableClient<'_> {
        CacheableClient::new(self.compose(
            path,
            HttpMethod::Get,
            RequestOptions {
                cache: true,
                ..RequestOptions::default()
            },
        ))
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(&self, path: &str) -> Client<'_> {
        self.compose(path, HttpMethod::Delete, RequestOptions::default())
    }

    /// Creates a POST request without a body.
    #[must_use]
    pub fn post(&self, path: &str) -> Client<'_> {
        self.compose(path, HttpMethod::Post, RequestOptions::default())
    }

    /// Creates a PUT request without a body.
    #[must_use]
    pub fn put(&self, path: &str) -> Client<'_> {
        self.compose(path, HttpMethod::Put, RequestOptions::default())
    }

    /// Creates a PATCH request without a body.
    #[must_use]
    pub fn patch(&self, path: &str) -> Client<'_> {
        self.compose(path, HttpMethod::Patch, RequestOptions::default())
    }

    /// Scope for requests with a JSON body.
    #[must_use]
    pub const fn json(&self) -> BodyScope<'_> {
        BodyScope::new(self, false, BodyFormat::Json)
    }

    /// Scope for requests with a multipart form body.
    #[must_use]
    pub const fn form(&self) -> BodyScope<'_> {
        BodyScope::new(self, false, BodyFormat::FormData)
    }

    /// Scope for authenticated requests.
    #[must_use]
    pub const fn auth(&self) -> AuthScope<'_> {
        AuthScope { api: self }
    }
}

/// Factory scope for body-bearing requests. Created by [`ApiBuilder::json`],
/// [`ApiBuilder::form`], [`AuthScope::json`] and [`AuthScope::form`].
#[derive(Clone, Copy, Debug)]
pub struct BodyScope<'a> {
    api: &'a ApiBuilder,
    auth: bool,
    format: BodyFormat,
}

impl<'a> BodyScope<'a> {
    const fn new(api: &'a ApiBuilder, auth: bool, format: BodyFormat) -> Self {
        Self { api, auth, format }
    }

    fn compose(self, path: &str, method: HttpMethod) -> BodyClient<'a> {
        BodyClient::new(self.api.compose(
            path,
            method,
            RequestOptions {
                auth: self.auth,
                cache: false,
                format: self.format,
            },
        ))
    }

    /// Creates a POST request with a body.
    #[must_use]
    pub fn post(self, path: &str) -> BodyClient<'a> {
        self.compose(path, HttpMethod::Post)
    }

    /// Creates a PUT request with a body.
    #[must_use]
    pub fn put(self, path: &str) -> BodyClient<'a> {
        self.compose(path, HttpMethod::Put)
    }

    /// Creates a PATCH request with a body.
    #[must_use]
    pub fn patch(self, path: &str) -> BodyClient<'a> {
        self.compose(path, HttpMethod::Patch)
    }
}

/// Factory scope for authenticated requests. Created by [`ApiBuilder::auth`].
///
/// Requests created here run the auth decorator chain and are never cached.
#[derive(Clone, Copy, Debug)]
pub struct AuthScope<'a> {
    api: &'a ApiBuilder,
}

impl<'a> AuthScope<'a> {
    fn compose(self, path: &str, method: HttpMethod) -> Client<'a> {
        self.api.compose(
            path,
            method,
            RequestOptions {
                auth: true,
                ..RequestOptions::default()
            },
        )
    }

    /// Creates an authenticated GET request.
    #[must_use]
    pub fn get(self, path: &str) -> Client<'a> {
        self.compose(path, HttpMethod::Get)
    }

    /// Creates an authenticated DELETE request.
    #[must_use]
    pub fn delete(self, path: &str) -> Client<'a> {
        self.compose(path, HttpMethod::Delete)
    }

    /// Creates an authenticated POST request without a body.
    #[must_use]
    pub fn post(self, path: &str) -> Client<'a> {
        self.compose(path, HttpMethod::Post)
    }

    /// Creates an authenticated PUT request without a body.
    #[must_use]
    pub fn put(self, path: &str) -> Client<'a> {
        self.compose(path, HttpMethod::Put)
    }

    /// Creates an authenticated PATCH request without a body.
    #[must_use]
    pub fn patch(self, path: &str) -> Client<'a> {
        self.compose(path, HttpMethod::Patch)
    }

    /// Scope for authenticated requests with a JSON body.
    #[must_use]
    pub const fn json(self) -> BodyScope<'a> {
        BodyScope::new(self.api, true, BodyFormat::Json)
    }

    /// Scope for authenticated requests with a multipart form body.
    #[must_use]
    pub const fn form(self) -> BodyScope<'a> {
        BodyScope::new(self.api, true, BodyFormat::FormData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::decorators::AddHeader;

    fn api() -> ApiBuilder {
        ApiBuilder::from_base_url("https://api.example.com/").unwrap()
    }

    #[test]
    fn test_from_base_url_rejects_invalid() {
        assert!(matches!(
            ApiBuilder::from_base_url("example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_paths_join_without_duplicate_slashes() {
        let api = api();
        assert_eq!(api.get("/users").url(), "https://api.example.com/users");
        assert_eq!(api.get("users").url(), "https://api.example.com/users");
        assert_eq!(api.delete("//users/1").url(), "https://api.example.com/users/1");
    }

    #[test]
    fn test_factory_methods_set_method_and_format() {
        let api = api();

        assert_eq!(api.get("a").method(), HttpMethod::Get);
        assert_eq!(api.delete("a").method(), HttpMethod::Delete);
        assert_eq!(api.post("a").method(), HttpMethod::Post);
        assert_eq!(api.put("a").method(), HttpMethod::Put);
        assert_eq!(api.patch("a").method(), HttpMethod::Patch);
        assert_eq!(api.post("a").body_format(), BodyFormat::None);

        assert_eq!(api.json().post("a").body_format(), BodyFormat::Json);
        assert_eq!(api.json().put("a").method(), HttpMethod::Put);
        assert_eq!(api.form().patch("a").body_format(), BodyFormat::FormData);
        assert_eq!(api.form().patch("a").method(), HttpMethod::Patch);
    }

    #[test]
    fn test_auth_scope_sets_auth_flag() {
        let api = api();

        assert!(!api.get("a").uses_auth());
        assert!(!api.json().post("a").uses_auth());
        assert!(api.auth().get("a").uses_auth());
        assert!(api.auth().delete("a").uses_auth());
        assert!(api.auth().json().patch("a").uses_auth());
        assert_eq!(api.auth().form().post("a").body_format(), BodyFormat::FormData);
    }

    #[test]
    fn test_decorator_registration() {
        let mut api = api();
        api.add_decorator(AddHeader::new("a", "1"))
            .add_decorator(AddHeader::new("b", "2"));
        api.add_auth_decorator(AddHeader::new("c", "3"));

        assert_eq!(api.decorators().len(), 2);
        assert_eq!(api.auth_decorators().len(), 1);
    }

    #[test]
    fn test_cache_store_registration() {
        let mut api = api();
        assert!(api.cache_store().is_none());

        api.set_cache_store(Arc::new(InMemoryCache::new()));
        assert!(api.cache_store().is_some());
    }

    #[test]
    fn test_default_headers() {
        let config = ApiConfig::builder()
            .base_url(BaseUrl::new("https://api.example.com").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let api = ApiBuilder::new(config);

        let user_agent = &api
            .default_headers()
            .iter()
            .find(|(name, _)| name == "User-Agent")
            .unwrap()
            .1;
        assert!(user_agent.starts_with("MyApp/1.0 | "));
        assert!(user_agent.contains("api-builder v"));
        assert!(api
            .default_headers()
            .contains(&("Accept".to_string(), "application/json".to_string())));
    }
}
