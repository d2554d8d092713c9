//! Per-request builders and the execution engine.
//!
//! A [`Client`] holds one request's configuration and executes it exactly
//! once via [`Client::call`]. The capability wrappers restrict which setters
//! are available depending on how the request was created:
//!
//! - [`CacheableClient`] (from [`ApiBuilder::get`]) adds [`cache`](CacheableClient::cache)
//! - [`BodyClient`] (from the `json()` and `form()` scopes) adds [`body`](BodyClient::body)

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crate::builder::ApiBuilder;
use crate::cache::CacheStore;
use crate::clients::{
    ApiResult, BodyFormat, CallContext, CallError, HttpMethod, OutgoingRequest, RequestBody,
    TransportHandle,
};
use crate::decorators::Decorator;

/// Options a request is created with by the factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RequestOptions {
    pub(crate) auth: bool,
    pub(crate) cache: bool,
    pub(crate) format: BodyFormat,
}

/// A single request: configure it, then [`call`](Self::call) it once.
///
/// # Example
///
/// ```rust,ignore
/// use api_builder::{ApiBuilder, CallContext};
///
/// let api = ApiBuilder::from_base_url("https://api.example.com")?;
/// let result = api
///     .delete("users/1")
///     .query([("soft", "true")])
///     .call(&CallContext::new())
///     .await?;
/// ```
pub struct Client<'a> {
    api: &'a ApiBuilder,
    url: String,
    method: HttpMethod,
    options: RequestOptions,
    query: Option<BTreeMap<String, String>>,
    body: Option<serde_json::Value>,
    cache_ttl: u64,
    decorators: Vec<Arc<dyn Decorator>>,
}

impl std::fmt::Debug for Client<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("options", &self.options)
            .field("query", &self.query)
            .field("cache_ttl", &self.cache_ttl)
            .field("decorators", &self.decorators.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Client<'a> {
    pub(crate) const fn new(
        api: &'a ApiBuilder,
        url: String,
        method: HttpMethod,
        options: RequestOptions,
    ) -> Self {
        Self {
            api,
            url,
            method,
            options,
            query: None,
            body: None,
            cache_ttl: 0,
            decorators: Vec::new(),
        }
    }

    /// Sets the query parameters, replacing any set before.
    ///
    /// Parameters are sent sorted by name, which keeps cache keys stable
    /// regardless of the order they were supplied in.
    #[must_use]
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.query = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Appends a decorator that runs after the factory-level chains.
    #[must_use]
    pub fn decorate<D>(mut self, decorator: D) -> Self
    where
        D: Decorator + 'static,
    {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Returns the request URL, without the query string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns `true` if the auth decorator chain applies to this request.
    #[must_use]
    pub const fn uses_auth(&self) -> bool {
        self.options.auth
    }

    /// Returns the body format.
    #[must_use]
    pub const fn body_format(&self) -> BodyFormat {
        self.options.format
    }

    /// Returns the requested cache TTL in seconds (0 when disabled).
    #[must_use]
    pub const fn cache_ttl(&self) -> u64 {
        self.cache_ttl
    }

    /// Returns the URL the request is sent to, query string included.
    ///
    /// This is also the cache key for cache-eligible requests.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::InvalidUrl`] if the URL cannot be parsed.
    pub fn resolved_url(&self) -> Result<String, CallError> {
        let mut url = reqwest::Url::parse(&self.url).map_err(|_| CallError::InvalidUrl {
            url: self.url.clone(),
        })?;
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    /// Returns `true` if this request would be served from and stored in the
    /// cache.
    ///
    /// That requires all of: created through the cacheable GET path, a
    /// positive TTL, no auth, and a cache store on the factory. Requests
    /// carrying auth are never cached, so one user's response cannot be
    /// served to another.
    #[must_use]
    pub fn is_cache_eligible(&self) -> bool {
        self.eligible_store().is_some()
    }

    fn eligible_store(&self) -> Option<&'a dyn CacheStore> {
        let eligible = self.options.cache
            && self.method == HttpMethod::Get
            && self.cache_ttl > 0
            && !self.options.auth;
        if eligible {
            self.api.cache_store().map(|store| store.as_ref())
        } else {
            None
        }
    }

    fn outgoing_request(&self, url: &str) -> OutgoingRequest {
        let mut request = OutgoingRequest::new(self.method, url);
        for (name, value) in self.api.default_headers() {
            request.set_header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = self.options.format.as_content_type() {
            request.set_header("Content-Type", content_type);
        }
        request
    }

    /// Executes the request.
    ///
    /// Decorators run first, in order: the factory's auth chain (only for
    /// authenticated requests), the factory's global chain, then decorators
    /// added with [`decorate`](Self::decorate). For a cache-eligible request
    /// a stored result is returned without touching the network; otherwise
    /// the request is dispatched and, if it succeeds, stored under its
    /// resolved URL for the requested TTL. Failures are never cached.
    ///
    /// # Errors
    ///
    /// Non-2xx responses and network failures are *not* errors: they come
    /// back as a failed [`ApiResult`]. An `Err` means the request could not
    /// be built ([`CallError::InvalidUrl`], [`CallError::InvalidHeader`],
    /// [`CallError::Build`]).
    pub async fn call(self, ctx: &CallContext) -> Result<ApiResult, CallError> {
        let url = self.resolved_url()?;
        let store = self.eligible_store();

        let mut handle = TransportHandle::new(self.api.http_client().clone())
            .with_timeout(self.api.config().timeout());
        let auth_chain = if self.options.auth {
            self.api.auth_decorators()
        } else {
            &[]
        };
        for decorator in auth_chain
            .iter()
            .chain(self.api.decorators())
            .chain(&self.decorators)
        {
            decorator.decorate(&mut handle, ctx);
        }

        let request = self.outgoing_request(&url);
        let body = self
            .body
            .filter(|_| self.method.allows_body())
            .map(|value| RequestBody::new(self.options.format, value));

        let Some(store) = store else {
            return ApiResult::handle(handle.send(request, body)).await;
        };

        if store.has(&url) {
            if let Some(cached) = store.get(&url) {
                tracing::debug!(key = %url, "Serving cached result");
                return Ok(cached);
            }
        }

        let result = ApiResult::handle(handle.send(request, body)).await?;
        let ttl = Duration::from_secs(self.cache_ttl);
        result
            .on_success(|r| store.set(&url, r.clone(), ttl))
            .on_failure(|r| {
                tracing::debug!(key = %url, status = r.status(), "Not caching failed result");
            });
        Ok(result)
    }
}

/// A GET request that may be cached. Created by [`ApiBuilder::get`].
#[derive(Debug)]
pub struct CacheableClient<'a>(Client<'a>);

impl<'a> CacheableClient<'a> {
    pub(crate) const fn new(client: Client<'a>) -> Self {
        Self(client)
    }

    /// Caches a successful result for `ttl_seconds`. 0 disables caching.
    ///
    /// Has an effect only when the factory has a cache store configured.
    #[must_use]
    pub const fn cache(mut self, ttl_seconds: u64) -> Self {
        self.0.cache_ttl = ttl_seconds;
        self
    }

    /// See [`Client::query`].
    #[must_use]
    pub fn query<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self(self.0.query(params))
    }

    /// See [`Client::decorate`].
    #[must_use]
    pub fn decorate<D>(self, decorator: D) -> Self
    where
        D: Decorator + 'static,
    {
        Self(self.0.decorate(decorator))
    }

    /// See [`Client::call`].
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn call(self, ctx: &CallContext) -> Result<ApiResult, CallError> {
        self.0.call(ctx).await
    }
}

impl<'a> Deref for CacheableClient<'a> {
    type Target = Client<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> From<CacheableClient<'a>> for Client<'a> {
    fn from(client: CacheableClient<'a>) -> Self {
        client.0
    }
}

/// A POST, PUT or PATCH request that carries a body. Created by the
/// [`ApiBuilder::json`] and [`ApiBuilder::form`] scopes.
#[derive(Debug)]
pub struct BodyClient<'a>(Client<'a>);

impl<'a> BodyClient<'a> {
    pub(crate) const fn new(client: Client<'a>) -> Self {
        Self(client)
    }

    /// Sets the request body, encoded according to the body format.
    #[must_use]
    pub fn body(mut self, data: impl Into<serde_json::Value>) -> Self {
        self.0.body = Some(data.into());
        self
    }

    /// See [`Client::query`].
    #[must_use]
    pub fn query<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self(self.0.query(params))
    }

    /// See [`Client::decorate`].
    #[must_use]
    pub fn decorate<D>(self, decorator: D) -> Self
    where
        D: Decorator + 'static,
    {
        Self(self.0.decorate(decorator))
    }

    /// See [`Client::call`].
    ///
    /// # Errors
    ///
    /// See [`Client::call`].
    pub async fn call(self, ctx: &CallContext) -> Result<ApiResult, CallError> {
        self.0.call(ctx).await
    }
}

impl<'a> Deref for BodyClient<'a> {
    type Target = Client<'a>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> From<BodyClient<'a>> for Client<'a> {
    fn from(client: BodyClient<'a>) -> Self {
        client.0
    }
}
