//! # API Builder
//!
//! A fluent builder for outbound HTTP requests, with an ordered decorator
//! chain, an optional response cache for GET requests, and a uniform
//! success/failure result for every call.
//!
//! ## Overview
//!
//! This crate provides:
//! - A request factory, [`ApiBuilder`], bound to one base URL
//! - Typed per-request builders ([`Client`], [`CacheableClient`], [`BodyClient`])
//!   that only expose the setters valid for the request's shape
//! - An ordered decorator chain (auth, then global, then per-request) via
//!   [`decorators::Decorator`]
//! - A pluggable response cache via [`CacheStore`], with an in-memory
//!   implementation, [`InMemoryCache`]
//! - A uniform outcome type, [`ApiResult`], for successes and failures alike
//!
//! ## Quick Start
//!
//! ```rust
//! use api_builder::{ApiBuilder, ApiConfig, BaseUrl};
//!
//! let config = ApiConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com").unwrap())
//!     .user_agent_prefix("MyApp/1.0")
//!     .build()
//!     .unwrap();
//!
//! let api = ApiBuilder::new(config);
//! let request = api.get("users").query([("page", "1")]).cache(60);
//! assert_eq!(request.resolved_url().unwrap(), "https://api.example.com/users?page=1");
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use api_builder::{ApiBuilder, CallContext, InMemoryCache};
//! use api_builder::decorators::AuthorizationHeader;
//!
//! let mut api = ApiBuilder::from_base_url("https://api.example.com")?;
//! api.set_cache_store(Arc::new(InMemoryCache::new()));
//! api.add_auth_decorator(AuthorizationHeader::new());
//!
//! let ctx = CallContext::new().with_cookie("auth-token", "abc");
//!
//! // Served from the cache for 60 seconds after the first success
//! let users = api.get("users").cache(60).call(&ctx).await?;
//! users
//!     .on_success(|r| println!("{} users", r.data().map_or(0, |d| d.as_array().map_or(0, Vec::len))))
//!     .on_failure_with(404_u16, |_| println!("not found"));
//!
//! // Authenticated requests are never cached
//! let me = api.auth().get("me").call(&ctx).await?;
//! let profile = me.evaluate()?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Factories, caches and call contexts are instances
//!   passed explicitly
//! - **Failures are values**: Non-2xx responses and network errors come back
//!   as a failed [`ApiResult`], not as `Err`
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime

pub mod builder;
pub mod cache;
pub mod clients;
pub mod config;
pub mod decorators;
pub mod error;

// Re-export public types at crate root for convenience
pub use builder::{ApiBuilder, AuthScope, BodyClient, BodyScope, CacheableClient, Client};
pub use cache::{CacheStore, InMemoryCache};
pub use config::{ApiConfig, ApiConfigBuilder, BaseUrl};
pub use error::ConfigError;

// Re-export transport and result types
pub use clients::{
    ActionFailure, ApiResult, BodyFormat, CallContext, CallError, HttpError, HttpMethod,
    HttpResponse, HttpResponseError, StatusFilter,
};
