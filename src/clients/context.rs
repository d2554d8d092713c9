//! Per-call context handed to decorators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ambient state for a single `call()`, typically derived from the inbound
/// request that triggered the outbound one.
///
/// The context carries a cookie jar. Cloning a `CallContext` creates a new
/// handle to the same jar, so hooks registered by decorators can capture a
/// clone and write tokens back after the response arrives.
///
/// # Example
///
/// ```rust
/// use api_builder::clients::CallContext;
///
/// let ctx = CallContext::new().with_cookie("auth-token", "abc");
/// let handle = ctx.clone();
/// handle.set_cookie("auth-token", "def");
///
/// assert_eq!(ctx.cookie("auth-token").as_deref(), Some("def"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    cookies: Arc<Mutex<HashMap<String, String>>>,
}

impl CallContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context seeded with the given cookies.
    #[must_use]
    pub fn with_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cookies = cookies
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            cookies: Arc::new(Mutex::new(cookies)),
        }
    }

    /// Adds a cookie and returns the context.
    #[must_use]
    pub fn with_cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_cookie(name, value);
        self
    }

    /// Returns a cookie value, if present.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar().get(name).cloned()
    }

    /// Sets a cookie, replacing any previous value.
    pub fn set_cookie(&self, name: impl Into<String>, value: impl Into<String>) {
        self.jar().insert(name.into(), value.into());
    }

    /// Removes a cookie. Does nothing if it is absent.
    pub fn remove_cookie(&self, name: &str) {
        self.jar().remove(name);
    }

    fn jar(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
