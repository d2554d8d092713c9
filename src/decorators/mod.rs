//! Request decorators.
//!
//! A [`Decorator`] participates in an ordered chain that runs once per
//! `call()`. Each decorator receives the fresh [`TransportHandle`] for that
//! call and the caller's [`CallContext`], and registers request and response
//! hooks on the handle. Hooks then run in registration order, so a later
//! decorator observes header changes made by an earlier one.
//!
//! The chain order is fixed: auth decorators (only for authenticated
//! requests), then global decorators, then decorators attached to the
//! individual request.
//!
//! # Bundled decorators
//!
//! - [`AddHeader`]: sets a fixed header
//! - [`AuthorizationHeader`]: forwards an auth-token cookie as a bearer header
//! - [`AutoRefresh`]: forwards a refresh token and stores rotated tokens
//!
//! # Example
//!
//! ```rust
//! use api_builder::decorators::{decorator_fn, AddHeader};
//! use api_builder::ApiBuilder;
//!
//! let mut api = ApiBuilder::from_base_url("https://api.example.com").unwrap();
//! api.add_decorator(AddHeader::new("X-Client", "web"));
//! api.add_decorator(decorator_fn(|handle, _ctx| {
//!     handle.on_request(|req| req.set_header("X-Trace", "1"));
//! }));
//! ```

mod headers;

pub use headers::{AddHeader, AuthorizationHeader, AutoRefresh};

use std::fmt;

use crate::clients::{CallContext, TransportHandle};

/// A participant in the request decoration chain.
///
/// `decorate` is called exactly once per decorator per `call()`. It should
/// only register hooks; it must not assume exclusive access to headers,
/// since other decorators in the chain may read or overwrite them.
pub trait Decorator: Send + Sync {
    /// Registers hooks on `handle` for the current call.
    fn decorate(&self, handle: &mut TransportHandle, ctx: &CallContext);
}

/// A [`Decorator`] backed by a closure. Created by [`decorator_fn`].
#[derive(Clone, Copy)]
pub struct FnDecorator<F> {
    f: F,
}

impl<F> fmt::Debug for FnDecorator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDecorator").finish_non_exhaustive()
    }
}

impl<F> Decorator for FnDecorator<F>
where
    F: Fn(&mut TransportHandle, &CallContext) + Send + Sync,
{
    fn decorate(&self, handle: &mut TransportHandle, ctx: &CallContext) {
        (self.f)(handle, ctx);
    }
}

/// Wraps a closure as a [`Decorator`].
pub const fn decorator_fn<F>(f: F) -> FnDecorator<F>
where
    F: Fn(&mut TransportHandle, &CallContext) + Send + Sync,
{
    FnDecorator { f }
}
