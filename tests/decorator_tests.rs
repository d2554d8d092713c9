//! Integration tests for the decorator chain.
//!
//! These tests verify chain ordering (auth, global, local), header
//! visibility between decorators, and the bundled token decorators.

use api_builder::clients::TransportHandle;
use api_builder::decorators::{
    decorator_fn, AddHeader, AuthorizationHeader, AutoRefresh, Decorator,
};
use api_builder::{ApiBuilder, CallContext, CallError};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A decorator that appends `tag` to the `x-chain` request header.
fn append_tag(tag: &'static str) -> impl Decorator {
    decorator_fn(move |handle: &mut TransportHandle, _: &CallContext| {
        handle.on_request(move |req| {
            let chain = req
                .header("x-chain")
                .map_or_else(|| tag.to_string(), |chain| format!("{chain}-{tag}"));
            req.set_header("x-chain", chain);
        });
    })
}

fn api(server: &MockServer) -> ApiBuilder {
    ApiBuilder::from_base_url(server.uri()).unwrap()
}

// ============================================================================
// Chain ordering
// ============================================================================

#[tokio::test]
async fn test_chain_runs_auth_then_global_then_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-chain", "a-b-c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(append_tag("a"));
    api.add_decorator(append_tag("b"));

    let result = api
        .auth()
        .get("me")
        .decorate(append_tag("c"))
        .call(&CallContext::new())
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_unauthenticated_request_skips_auth_chain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public"))
        .and(header("x-chain", "b-c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(append_tag("a"));
    api.add_decorator(append_tag("b"));

    let result = api
        .get("public")
        .decorate(append_tag("c"))
        .call(&CallContext::new())
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_later_decorator_overwrites_earlier_header() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .and(header("x-who", "global"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AddHeader::new("X-Who", "auth"));
    api.add_decorator(AddHeader::new("x-who", "global"));

    let result = api
        .auth()
        .delete("items/1")
        .call(&CallContext::new())
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("accept", "application/json"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = api(&server)
        .get("ping")
        .call(&CallContext::new())
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_invalid_header_is_a_call_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = api(&server)
        .get("ping")
        .decorate(AddHeader::new("x-bad", "line\nbreak"))
        .call(&CallContext::new())
        .await;

    assert!(matches!(result, Err(CallError::InvalidHeader { name }) if name == "x-bad"));
}

// ============================================================================
// AuthorizationHeader
// ============================================================================

#[tokio::test]
async fn test_authorization_header_forwards_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AuthorizationHeader::new());
    let ctx = CallContext::new().with_cookie("auth-token", "abc");

    let result = api.auth().get("me").call(&ctx).await.unwrap();

    assert_eq!(result.data(), Some(&serde_json::json!({"id": 7})));
    assert_eq!(ctx.cookie("auth-token").as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_authorization_header_without_cookie_sends_nothing() {
    let server = MockServer::start().await;
    // Mounted first, so it wins whenever the header is present
    Mock::given(method("GET"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AuthorizationHeader::new());

    let result = api.auth().get("me").call(&CallContext::new()).await.unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_authorization_header_custom_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-api-token", "Token s3cret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(
        AuthorizationHeader::new()
            .header("X-Api-Token")
            .cookie("session")
            .format_token(|token| format!("Token {token}")),
    );
    let ctx = CallContext::new().with_cookie("session", "s3cret");

    let result = api.auth().get("me").call(&ctx).await.unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn test_unauthorized_response_clears_auth_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AuthorizationHeader::new());
    let ctx = CallContext::new()
        .with_cookie("auth-token", "stale")
        .with_cookie("theme", "dark");

    let result = api.auth().get("me").call(&ctx).await.unwrap();

    assert!(result.is_failure());
    assert_eq!(result.status(), 401);
    assert_eq!(ctx.cookie("auth-token"), None);
    assert_eq!(ctx.cookie("theme").as_deref(), Some("dark"));
}

// ============================================================================
// AutoRefresh
// ============================================================================

#[tokio::test]
async fn test_auto_refresh_sends_and_rotates_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-refresh-token", "r1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-set-auth-token", "a2")
                .insert_header("x-set-refresh-token", "r2"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AutoRefresh::new());
    let ctx = CallContext::new()
        .with_cookie("auth-token", "a1")
        .with_cookie("refresh-token", "r1");

    let result = api.auth().get("me").call(&ctx).await.unwrap();

    assert!(result.is_success());
    assert_eq!(ctx.cookie("auth-token").as_deref(), Some("a2"));
    assert_eq!(ctx.cookie("refresh-token").as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_auto_refresh_stores_tokens_from_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(403).insert_header("x-set-auth-token", "a2"))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AutoRefresh::new());
    let ctx = CallContext::new().with_cookie("auth-token", "a1");

    let result = api.auth().get("me").call(&ctx).await.unwrap();

    assert!(result.is_failure());
    assert_eq!(ctx.cookie("auth-token").as_deref(), Some("a2"));
}

#[tokio::test]
async fn test_auto_refresh_ignores_tokens_on_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("x-set-auth-token", "a2")
                .insert_header("x-set-refresh-token", "r2"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AutoRefresh::new());
    let ctx = CallContext::new()
        .with_cookie("auth-token", "a1")
        .with_cookie("refresh-token", "r1");

    api.auth().get("me").call(&ctx).await.unwrap();

    assert_eq!(ctx.cookie("auth-token").as_deref(), Some("a1"));
    assert_eq!(ctx.cookie("refresh-token").as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_auto_refresh_then_authorization_header_uses_refreshed_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer a1"))
        .and(header("x-refresh-token", "r1"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-set-auth-token", "a2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = api(&server);
    api.add_auth_decorator(AutoRefresh::new());
    api.add_auth_decorator(AuthorizationHeader::new());
    let ctx = CallContext::new()
        .with_cookie("auth-token", "a1")
        .with_cookie("refresh-token", "r1");

    assert!(api.auth().get("me").call(&ctx).await.unwrap().is_success());
    assert!(api.auth().get("me").call(&ctx).await.unwrap().is_success());
}
