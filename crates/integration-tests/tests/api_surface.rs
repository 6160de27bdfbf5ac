//! Router-level tests that need no live database.
//!
//! Each test drives the assembled router with `oneshot`. Everything here
//! exercises code that runs before any query: health, cookie/JWT gating
//! and request validation.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use attara_integration_tests::test_app;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_returns_ok() {
    let response = test_app().oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    for uri in [
        "/auth/me",
        "/addresses",
        "/cart",
        "/orders",
        "/wallet",
        "/vendor/profile",
        "/admin/users",
    ] {
        let response = test_app().oneshot(get(uri)).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {uri}");

        let body = body_json(response).await;
        assert!(body.get("error").is_some(), "GET {uri} error body");
    }
}

#[tokio::test]
async fn category_management_requires_a_session() {
    let body = serde_json::json!({ "name": "Attars", "slug": "attars" });
    let response = test_app()
        .oneshot(post_json("/admin/categories", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("DELETE")
        .uri("/admin/categories/1")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let request = Request::builder()
        .uri("/auth/me")
        .header(header::COOKIE, "attara_token=not-a-real-jwt")
        .body(Body::empty())
        .expect("request");

    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "correct horse battery",
        "full_name": "Amina",
    });
    let response = test_app()
        .oneshot(post_json("/auth/register", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let body = serde_json::json!({
        "email": "amina@example.com",
        "password": "short",
        "full_name": "Amina",
    });
    let response = test_app()
        .oneshot(post_json("/auth/register", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("password"), "got: {message}");
}

#[tokio::test]
async fn register_rejects_blank_name() {
    let body = serde_json::json!({
        "email": "amina@example.com",
        "password": "correct horse battery",
        "full_name": "   ",
    });
    let response = test_app()
        .oneshot(post_json("/auth/register", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let body = serde_json::json!({});
    let response = test_app()
        .oneshot(post_json("/auth/logout", &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie string");
    assert!(set_cookie.starts_with("attara_token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = test_app()
        .oneshot(get("/no-such-route"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
