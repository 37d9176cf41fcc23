//! Integration tests for visit tracking on the link detail view
//!
//! Visit accounting is tied to the detail view, not the redirect path:
//! following a short link never moves the counters, while every detail view
//! bumps `total_visits` and the first view per session bumps
//! `unique_visits`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tinyapp::route::create_app;
use tinyapp::store::AppState;

fn setup_test_app() -> axum::Router {
    create_app(AppState::new())
}

/// Helper function to parse response body as JSON
async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

/// Extracts the session cookie from a response, ready for a Cookie header
fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("set-cookie")
        .expect("No set-cookie header in response")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Registers an account and returns the session cookie
async fn register_user(app: &axum::Router, email: &str, password: &str) -> String {
    let payload = json!({ "email": email, "password": password });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

/// Logs into an existing account from a fresh session, returns the cookie
async fn login_user(app: &axum::Router, email: &str, password: &str) -> String {
    let payload = json!({ "email": email, "password": password });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

/// Creates a link as the given session and returns its short code
async fn create_link(app: &axum::Router, cookie: &str, long_url: &str) -> String {
    let payload = json!({ "long_url": long_url });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/urls")
                .header("content-type", "application/json")
                .header("cookie", cookie)
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap();
    location.rsplit('/').next().unwrap().to_string()
}

/// Opens the detail view and returns (response status, body, new cookie if any)
async fn view_detail(
    app: &axum::Router,
    cookie: &str,
    id: &str,
) -> (StatusCode, Value, Option<String>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/urls/{}", id))
                .header("cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let refreshed = response
        .headers()
        .get("set-cookie")
        .map(|_| session_cookie(&response));
    let body = response_json(response.into_body()).await;

    (status, body, refreshed)
}

#[tokio::test]
async fn test_detail_view_counts_visits() {
    let app = setup_test_app();
    let cookie = register_user(&app, "user@example.com", "pw1").await;
    let id = create_link(&app, &cookie, "https://www.lighthouselabs.ca").await;

    // First view: one total, one unique, one timestamp
    let (status, body, refreshed) = view_detail(&app, &cookie, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["long_url"], "https://www.lighthouselabs.ca");
    assert_eq!(body["total_visits"], 1);
    assert_eq!(body["unique_visits"], 1);
    assert_eq!(body["visit_timestamps"].as_array().unwrap().len(), 1);

    // The session may have been rewritten to hold the visited marker
    let cookie = refreshed.unwrap_or(cookie);

    // Second view in the same session: total moves, unique does not
    let (status, body, _) = view_detail(&app, &cookie, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], 2);
    assert_eq!(body["unique_visits"], 1);
    assert_eq!(body["visit_timestamps"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_new_session_counts_as_unique_again() {
    let app = setup_test_app();
    let cookie = register_user(&app, "user@example.com", "pw1").await;
    let id = create_link(&app, &cookie, "https://example.com").await;

    let (_, body, _) = view_detail(&app, &cookie, &id).await;
    assert_eq!(body["unique_visits"], 1);

    // Same owner, fresh browser session: the visited marker starts empty
    let fresh_cookie = login_user(&app, "user@example.com", "pw1").await;
    let (_, body, _) = view_detail(&app, &fresh_cookie, &id).await;
    assert_eq!(body["total_visits"], 2);
    assert_eq!(body["unique_visits"], 2);
}

#[tokio::test]
async fn test_redirect_path_does_not_count() {
    let app = setup_test_app();
    let cookie = register_user(&app, "user@example.com", "pw1").await;
    let id = create_link(&app, &cookie, "https://example.com").await;

    // Follow the short link a few times
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/u/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    // The detail view reports only its own visit
    let (_, body, _) = view_detail(&app, &cookie, &id).await;
    assert_eq!(body["total_visits"], 1);
    assert_eq!(body["unique_visits"], 1);
}

#[tokio::test]
async fn test_detail_view_requires_owner() {
    let app = setup_test_app();
    let cookie_a = register_user(&app, "a@example.com", "pw1").await;
    let cookie_b = register_user(&app, "b@example.com", "pw2").await;
    let id = create_link(&app, &cookie_a, "https://example.com").await;

    // Anonymous callers are rejected before anything else
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/urls/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown ids are a 404 for logged-in callers
    let (status, _, _) = view_detail(&app, &cookie_a, "nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Another user's link is forbidden, and the rejected view leaves the
    // counters untouched
    let (status, _, _) = view_detail(&app, &cookie_b, &id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body, _) = view_detail(&app, &cookie_a, &id).await;
    assert_eq!(body["total_visits"], 1);
}
