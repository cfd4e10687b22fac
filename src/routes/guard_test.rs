use axum::Router;
use axum::http::{StatusCode, header};
use axum::routing::get;
use tower::ServiceExt;

use super::*;

#[test]
fn protected_pages_need_a_token() {
    for path in PROTECTED_PAGES {
        assert_eq!(evaluate(path, false), GuardDecision::Redirect("/login"), "{path}");
        assert_eq!(evaluate(path, true), GuardDecision::Pass, "{path}");
    }
}

#[test]
fn nested_pages_are_protected() {
    assert_eq!(evaluate("/asignacion-presupuestal/7", false), GuardDecision::Redirect("/login"));
    assert_eq!(evaluate("/dashboard/", false), GuardDecision::Redirect("/login"));
}

#[test]
fn auth_pages_bounce_signed_in_users() {
    assert_eq!(evaluate("/login", true), GuardDecision::Redirect("/dashboard"));
    assert_eq!(evaluate("/register", true), GuardDecision::Redirect("/dashboard"));
    assert_eq!(evaluate("/login", false), GuardDecision::Pass);
}

#[test]
fn prefix_must_end_at_segment_boundary() {
    assert_eq!(evaluate("/dashboards", false), GuardDecision::Pass);
    assert_eq!(evaluate("/loginx", true), GuardDecision::Pass);
    assert_eq!(evaluate("/evcs-public", false), GuardDecision::Pass);
}

#[test]
fn api_static_and_health_are_never_guarded() {
    for path in ["/api/auth/login", "/api/providers", "/healthz", "/favicon.ico", "/assets/app.js", "/"] {
        assert_eq!(evaluate(path, false), GuardDecision::Pass, "{path}");
        assert_eq!(evaluate(path, true), GuardDecision::Pass, "{path}");
    }
}

fn guarded() -> Router {
    Router::new()
        .route("/dashboard", get(|| async { "dashboard" }))
        .route("/login", get(|| async { "login" }))
        .layer(axum::middleware::from_fn(guard_pages))
}

fn request(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn middleware_redirects_with_see_other() {
    let response = guarded().oneshot(request("/dashboard", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = guarded().oneshot(request("/login", Some("auth_token=abc"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn middleware_passes_through() {
    let response = guarded().oneshot(request("/dashboard", Some("auth_token=abc"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // An empty cookie value counts as no token.
    let response = guarded().oneshot(request("/dashboard", Some("auth_token="))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
