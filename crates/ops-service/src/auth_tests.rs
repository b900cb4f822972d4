use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use ops_core::repo::Repo;
use tower::ServiceExt;

fn guarded_router(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(|| async { "ok" }))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = guarded_router(AppState::new(Repo::new(dir.path()), "secret-token"));
    let request = Request::builder().uri("/probe").body(Body::empty()).expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = guarded_router(AppState::new(Repo::new(dir.path()), "secret-token"));
    let request = Request::builder()
        .uri("/probe")
        .header(TOKEN_HEADER, "not-the-token")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn correct_token_is_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = guarded_router(AppState::new(Repo::new(dir.path()), "secret-token"));
    let request = Request::builder()
        .uri("/probe")
        .header(TOKEN_HEADER, "secret-token")
        .body(Body::empty())
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
