use std::sync::Arc;

use avviso::{
    application::{
        gate::ConfirmationGate,
        hub::{ToastHub, ToastTimings},
        items::ItemService,
    },
    infra::{
        http::{AppState, build_router},
        store::InMemoryItemStore,
    },
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

fn test_router() -> (Router, AppState) {
    let state = AppState {
        hub: Arc::new(ToastHub::new(ToastTimings::default())),
        gate: Arc::new(ConfirmationGate::new()),
        items: Arc::new(ItemService::new(Arc::new(InMemoryItemStore::with_items([
            "ledger",
        ])))),
    };
    (build_router(state.clone()), state)
}

fn post_form(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn notify_accepts_a_valid_submission() {
    let (router, state) = test_router();
    let _rx = state.hub.subscribe();

    let response = router
        .oneshot(post_form("/toasts", "message=Saved%21&category=success"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn notify_rejects_an_unsafe_category() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(post_form("/toasts", "message=hi&category=Not%20Safe"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notify_with_blank_message_is_a_quiet_no_op() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(post_form("/toasts", "message=&category="))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn done_signal_for_an_unknown_toast_is_accepted() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(post_form(&format!("/toasts/{}/done", Uuid::new_v4()), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn items_page_carries_the_notification_scaffolding() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/items")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = String::from_utf8(bytes.to_vec()).expect("utf8 body");

    assert!(body.contains("id=\"toast-container\""));
    assert!(body.contains("popup-overlay"));
    assert!(body.contains("@get('/updates')"));
    assert!(body.contains("delete-form"));
    assert!(body.contains("data-confirm-message=\"Delete item 1?\""));
    assert!(body.contains("ledger"));
}

#[tokio::test]
async fn create_item_patches_the_panel() {
    let (router, state) = test_router();

    let response = router
        .oneshot(post_form("/items/create", "name=notebook"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = String::from_utf8(bytes.to_vec()).expect("utf8 body");
    assert!(body.contains("notebook"));
    assert!(body.contains("items-panel"));

    assert_eq!(state.items.list_items().await.len(), 2);
}

#[tokio::test]
async fn create_item_with_blank_name_changes_nothing() {
    let (router, state) = test_router();

    let response = router
        .oneshot(post_form("/items/create", "name=++"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.items.list_items().await.len(), 1);
}

#[tokio::test]
async fn health_endpoint_answers_no_content() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/_health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unknown_route_renders_the_error_page() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/nowhere")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
