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

fn test_state(seed: &[&str]) -> AppState {
    let store = Arc::new(InMemoryItemStore::with_items(seed.iter().copied()));
    AppState {
        hub: Arc::new(ToastHub::new(ToastTimings::default())),
        gate: Arc::new(ConfirmationGate::new()),
        items: Arc::new(ItemService::new(store)),
    }
}

fn test_router(state: &AppState) -> Router {
    build_router(state.clone())
}

fn form_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collected body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

fn extract_token(body: &str) -> String {
    let marker = "name=\"confirm_token\" value=\"";
    let start = body.find(marker).expect("token field in dialog") + marker.len();
    body[start..start + 36].to_string()
}

async fn first_item_id(state: &AppState) -> u32 {
    state.items.list_items().await.first().expect("seeded item").id
}

#[tokio::test]
async fn guarded_delete_without_token_opens_dialog_instead_of_deleting() {
    let state = test_state(&["ledger"]);
    let id = first_item_id(&state).await;

    let response = test_router(&state)
        .oneshot(form_request(
            &format!("/items/{id}/delete"),
            &format!("confirm_message=Delete+item+{id}%3F"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Are you sure?"));
    assert!(body.contains(&format!("Delete item {id}?")));
    assert!(body.contains("popup-cancel btn btn-yellow"));
    assert!(body.contains("popup-confirm btn btn-red"));
    assert!(body.contains("confirmOpen"));
    assert!(body.contains("true"));

    // Nothing was deleted and a confirmation is now pending.
    assert_eq!(state.items.list_items().await.len(), 1);
    assert!(!state.gate.is_idle());
}

#[tokio::test]
async fn confirming_with_the_issued_token_deletes_exactly_once() {
    let state = test_state(&["ledger", "notebook"]);
    let id = first_item_id(&state).await;
    let action = format!("/items/{id}/delete");
    let message = format!("confirm_message=Delete+item+{id}%3F");

    let dialog = test_router(&state)
        .oneshot(form_request(&action, &message))
        .await
        .expect("dialog response");
    let token = extract_token(&body_string(dialog).await);

    let confirmed = test_router(&state)
        .oneshot(form_request(
            &action,
            &format!("{message}&confirm_token={token}"),
        ))
        .await
        .expect("confirmed response");
    assert_eq!(confirmed.status(), StatusCode::OK);
    let body = body_string(confirmed).await;

    assert!(body.contains("items-panel"));
    assert!(!body.contains("ledger"));
    assert!(body.contains("confirmOpen"));

    assert_eq!(state.items.list_items().await.len(), 1);
    assert!(state.gate.is_idle());

    // Replaying the token is stale: no second deletion, dialog just closes.
    let replay = test_router(&state)
        .oneshot(form_request(
            &action,
            &format!("{message}&confirm_token={token}"),
        ))
        .await
        .expect("replay response");
    assert_eq!(replay.status(), StatusCode::OK);
    assert_eq!(state.items.list_items().await.len(), 1);
    assert!(state.gate.is_idle());
}

#[tokio::test]
async fn cancel_closes_the_dialog_without_submitting() {
    let state = test_state(&["ledger"]);
    let id = first_item_id(&state).await;

    let _dialog = test_router(&state)
        .oneshot(form_request(
            &format!("/items/{id}/delete"),
            "confirm_message=Delete%3F",
        ))
        .await
        .expect("dialog response");
    assert!(!state.gate.is_idle());

    let response = test_router(&state)
        .oneshot(form_request("/confirm/cancel", ""))
        .await
        .expect("cancel response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("confirmOpen"));
    assert!(body.contains("false"));

    assert!(state.gate.is_idle());
    assert_eq!(state.items.list_items().await.len(), 1);
}

#[tokio::test]
async fn missing_custom_message_falls_back_to_default() {
    let state = test_state(&["ledger"]);
    let id = first_item_id(&state).await;

    let response = test_router(&state)
        .oneshot(form_request(&format!("/items/{id}/delete"), ""))
        .await
        .expect("response");
    let body = body_string(response).await;
    assert!(body.contains("This action cannot be undone."));
}

#[tokio::test]
async fn second_submission_supersedes_the_first_pending_request() {
    let state = test_state(&["ledger", "notebook"]);
    let items = state.items.list_items().await;
    let (first, second) = (items[0].id, items[1].id);

    let first_dialog = test_router(&state)
        .oneshot(form_request(&format!("/items/{first}/delete"), ""))
        .await
        .expect("first dialog");
    let first_token = extract_token(&body_string(first_dialog).await);

    let second_dialog = test_router(&state)
        .oneshot(form_request(&format!("/items/{second}/delete"), ""))
        .await
        .expect("second dialog");
    let second_token = extract_token(&body_string(second_dialog).await);

    // The superseded token no longer authorizes its action.
    let stale = test_router(&state)
        .oneshot(form_request(
            &format!("/items/{first}/delete"),
            &format!("confirm_token={first_token}"),
        ))
        .await
        .expect("stale response");
    assert_eq!(stale.status(), StatusCode::OK);
    assert_eq!(state.items.list_items().await.len(), 2);

    // The live token still works.
    let confirmed = test_router(&state)
        .oneshot(form_request(
            &format!("/items/{second}/delete"),
            &format!("confirm_token={second_token}"),
        ))
        .await
        .expect("confirmed response");
    assert_eq!(confirmed.status(), StatusCode::OK);

    let remaining = state.items.list_items().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first);
}

#[tokio::test]
async fn token_for_one_action_does_not_authorize_another() {
    let state = test_state(&["ledger", "notebook"]);
    let items = state.items.list_items().await;
    let (first, second) = (items[0].id, items[1].id);

    let dialog = test_router(&state)
        .oneshot(form_request(&format!("/items/{first}/delete"), ""))
        .await
        .expect("dialog");
    let token = extract_token(&body_string(dialog).await);

    // Using the token against a different item's action is stale.
    let response = test_router(&state)
        .oneshot(form_request(
            &format!("/items/{second}/delete"),
            &format!("confirm_token={token}"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.items.list_items().await.len(), 2);
}
