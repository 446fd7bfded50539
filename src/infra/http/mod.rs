mod confirm;
mod items;
mod middleware;
mod toasts;
mod updates;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{
    application::{gate::ConfirmationGate, hub::ToastHub, items::ItemService},
    infra::assets,
    presentation::views::render_not_found_response,
};

use middleware::{log_responses, set_request_context};

/// Selector of the item inventory panel, replaced by create/delete responses.
pub(crate) const ITEMS_PANEL: &str = "#items-panel";
/// Selector of the singleton dialog content element.
pub(crate) const CONFIRM_DIALOG: &str = "#confirm-dialog";

/// Signal patches toggling the dialog overlay.
pub(crate) const CONFIRM_OPEN_SIGNALS: &str = r#"{"confirmOpen": true}"#;
pub(crate) const CONFIRM_CLOSE_SIGNALS: &str = r#"{"confirmOpen": false}"#;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ToastHub>,
    pub gate: Arc<ConfirmationGate>,
    pub items: Arc<ItemService>,
}

pub fn build_router(state: AppState) -> Router {
    let guard_state = state.clone();
    Router::new()
        .route("/", get(redirect_to_items))
        .route("/items", get(items::items_page))
        .route("/items/create", post(items::create_item))
        .route(
            "/items/{id}/delete",
            post(items::delete_item).layer(axum_middleware::from_fn_with_state(
                guard_state,
                confirm::guard_destructive,
            )),
        )
        .route("/toasts", post(toasts::notify))
        .route("/toasts/{id}/done", post(toasts::toast_done))
        .route("/confirm/cancel", post(confirm::cancel))
        .route("/updates", get(updates::updates_stream))
        .route("/static/{*path}", get(assets::serve))
        .route("/_health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn redirect_to_items() -> Redirect {
    Redirect::to("/items")
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> Response {
    render_not_found_response().into_response()
}
