use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{application::error::HttpError, domain::toasts::ToastCategory};

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct NotifyForm {
    #[serde(default)]
    message: String,
    #[serde(default)]
    category: Option<String>,
}

/// The notify seam: schedule a toast for every live page.
pub(super) async fn notify(
    State(state): State<AppState>,
    Form(form): Form<NotifyForm>,
) -> Response {
    let category = match ToastCategory::parse(form.category.as_deref().unwrap_or_default()) {
        Ok(category) => category,
        Err(err) => {
            return HttpError::from_error(
                "infra::http::toasts::notify",
                StatusCode::BAD_REQUEST,
                "Invalid toast category",
                &err,
            )
            .into_response();
        }
    };

    // A missing audience or blank message degrades to a no-op, not an error.
    state.hub.notify(form.message, category);
    StatusCode::NO_CONTENT.into_response()
}

/// Exit-animation completion signal for one toast.
pub(super) async fn toast_done(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if !state.hub.complete(id) {
        debug!(
            target = "avviso::http::toasts",
            toast_id = %id,
            "completion signal for unknown or already completed toast"
        );
    }
    StatusCode::NO_CONTENT
}
