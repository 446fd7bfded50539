use askama::Template;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::{
    application::{error::HttpError, stream::StreamBuilder},
    domain::confirm::{
        CONFIRM_MESSAGE_FIELD, CONFIRM_TOKEN_FIELD, ConfirmationRequest, PendingSubmission,
    },
    presentation::views::{ConfirmDialogTemplate, ConfirmDialogView, HiddenFieldView},
};

use super::{AppState, CONFIRM_CLOSE_SIGNALS, CONFIRM_DIALOG, CONFIRM_OPEN_SIGNALS};

/// Interceptor layered over destructive routes.
///
/// A submission carrying a token the gate accepts for this action passes
/// through once; anything else is suppressed and answered with the dialog.
pub(super) async fn guard_destructive(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return HttpError::new(
                "infra::http::confirm::guard_destructive",
                StatusCode::BAD_REQUEST,
                "Request body could not be read",
                err.to_string(),
            )
            .into_response();
        }
    };

    let fields: Vec<(String, String)> = url::form_urlencoded::parse(&bytes)
        .into_owned()
        .collect();
    let action = parts.uri.path().to_string();

    let token = fields
        .iter()
        .find(|(name, _)| name == CONFIRM_TOKEN_FIELD)
        .and_then(|(_, value)| Uuid::parse_str(value).ok());

    if let Some(token) = token
        && state.gate.confirm(token, &action).is_some()
    {
        // The one genuine submission: replay the buffered request.
        let request = Request::from_parts(parts, Body::from(bytes));
        return next.run(request).await;
    }

    if token.is_some() {
        // Stale token: raced double-click or a superseded dialog. Skip the
        // action and just close the dialog.
        let mut stream = StreamBuilder::new();
        stream.push_signals(CONFIRM_CLOSE_SIGNALS);
        return stream.into_response();
    }

    open_dialog(&state, action, fields)
}

fn open_dialog(state: &AppState, action: String, fields: Vec<(String, String)>) -> Response {
    let message = fields
        .iter()
        .find(|(name, _)| name == CONFIRM_MESSAGE_FIELD)
        .map(|(_, value)| value.clone());

    let retained: Vec<(String, String)> = fields
        .into_iter()
        .filter(|(name, _)| name != CONFIRM_TOKEN_FIELD)
        .collect();

    let request = ConfirmationRequest::new(
        message,
        PendingSubmission {
            action: action.clone(),
            fields: retained.clone(),
        },
    );
    let title = request.title.clone();
    let dialog_message = request.message.clone();
    let issued = state.gate.begin(request);

    let mut hidden = retained
        .into_iter()
        .map(|(name, value)| HiddenFieldView { name, value })
        .collect::<Vec<_>>();
    hidden.push(HiddenFieldView {
        name: CONFIRM_TOKEN_FIELD.to_string(),
        value: issued.token.to_string(),
    });

    let template = ConfirmDialogTemplate {
        content: ConfirmDialogView {
            title,
            message: dialog_message,
            action,
            fields: hidden,
            cancel_action: "/confirm/cancel".to_string(),
        },
    };

    let html = match template.render() {
        Ok(html) => html,
        Err(err) => {
            return HttpError::from_error(
                "infra::http::confirm::open_dialog",
                StatusCode::INTERNAL_SERVER_ERROR,
                "Template rendering failed",
                &err,
            )
            .into_response();
        }
    };

    let mut stream = StreamBuilder::new();
    stream.push_patch(html, CONFIRM_DIALOG, ElementPatchMode::Inner);
    stream.push_signals(CONFIRM_OPEN_SIGNALS);
    stream.into_response()
}

/// Dismiss the pending confirmation without submitting anything.
pub(super) async fn cancel(State(state): State<AppState>) -> Response {
    state.gate.cancel();

    let mut stream = StreamBuilder::new();
    stream.push_signals(CONFIRM_CLOSE_SIGNALS);
    stream.into_response()
}
