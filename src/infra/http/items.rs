use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;

use crate::{
    application::{error::HttpError, stream::StreamBuilder},
    domain::{error::DomainError, items::Item, toasts::ToastCategory},
    presentation::views::{
        ItemRowView, ItemsPageView, ItemsPanelTemplate, ItemsTemplate, LayoutContext,
        TemplateRenderError, render_template_response,
    },
};

use super::{AppState, CONFIRM_CLOSE_SIGNALS, ITEMS_PANEL};

pub(super) async fn items_page(State(state): State<AppState>) -> Response {
    let items = state.items.list_items().await;
    let view = LayoutContext::new("Items", page_view(items));
    render_template_response(ItemsTemplate { view }, StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateItemForm {
    #[serde(default)]
    name: String,
}

pub(super) async fn create_item(
    State(state): State<AppState>,
    Form(form): Form<CreateItemForm>,
) -> Response {
    match state.items.create_item(&form.name).await {
        Ok(item) => {
            state.hub.notify(
                format!("Added `{}`.", item.name.as_str()),
                ToastCategory::success(),
            );
            match render_panel(&state).await {
                Ok(html) => {
                    let mut stream = StreamBuilder::new();
                    stream.push_patch(html, ITEMS_PANEL, ElementPatchMode::Replace);
                    stream.into_response()
                }
                Err(err) => err.into_response(),
            }
        }
        Err(DomainError::Validation { message }) => {
            state.hub.notify(message, ToastCategory::error());
            StreamBuilder::new().into_response()
        }
        Err(err) => HttpError::from_error(
            "infra::http::create_item",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Item could not be created",
            &err,
        )
        .into_response(),
    }
}

pub(super) async fn delete_item(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let mut stream = StreamBuilder::new();
    // Whatever the outcome, the dialog that authorized this submission closes.
    stream.push_signals(CONFIRM_CLOSE_SIGNALS);

    match state.items.delete_item(id).await {
        Ok(item) => {
            state.hub.notify(
                format!("Deleted `{}`.", item.name.as_str()),
                ToastCategory::success(),
            );
            match render_panel(&state).await {
                Ok(html) => {
                    stream.push_patch(html, ITEMS_PANEL, ElementPatchMode::Replace);
                    stream.into_response()
                }
                Err(err) => err.into_response(),
            }
        }
        Err(DomainError::NotFound { .. }) => {
            state
                .hub
                .notify("That item no longer exists.", ToastCategory::error());
            stream.into_response()
        }
        Err(err) => HttpError::from_error(
            "infra::http::delete_item",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Item could not be deleted",
            &err,
        )
        .into_response(),
    }
}

pub(super) async fn render_panel(state: &AppState) -> Result<String, HttpError> {
    let items = state.items.list_items().await;
    let template = ItemsPanelTemplate {
        content: page_view(items),
    };
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "infra::http::items::render_panel",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

fn page_view(items: Vec<Item>) -> ItemsPageView {
    let rows = items
        .iter()
        .map(|item| ItemRowView {
            id: item.id.to_string(),
            name: item.name.as_str().to_string(),
            created: item
                .created_at
                .format(&Rfc3339)
                .ok()
                .unwrap_or_default(),
            delete_action: format!("/items/{}/delete", item.id),
            confirm_message: format!("Delete item {}?", item.id),
        })
        .collect::<Vec<_>>();

    ItemsPageView {
        item_count: rows.len(),
        items: rows,
        create_action: "/items/create".to_string(),
    }
}
