use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response() -> Response {
    let view = LayoutContext::new("Not found", ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub title: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(title: impl Into<String>, content: T) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }
}

/// A single rendered toast element. The hiding variant carries the marker
/// class and the animation-completion hook.
#[derive(Clone)]
pub struct ToastView {
    pub element_id: String,
    pub category_class: String,
    pub message: String,
    pub hiding: bool,
    pub done_action: String,
}

#[derive(Template)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub toast: ToastView,
}

#[derive(Clone)]
pub struct ItemRowView {
    pub id: String,
    pub name: String,
    pub created: String,
    pub delete_action: String,
    pub confirm_message: String,
}

#[derive(Clone)]
pub struct ItemsPageView {
    pub items: Vec<ItemRowView>,
    pub item_count: usize,
    pub create_action: String,
}

#[derive(Template)]
#[template(path = "items.html")]
pub struct ItemsTemplate {
    pub view: LayoutContext<ItemsPageView>,
}

#[derive(Template)]
#[template(path = "partials/items_panel.html")]
pub struct ItemsPanelTemplate {
    pub content: ItemsPageView,
}

#[derive(Clone)]
pub struct HiddenFieldView {
    pub name: String,
    pub value: String,
}

/// Content of the singleton confirmation dialog for one pending request.
#[derive(Clone)]
pub struct ConfirmDialogView {
    pub title: String,
    pub message: String,
    pub action: String,
    pub fields: Vec<HiddenFieldView>,
    pub cancel_action: String,
}

#[derive(Template)]
#[template(path = "partials/confirm_dialog.html")]
pub struct ConfirmDialogTemplate {
    pub content: ConfirmDialogView,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub home_href: String,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            home_href: "/items".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
