use time::OffsetDateTime;
use uuid::Uuid;

use super::error::DomainError;

/// Presentation tag for a toast. Open set: any lowercase tag that is safe to
/// embed in a CSS class name is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastCategory(String);

pub const DEFAULT_TOAST_CATEGORY: &str = "info";

impl ToastCategory {
    pub fn info() -> Self {
        Self(DEFAULT_TOAST_CATEGORY.to_string())
    }

    pub fn success() -> Self {
        Self("success".to_string())
    }

    pub fn error() -> Self {
        Self("error".to_string())
    }

    /// Parse a free-form tag. Blank input falls back to `info`; anything that
    /// would not survive as a `toast-<category>` class name is rejected.
    pub fn parse(tag: &str) -> Result<Self, DomainError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Ok(Self::info());
        }
        let valid = trimmed
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !valid {
            return Err(DomainError::validation(format!(
                "toast category `{trimmed}` must be lowercase ascii, digits, or dashes"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The style-selector class carried by the rendered element.
    pub fn css_class(&self) -> String {
        format!("toast-{}", self.0)
    }
}

impl Default for ToastCategory {
    fn default() -> Self {
        Self::info()
    }
}

/// A transient notification. Owned by the hub registry from creation until
/// its removal patch goes out.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub category: ToastCategory,
    pub created_at: OffsetDateTime,
}

impl Toast {
    pub fn new(message: impl Into<String>, category: ToastCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            category,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// DOM id of the rendered element, targeted by the hide and remove patches.
    pub fn element_id(&self) -> String {
        format!("toast-{}", self.id)
    }

    pub fn selector(&self) -> String {
        format!("#toast-{}", self.id)
    }
}
