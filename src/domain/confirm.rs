use time::OffsetDateTime;
use uuid::Uuid;

pub const CONFIRM_TITLE: &str = "Are you sure?";
pub const DEFAULT_CONFIRM_MESSAGE: &str = "This action cannot be undone.";

/// Form field carrying the single-use confirmation token on a confirmed
/// re-submission.
pub const CONFIRM_TOKEN_FIELD: &str = "confirm_token";
/// Form field mirroring the guarded form's `data-confirm-message` attribute.
pub const CONFIRM_MESSAGE_FIELD: &str = "confirm_message";

/// Value-carrying record of an intercepted form submission. Replaces the
/// ambient "pending form" slot of the classic client-side gate: everything
/// needed to replay the POST travels with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Request path of the guarded action, e.g. `/items/7/delete`.
    pub action: String,
    /// Original urlencoded fields, token field excluded, order preserved.
    pub fields: Vec<(String, String)>,
}

/// The in-flight confirmation awaiting a user decision.
#[derive(Debug, Clone)]
pub struct ConfirmationRequest {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub submission: PendingSubmission,
    pub requested_at: OffsetDateTime,
}

impl ConfirmationRequest {
    pub fn new(message: Option<String>, submission: PendingSubmission) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIRM_MESSAGE.to_string());

        Self {
            id: Uuid::new_v4(),
            title: CONFIRM_TITLE.to_string(),
            message,
            submission,
            requested_at: OffsetDateTime::now_utc(),
        }
    }
}
