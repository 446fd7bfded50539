//! Confirmation gate: the single pending-confirmation slot shared by every
//! guarded form on the site.

use std::sync::Mutex;

use metrics::{counter, histogram};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::domain::confirm::ConfirmationRequest;

struct ActivePending {
    token: Uuid,
    request: ConfirmationRequest,
}

/// Outcome of opening a confirmation dialog.
#[derive(Debug, Clone, Copy)]
pub struct IssuedConfirmation {
    /// Single-use token the confirmed re-submission must carry.
    pub token: Uuid,
    /// True when an earlier pending request was dropped to make room.
    pub superseded: bool,
}

/// At most one confirmation is pending at a time. A second guarded
/// submission while one is open supersedes it: the prior token goes stale
/// and its dialog content is overwritten. Constructed once at startup and
/// injected through router state.
pub struct ConfirmationGate {
    pending: Mutex<Option<ActivePending>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    /// Open a confirmation for the supplied request, invalidating any prior
    /// pending one.
    pub fn begin(&self, request: ConfirmationRequest) -> IssuedConfirmation {
        let token = Uuid::new_v4();
        let prior = self
            .lock()
            .replace(ActivePending { token, request });

        let superseded = prior.is_some();
        if let Some(prior) = prior {
            warn!(
                target = "avviso::gate",
                action = %prior.request.submission.action,
                "pending confirmation superseded by a newer request"
            );
            counter!("avviso_confirm_superseded_total").increment(1);
        }
        counter!("avviso_confirm_opened_total").increment(1);

        IssuedConfirmation { token, superseded }
    }

    /// Consume the pending request if the token authorizes this action.
    ///
    /// Returns the request exactly once; stale tokens (superseded, replayed,
    /// or issued for a different action) leave the slot untouched and yield
    /// `None`.
    pub fn confirm(&self, token: Uuid, action: &str) -> Option<ConfirmationRequest> {
        let mut pending = self.lock();
        let matches = pending
            .as_ref()
            .is_some_and(|active| active.token == token && active.request.submission.action == action);
        if !matches {
            return None;
        }

        let active = pending.take()?;
        counter!("avviso_confirm_confirmed_total").increment(1);
        record_decision_latency(&active.request);
        Some(active.request)
    }

    /// Dismiss the pending request, if any, without submitting.
    pub fn cancel(&self) -> Option<ConfirmationRequest> {
        let active = self.lock().take()?;
        counter!("avviso_confirm_cancelled_total").increment(1);
        record_decision_latency(&active.request);
        Some(active.request)
    }

    /// True when no confirmation is pending.
    pub fn is_idle(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActivePending>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

fn record_decision_latency(request: &ConfirmationRequest) {
    let elapsed = OffsetDateTime::now_utc() - request.requested_at;
    let millis = elapsed.whole_milliseconds().max(0) as f64;
    histogram!("avviso_confirm_decision_ms").record(millis);
}
