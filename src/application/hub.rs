//! Toast lifecycle service: creation, timed hiding, and removal of transient
//! notification elements, pushed to live pages as datastar element patches.

use std::{sync::Arc, time::Duration};

use askama::Template;
use dashmap::DashMap;
use metrics::counter;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    domain::toasts::{Toast, ToastCategory},
    presentation::views::{ToastTemplate, ToastView},
};

pub const TOAST_CONTAINER_SELECTOR: &str = "#toast-container";

/// One datastar element patch destined for every live page.
#[derive(Debug, Clone)]
pub struct ToastPatch {
    pub selector: String,
    pub html: String,
    pub mode: ToastPatchMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPatchMode {
    /// Append a freshly created toast to the container.
    Append,
    /// Swap a visible toast for its hiding variant.
    Replace,
    /// Drop the element once its exit animation has completed.
    Remove,
}

/// Timing knobs for the toast lifecycle.
#[derive(Debug, Clone)]
pub struct ToastTimings {
    /// How long a toast stays fully visible before the hide patch goes out.
    pub display_delay: Duration,
    /// Upper bound on waiting for the exit-animation completion signal.
    pub remove_grace: Duration,
    /// Broadcast channel capacity for lifecycle patches.
    pub channel_capacity: usize,
}

impl From<&crate::config::ToastSettings> for ToastTimings {
    fn from(settings: &crate::config::ToastSettings) -> Self {
        Self {
            display_delay: settings.display_delay,
            remove_grace: settings.remove_grace,
            channel_capacity: settings.channel_capacity.get(),
        }
    }
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            display_delay: Duration::from_millis(5000),
            remove_grace: Duration::from_millis(2000),
            channel_capacity: 64,
        }
    }
}

struct ToastEntry {
    done: Option<oneshot::Sender<()>>,
}

/// Registry and broadcaster for transient notifications.
///
/// Each toast is owned by the registry from `notify` until its remove patch
/// has been broadcast. A per-toast task drives the `Visible -> Hiding ->
/// Removed` sequence; the removal happens at most once, and a missing
/// completion signal falls back to the grace timeout instead of leaking the
/// element.
pub struct ToastHub {
    timings: ToastTimings,
    updates: broadcast::Sender<ToastPatch>,
    registry: DashMap<Uuid, ToastEntry>,
}

impl ToastHub {
    pub fn new(timings: ToastTimings) -> Self {
        let (updates, _) = broadcast::channel(timings.channel_capacity.max(1));
        Self {
            timings,
            updates,
            registry: DashMap::new(),
        }
    }

    /// Subscribe a live page to the lifecycle patch stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ToastPatch> {
        self.updates.subscribe()
    }

    /// Number of live pages currently listening for patches.
    pub fn audience(&self) -> usize {
        self.updates.receiver_count()
    }

    pub fn timings(&self) -> &ToastTimings {
        &self.timings
    }

    /// Create a toast and start its lifecycle.
    ///
    /// Returns `None` without side effects when nobody is listening or the
    /// message is blank; both are silent no-ops, not errors.
    pub fn notify(
        self: &Arc<Self>,
        message: impl Into<String>,
        category: ToastCategory,
    ) -> Option<Uuid> {
        let message = message.into();
        if message.trim().is_empty() {
            debug!(target = "avviso::hub", "skipping blank toast message");
            return None;
        }
        if self.audience() == 0 {
            debug!(
                target = "avviso::hub",
                "no pages subscribed, skipping toast"
            );
            return None;
        }

        let toast = Toast::new(message, category);
        let html = match render_toast(&toast, false) {
            Ok(html) => html,
            Err(err) => {
                error!(
                    target = "avviso::hub",
                    error = %err,
                    "failed to render toast element"
                );
                return None;
            }
        };

        let (done_tx, done_rx) = oneshot::channel();
        let id = toast.id;
        self.registry.insert(id, ToastEntry { done: Some(done_tx) });

        // Send after registering so a completion signal racing in can always
        // find its entry.
        let _ = self.updates.send(ToastPatch {
            selector: TOAST_CONTAINER_SELECTOR.to_string(),
            html,
            mode: ToastPatchMode::Append,
        });
        counter!("avviso_toasts_shown_total").increment(1);

        let hub = Arc::clone(self);
        tokio::spawn(async move {
            hub.run_lifecycle(toast, done_rx).await;
        });

        Some(id)
    }

    /// Record the exit-animation completion signal for a toast.
    ///
    /// Fires at most once per toast; repeated or unknown signals return false.
    pub fn complete(&self, id: Uuid) -> bool {
        let Some(mut entry) = self.registry.get_mut(&id) else {
            return false;
        };
        match entry.done.take() {
            Some(done) => done.send(()).is_ok(),
            None => false,
        }
    }

    /// Whether a toast is still owned by the registry.
    pub fn is_registered(&self, id: Uuid) -> bool {
        self.registry.contains_key(&id)
    }

    async fn run_lifecycle(self: Arc<Self>, toast: Toast, done_rx: oneshot::Receiver<()>) {
        tokio::time::sleep(self.timings.display_delay).await;

        match render_toast(&toast, true) {
            Ok(html) => {
                let _ = self.updates.send(ToastPatch {
                    selector: toast.selector(),
                    html,
                    mode: ToastPatchMode::Replace,
                });
            }
            Err(err) => {
                error!(
                    target = "avviso::hub",
                    error = %err,
                    "failed to render hiding toast element"
                );
            }
        }

        match tokio::time::timeout(self.timings.remove_grace, done_rx).await {
            Ok(_) => {
                counter!("avviso_toasts_removed_total").increment(1);
            }
            Err(_) => {
                debug!(
                    target = "avviso::hub",
                    toast_id = %toast.id,
                    "exit animation never reported, removing after grace period"
                );
                counter!("avviso_toasts_fallback_removed_total").increment(1);
            }
        }

        self.registry.remove(&toast.id);
        let _ = self.updates.send(ToastPatch {
            selector: toast.selector(),
            html: String::new(),
            mode: ToastPatchMode::Remove,
        });
    }
}

fn render_toast(toast: &Toast, hiding: bool) -> Result<String, askama::Error> {
    let template = ToastTemplate {
        toast: ToastView {
            element_id: toast.element_id(),
            category_class: toast.category.css_class(),
            message: toast.message.clone(),
            hiding,
            done_action: format!("/toasts/{}/done", toast.id),
        },
    };
    template.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn paused_hub() -> Arc<ToastHub> {
        Arc::new(ToastHub::new(ToastTimings {
            display_delay: Duration::from_millis(5000),
            remove_grace: Duration::from_millis(2000),
            channel_capacity: 16,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn notify_without_audience_is_a_no_op() {
        let hub = paused_hub();
        assert_eq!(hub.notify("Saved!", ToastCategory::success()), None);
        assert_eq!(hub.audience(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_message_is_skipped() {
        let hub = paused_hub();
        let _rx = hub.subscribe();
        assert_eq!(hub.notify("   ", ToastCategory::info()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn notify_appends_one_toast_with_category_class() {
        let hub = paused_hub();
        let mut rx = hub.subscribe();

        let id = hub.notify("Saved!", ToastCategory::success()).expect("toast");

        let patch = rx.recv().await.expect("append patch");
        assert_eq!(patch.mode, ToastPatchMode::Append);
        assert_eq!(patch.selector, TOAST_CONTAINER_SELECTOR);
        assert!(patch.html.contains("toast toast-success"));
        assert!(patch.html.contains("Saved!"));
        assert!(patch.html.contains(&format!("toast-{id}")));
        assert!(!patch.html.contains("hide"));
        assert!(hub.is_registered(id));
    }

    #[tokio::test(start_paused = true)]
    async fn two_notifies_arrive_in_order() {
        let hub = paused_hub();
        let mut rx = hub.subscribe();

        hub.notify("first", ToastCategory::info()).expect("first");
        hub.notify("second", ToastCategory::info()).expect("second");

        let first = rx.recv().await.expect("first patch");
        let second = rx.recv().await.expect("second patch");
        assert!(first.html.contains("first"));
        assert!(second.html.contains("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn hide_patch_waits_for_display_delay() {
        let hub = paused_hub();
        let mut rx = hub.subscribe();

        hub.notify("Saved!", ToastCategory::info()).expect("toast");
        let _append = rx.recv().await.expect("append patch");

        // Nothing further before the delay elapses.
        let early = tokio::time::timeout(Duration::from_millis(4999), rx.recv()).await;
        assert!(early.is_err());

        let hide = rx.recv().await.expect("hide patch");
        assert_eq!(hide.mode, ToastPatchMode::Replace);
        assert!(hide.html.contains("hide"));
        assert!(hide.html.contains("data-on-animationend"));
    }

    #[tokio::test(start_paused = true)]
    async fn remove_follows_completion_signal_and_clears_registry() {
        let hub = paused_hub();
        let mut rx = hub.subscribe();

        let id = hub.notify("bye", ToastCategory::info()).expect("toast");
        let _append = rx.recv().await.expect("append patch");
        let _hide = rx.recv().await.expect("hide patch");

        assert!(hub.complete(id));
        // The signal fires at most once.
        assert!(!hub.complete(id));

        let remove = rx.recv().await.expect("remove patch");
        assert_eq!(remove.mode, ToastPatchMode::Remove);
        assert_eq!(remove.selector, format!("#toast-{id}"));

        // Registry entry is gone and no further patches arrive.
        tokio::task::yield_now().await;
        assert!(!hub.is_registered(id));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_completion_signal_falls_back_to_grace_timeout() {
        let hub = paused_hub();
        let mut rx = hub.subscribe();

        let id = hub.notify("stuck", ToastCategory::error()).expect("toast");
        let _append = rx.recv().await.expect("append patch");
        let _hide = rx.recv().await.expect("hide patch");

        // Never call complete; the grace timeout must still remove it.
        let remove = rx.recv().await.expect("remove patch");
        assert_eq!(remove.mode, ToastPatchMode::Remove);
        tokio::task::yield_now().await;
        assert!(!hub.is_registered(id));
    }
}
