use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "avviso_toasts_shown_total",
            Unit::Count,
            "Total number of toasts appended to live pages."
        );
        describe_counter!(
            "avviso_toasts_removed_total",
            Unit::Count,
            "Total number of toasts removed after their exit animation reported completion."
        );
        describe_counter!(
            "avviso_toasts_fallback_removed_total",
            Unit::Count,
            "Total number of toasts removed by the grace timeout because no completion signal arrived."
        );
        describe_counter!(
            "avviso_confirm_opened_total",
            Unit::Count,
            "Total number of confirmation dialogs opened."
        );
        describe_counter!(
            "avviso_confirm_confirmed_total",
            Unit::Count,
            "Total number of confirmations resolved by the confirm action."
        );
        describe_counter!(
            "avviso_confirm_cancelled_total",
            Unit::Count,
            "Total number of confirmations resolved by the cancel action."
        );
        describe_counter!(
            "avviso_confirm_superseded_total",
            Unit::Count,
            "Total number of pending confirmations dropped in favour of a newer request."
        );
        describe_histogram!(
            "avviso_confirm_decision_ms",
            Unit::Milliseconds,
            "Latency between opening a confirmation dialog and the user's decision."
        );
    });
}
