use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use datastar::prelude::{ElementPatchMode, PatchElements};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::application::hub::{ToastPatch, ToastPatchMode};

use super::AppState;

/// Long-lived stream of toast lifecycle patches, one per live page.
pub(super) async fn updates_stream(State(state): State<AppState>) -> Response {
    let mut rx = state.hub.subscribe();

    let stream = stream! {
        loop {
            match rx.recv().await {
                Ok(patch) => yield Ok::<Event, Infallible>(patch_event(patch)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        target = "avviso::http::updates",
                        skipped, "subscriber lagged behind the toast patch stream"
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

fn patch_event(patch: ToastPatch) -> Event {
    let mode = match patch.mode {
        ToastPatchMode::Append => ElementPatchMode::Append,
        ToastPatchMode::Replace => ElementPatchMode::Replace,
        ToastPatchMode::Remove => ElementPatchMode::Remove,
    };
    PatchElements::new(patch.html)
        .selector(&patch.selector)
        .mode(mode)
        .write_as_axum_sse_event()
}
