use std::{process, sync::Arc};

use avviso::{
    application::{
        error::AppError,
        gate::ConfirmationGate,
        hub::{ToastHub, ToastTimings},
        items::ItemService,
    },
    config,
    infra::{
        error::InfraError,
        http::{self, AppState},
        store::InMemoryItemStore,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_app_state(&settings);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "avviso::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let router = http::build_router(state);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

fn build_app_state(settings: &config::Settings) -> AppState {
    let store = Arc::new(InMemoryItemStore::new());
    AppState {
        hub: Arc::new(ToastHub::new(ToastTimings::from(&settings.toasts))),
        gate: Arc::new(ConfirmationGate::new()),
        items: Arc::new(ItemService::new(store)),
    }
}

async fn shutdown_signal(grace: std::time::Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(
        target = "avviso::serve",
        grace_seconds = grace.as_secs(),
        "shutdown signal received, draining connections"
    );
}
