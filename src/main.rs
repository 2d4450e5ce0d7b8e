use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use postboard::{
    application::{board::BoardService, error::AppError, remote::PostsApi},
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        remote::HttpPostsApi,
        telemetry,
    },
};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
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
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or_else(|| config::Command::Serve(config::ServeArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let api: Arc<dyn PostsApi> = Arc::new(HttpPostsApi::new(settings.backend.base_url.clone())?);
    let state = HttpState::new(BoardService::new(api));
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "postboard::serve",
        addr = %settings.server.addr,
        backend = %settings.backend.base_url,
        "Listening"
    );

    let (stopping_tx, stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            let _ = stopping_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = drain_deadline(stopping_rx, settings.server.graceful_shutdown) => {
            warn!(
                target = "postboard::serve",
                grace_secs = settings.server.graceful_shutdown.as_secs(),
                "Connections still open after grace period; exiting"
            );
        }
    }

    info!(target = "postboard::serve", "Stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target = "postboard::serve", "Shutdown requested"),
        Err(err) => {
            error!(
                target = "postboard::serve",
                error = %err,
                "failed to listen for shutdown signal"
            );
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves once shutdown has started and the grace period has elapsed.
async fn drain_deadline(mut stopping: watch::Receiver<bool>, grace: Duration) {
    if stopping.wait_for(|stopping| *stopping).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
