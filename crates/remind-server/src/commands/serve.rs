//! Serve command: runs the API, the push channel and the sweep.

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, Result};
use remind_archive::Archive;
use remind_core::EventStore;
use tokio::net::TcpListener;

use crate::Config;
use crate::fanout::Hub;
use crate::http::{self, ApiState};
use crate::scheduler::Scheduler;
use crate::ws::{self, PushState};

/// Runs the serve command until Ctrl-C.
pub fn run(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime.block_on(serve_until_shutdown(config))
}

async fn serve_until_shutdown(config: &Config) -> Result<()> {
    let api = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", config.http_addr))?;
    let push = TcpListener::bind(config.ws_addr)
        .await
        .with_context(|| format!("failed to bind push listener on {}", config.ws_addr))?;

    tokio::select! {
        result = serve(config, api, push) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            tracing::info!("shutting down");
            Ok(())
        }
    }
}

/// Serves on already-bound listeners until one of them fails.
///
/// Rejects an invalid `config` before anything is served.
pub async fn serve(config: &Config, api: TcpListener, push: TcpListener) -> Result<()> {
    config.validate()?;

    let store = Arc::new(EventStore::new());
    let hub = Hub::new(config.subscriber_buffer);
    let archive = Arc::new(Archive::open(&config.archive_path));

    let api_app = http::router(ApiState {
        store: Arc::clone(&store),
    });
    let push_app = ws::router(PushState {
        hub: hub.clone(),
        send_timeout: config.send_timeout(),
    });
    let scheduler = Scheduler::new(store, hub, archive, config.lead_minutes);

    tracing::info!(addr = %api.local_addr()?, "API listening");
    tracing::info!(addr = %push.local_addr()?, "push channel listening");
    tracing::info!(path = ?config.archive_path, "archiving completed events");

    tokio::select! {
        result = axum::serve(api, api_app).into_future() => result.context("API server failed"),
        result = axum::serve(push, push_app).into_future() => result.context("push server failed"),
        () = scheduler.run(config.sweep_interval(), config.align_to_minute) => Ok(()),
    }
}
