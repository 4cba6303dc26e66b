//! Tourney Link binary entrypoint wiring the IPC poller and publisher, REST and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourney_link::{
    config::AppConfig,
    dao::lookup::{BeatmapLookup, NoopLookup},
    ipc::FileChannel,
    routes,
    services::poller::InboundPoller,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let channel = FileChannel::new(config.ipc_root.clone(), config.write_retry)
        .context("opening IPC directory")?;
    let lookup = build_lookup(&config);

    let app_state = AppState::new(config, channel, lookup);

    if app_state.config().outbound_sync {
        if let Err(err) = app_state.publisher().publish_initial().await {
            warn!(error = %err, "failed to publish initial client state");
        }
        let config = app_state.config();
        app_state
            .publisher()
            .spawn_flush_tasks(config.score_flush, config.chat_flush);
    } else {
        info!("outbound sync disabled; client feed routes will refuse writes");
    }
    InboundPoller::spawn(&app_state);

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the beatmap lookup backend from the configuration.
#[cfg(feature = "online-lookup")]
fn build_lookup(config: &AppConfig) -> Arc<dyn BeatmapLookup> {
    use tourney_link::dao::online::OnlineLookup;

    let Some(url) = config.lookup_url.as_deref() else {
        info!("no lookup service configured; unknown beatmaps stay unresolved");
        return Arc::new(NoopLookup);
    };

    match OnlineLookup::new(url) {
        Ok(lookup) => {
            info!(url, "beatmap lookup enabled");
            Arc::new(lookup)
        }
        Err(err) => {
            warn!(url, error = %err, "failed to set up beatmap lookup; continuing without it");
            Arc::new(NoopLookup)
        }
    }
}

#[cfg(not(feature = "online-lookup"))]
fn build_lookup(config: &AppConfig) -> Arc<dyn BeatmapLookup> {
    if config.lookup_url.is_some() {
        warn!("lookup_url is set but the online-lookup feature is disabled");
    }
    Arc::new(NoopLookup)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
