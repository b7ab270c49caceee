// Framework bootstrap for the arena server runtime.

use crate::domain::RulesTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{resize_arena_handler, spawn_arena_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ArenaHandle, ArenaSettings};

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = router(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([0, 0, 0, 0], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/admin/arena", post(resize_arena_handler))
        .with_state(state)
}

fn build_state() -> Result<Arc<AppState>> {
    let arena = config::arena()
        .map_err(|e| std::io::Error::other(format!("invalid arena configuration: {e}")))?;
    let tick_interval = config::tick_interval();
    let seed = config::seed();

    tracing::debug!(
        width = arena.width(),
        height = arena.height(),
        tick_interval_ms = tick_interval.as_millis() as u64,
        seed,
        "arena configured"
    );

    // Spawns the single authoritative world task.
    let arena = ArenaHandle::spawn(ArenaSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        world_broadcast_capacity: config::WORLD_BROADCAST_CAPACITY,
        tick_interval,
        arena,
        seed,
        rules: RulesTuning::default(),
    });
    spawn_arena_serializer(&arena);

    Ok(Arc::new(AppState { arena }))
}
