// Framework bootstrap for the relay runtime.

use crate::frameworks::config::{self, LogFormat};
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::protocol::JsonEncoder;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{InMemoryRegistry, MessageRouter};

use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match config::log_format() {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Compact => builder.compact().init(),
    }

    // Panics inside connection tasks would otherwise only reach stderr.
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "relay task panicked");
    }));
}

pub fn app(state: Arc<AppState>) -> Router {
    // Clients connect to the bare host; `/ws` is kept for proxies that route by path.
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let app = app(build_state());

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::bind_addr(), config::http_port());

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let outbound_capacity = config::outbound_capacity();
    tracing::debug!(outbound_capacity, "relay configured");

    // The registry lives as long as the server; every connection shares it.
    let registry = Arc::new(InMemoryRegistry::new());
    Arc::new(AppState {
        router: MessageRouter::new(registry, Arc::new(JsonEncoder)),
        outbound_capacity,
    })
}
