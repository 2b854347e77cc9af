//! Alex PR Attributer Gateway — server relay.
//! Holds the provider credential, serves the UI and answers `/api/generate`.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use attributer_core::{AnthropicMessages, RelayConfig, Responder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credential lives in the backend only; the browser never sees it.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[attributer-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RelayConfig::load()?;
    let profile = cfg.style_profile()?;

    let provider = match AnthropicMessages::from_env(cfg.request_timeout()) {
        Some(p) => p,
        None => {
            tracing::warn!(
                "ANTHROPIC_API_KEY is not set; /api/generate will fail until it is configured"
            );
            AnthropicMessages::new("", cfg.request_timeout())
        }
    }
    .with_base_url(&cfg.api_base_url);

    let responder = Responder::new(Arc::new(provider), profile)
        .with_model(&cfg.model)
        .with_max_tokens(cfg.max_tokens);

    let state = Arc::new(AppState {
        responder,
        gate: cfg.gate(),
        base_path: cfg.base_path.clone(),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(
        addr = %cfg.bind_addr,
        base_path = %cfg.base_path,
        model = %cfg.model,
        "attributer gateway listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
