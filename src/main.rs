//! Candidate Mention Ranker — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use candidate_mention_ranker::{api, config::AppConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when variables come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Refuses to start on a missing or placeholder NEWSAPI_KEY.
    let cfg = AppConfig::from_env()?;
    let state = api::AppState::from_config(&cfg);
    let router = api::router(&cfg, state);

    info!(
        port = cfg.port,
        candidates = cfg.candidates.len(),
        domains = cfg.domains.len(),
        origins = ?cfg.allowed_origins,
        "candidate mention ranker starting"
    );

    let listener = TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("binding port {}", cfg.port))?;
    info!("listening on http://0.0.0.0:{}", cfg.port);

    axum::serve(listener, router).await?;
    Ok(())
}
