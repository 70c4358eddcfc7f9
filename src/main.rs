use std::net::SocketAddr;

use anyhow::Context;
use kpidash::config::AppConfig;
use kpidash::db::Store;
use kpidash::AppState;
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kpidash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env();

    let store = Store::load(&config.data_path)
        .await
        .with_context(|| format!("Failed to load dataset from {}", config.data_path.display()))?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!(
        host = %addr,
        simulate_latency = config.simulate_latency,
        simulate_errors = config.simulate_errors,
        "Starting dashboard API server"
    );

    let app = kpidash::routes::router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
