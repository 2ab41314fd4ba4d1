use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use exam_hero_api::config::{AppConfig, StoreBackend};
use exam_hero_api::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "exam-hero-api")]
#[command(about = "Exam Hero content API server")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, short, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, help = "Document store backend (overrides STORE_BACKEND)")]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, DB_* etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config: AppConfig = exam_hero_api::config::config().clone();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(store) = cli.store {
        config.database.backend = store;
    }

    tracing::info!("Starting Exam Hero API in {:?} mode", config.environment);

    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open document store")?;

    let app = exam_hero_api::app(store, &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Exam Hero API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
