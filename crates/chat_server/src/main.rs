use std::env;
use std::sync::Arc;

use chat_core::Config;
use history_store::{ChatHistoryStore, FileHistoryStore, PostgresHistoryStore};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the history backend: Postgres when a database URL is configured,
/// the local file store otherwise.
async fn build_history_store(config: &Config) -> Arc<dyn ChatHistoryStore> {
    match config.database_url.as_deref() {
        Some(url) => match PostgresHistoryStore::connect(url).await {
            Ok(store) => {
                tracing::info!("using Postgres history backend");
                Arc::new(store)
            }
            Err(err) => {
                tracing::error!("failed to connect to Postgres, falling back to file store: {err}");
                Arc::new(FileHistoryStore::new(config.history_file()))
            }
        },
        None => {
            tracing::info!("using file history backend at {:?}", config.history_file());
            Arc::new(FileHistoryStore::new(config.history_file()))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    tracing::info!("Starting chat relay server...");

    let config = Config::new();

    if config.gemini_api_key.is_none() && config.groq_api_key.is_none() {
        tracing::warn!(
            "neither GEMINI_API_KEY nor GROQ_API_KEY is set; chat requests will be rejected"
        );
    }

    let port = env::var("APP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let history = build_history_store(&config).await;

    if let Err(e) = web_service::server::run(config, history, port).await {
        tracing::error!("Failed to run web service: {}", e);
        std::process::exit(1);
    }
}
