// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use simhub_backend::config::Config;
use simhub_backend::routes;
use simhub_backend::state::AppState;
use simhub_backend::storage::{JsonStore, PgStore, SimulationStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Select the persistence backend: Postgres when reachable, otherwise
    // the flat-file fallback so the admin UI keeps working offline.
    let store: Arc<dyn SimulationStore> = match &config.database_url {
        Some(url) => match PgStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Database connected...");
                Arc::new(store)
            }
            Err(e) => {
                tracing::warn!(
                    "Database unavailable ({}), falling back to JSON storage in {}",
                    e,
                    config.data_dir.display()
                );
                Arc::new(JsonStore::new(&config.data_dir))
            }
        },
        None => {
            tracing::warn!(
                "DATABASE_URL not set, using JSON storage in {}",
                config.data_dir.display()
            );
            Arc::new(JsonStore::new(&config.data_dir))
        }
    };

    // Create AppState (loads enrollment and activity records)
    let state = AppState::load(store, config.clone()).await;

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
