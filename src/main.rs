use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filmorate_api::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db,
    storage::Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let storage = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url, config.database_max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            db::run_migrations(&pool).await?;
            Storage::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Storage::memory()
        }
    };

    let app = create_router(AppState::new(storage));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(%address, backend = ?config.storage_backend, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
