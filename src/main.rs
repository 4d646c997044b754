use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ppalink::{
    config::AppConfig,
    db::{self, MappingStore, SqliteStore},
    expiry,
    service::MappingService,
    shortcode::ShortCodeGenerator,
    AppState,
};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent, env vars may already be set)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ppalink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting ppalink on {}", config.bind_addr());
    tracing::info!(
        "Short URL prefix: {} (default TTL {} days)",
        config.short_url_prefix,
        config.default_ttl_days
    );

    let pool = db::connect(&config.database_url).await?;
    let store: Arc<dyn MappingStore> = Arc::new(SqliteStore::new(pool));

    expiry::spawn_sweeper(
        store.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    );

    let service = MappingService::new(
        store,
        ShortCodeGenerator::new(config.short_url_prefix.clone()),
        config.default_ttl_days,
    )
    .with_shorten_attempts(config.shorten_attempts);

    let app = ppalink::router(AppState::new(service));

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
