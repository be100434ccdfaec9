use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kumite::bracket::start_poll_task;
use kumite::config::AppConfig;
use kumite::identity::StaticIdentityProvider;
use kumite::matches::{InMemoryMatchStore, MatchStore, PostgresMatchStore};
use kumite::ranking::InMemoryRankingStore;
use kumite::scoring::WinnerResolver;
use kumite::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kumite server");

    let match_store: Arc<dyn MatchStore> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await.map_err(|e| {
                error!(error = %e, "Failed to connect to database");
                e
            })?;
            info!("Using PostgreSQL match store");
            Arc::new(PostgresMatchStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory match store");
            Arc::new(InMemoryMatchStore::new())
        }
    };

    let app_state = AppState::new(
        match_store,
        Arc::new(InMemoryRankingStore::new()),
        Arc::new(StaticIdentityProvider::new(config.judge_id.clone())),
        WinnerResolver::new(config.hantei_judges)?,
    );

    tokio::spawn(start_poll_task(
        Arc::clone(&app_state.bracket_service),
        config.poll.clone(),
    ));

    let app = build_router(app_state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
