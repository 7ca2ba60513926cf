use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use storage::services::cache::StandingsCache;
use storage::services::dispatch::LogDispatch;
use storage::services::idempotency::IdempotencyGuard;
use storage::services::results::ResultsIngestion;
use storage::{Database, store};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod context;
mod error;
mod features;
mod state;

use config::Config;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::results::handlers::submit_results,
        features::results::handlers::read_results,
        features::standings::handlers::read_standings,
    ),
    components(
        schemas(
            storage::dto::results::ResultSubmission,
            storage::dto::results::ResultEntryCreate,
            storage::dto::results::ResultEntryRead,
            storage::dto::results::EventResults,
            storage::dto::standings::StandingsItem,
            storage::dto::standings::SeasonStandings,
            storage::models::Event,
            storage::models::EventStatus,
            storage::models::RaceResult,
            storage::models::ResultStatus,
        )
    ),
    tags(
        (name = "results", description = "Race results ingestion endpoints"),
        (name = "standings", description = "Championship standings endpoints"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting league results API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    // One ephemeral store backs both the idempotency guard and the standings
    // cache; store::connect logs whether it is Redis or the local degrade.
    let ephemeral = store::connect(config.redis_url.as_deref()).await;
    let idempotency = Arc::new(IdempotencyGuard::new(
        ephemeral.clone(),
        Duration::from_secs(config.idempotency_ttl_seconds),
    ));
    let cache = Arc::new(StandingsCache::new(
        ephemeral,
        Duration::from_secs(config.standings_cache_ttl_seconds),
    ));
    let ingestion = Arc::new(ResultsIngestion::new(
        db.clone(),
        idempotency,
        cache.clone(),
        Arc::new(LogDispatch),
    ));

    let app_state = AppState {
        db,
        ingestion,
        cache,
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = axum::Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/events", features::results::routes::routes())
        .nest("/leagues", features::standings::routes::routes())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
