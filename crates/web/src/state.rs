use std::sync::Arc;

use storage::Database;
use storage::services::cache::StandingsCache;
use storage::services::results::ResultsIngestion;

/// Application-lifetime services, constructed once in `main` and passed
/// through the router instead of living as ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ingestion: Arc<ResultsIngestion>,
    pub cache: Arc<StandingsCache>,
}
