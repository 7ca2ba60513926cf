use axum::{Router, routing::get};

use super::handlers::read_standings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/:league_id/standings", get(read_standings))
}
