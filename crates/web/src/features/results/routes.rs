use axum::{Router, routing::post};

use super::handlers::{read_results, submit_results};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/:event_id/results", post(submit_results).get(read_results))
}
