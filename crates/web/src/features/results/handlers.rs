use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use storage::dto::results::{EventResults, ResultSubmission};
use uuid::Uuid;
use validator::Validate;

use crate::context::RequestContext;
use crate::error::WebResult;
use crate::state::AppState;

const IDEMPOTENCY_HEADER: &str = "idempotency-key";

#[utoipa::path(
    post,
    path = "/events/{event_id}/results",
    params(("event_id" = Uuid, Path, description = "Event to submit results for")),
    request_body = ResultSubmission,
    responses(
        (status = 201, description = "Results replaced for the event", body = EventResults),
        (status = 400, description = "Invalid submission"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Idempotency key conflict or canceled event")
    ),
    tag = "results"
)]
pub async fn submit_results(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(event_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ResultSubmission>,
) -> WebResult<Response> {
    payload.validate()?;

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok());

    let response = state
        .ingestion
        .submit(&ctx.0, event_id, payload, idempotency_key)
        .await?;

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/results",
    params(("event_id" = Uuid, Path, description = "Event to read results for")),
    responses(
        (status = 200, description = "Persisted results in finish order", body = EventResults),
        (status = 404, description = "Event not found")
    ),
    tag = "results"
)]
pub async fn read_results(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(event_id): Path<Uuid>,
) -> WebResult<Response> {
    let response = state.ingestion.read(&ctx.0, event_id).await?;
    Ok(Json(response).into_response())
}
