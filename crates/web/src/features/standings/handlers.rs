use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::dto::standings::SeasonStandings;
use storage::error::StorageError;
use storage::repository::league::LeagueRepository;
use storage::repository::season::SeasonRepository;
use storage::services::{access, standings};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{WebError, WebResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StandingsQuery {
    /// Omitted: the league's currently active season is used.
    #[serde(rename = "seasonId")]
    pub season_id: Option<Uuid>,
}

fn invalid_season() -> WebError {
    WebError::BadRequest {
        code: "INVALID_SEASON",
        message: "Season does not belong to this league".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/leagues/{league_id}/standings",
    params(
        ("league_id" = Uuid, Path, description = "League to rank"),
        StandingsQuery
    ),
    responses(
        (status = 200, description = "Ranked championship table", body = SeasonStandings),
        (status = 400, description = "Season does not belong to this league"),
        (status = 404, description = "League or active season not found")
    ),
    tag = "standings"
)]
pub async fn read_standings(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(league_id): Path<Uuid>,
    Query(query): Query<StandingsQuery>,
) -> WebResult<Response> {
    let pool = state.db.pool();

    let league = match LeagueRepository::new(pool).find_by_id(league_id).await {
        Ok(league) => league,
        Err(StorageError::NotFound) => {
            return Err(WebError::NotFound {
                code: "LEAGUE_NOT_FOUND",
                message: "League not found".to_string(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    access::require_membership(&ctx.0, league.id)?;

    let season_repo = SeasonRepository::new(pool);
    let season_id = match query.season_id {
        Some(requested) => {
            let season = match season_repo.find_by_id(requested).await {
                Ok(season) => season,
                Err(StorageError::NotFound) => return Err(invalid_season()),
                Err(err) => return Err(err.into()),
            };
            if season.league_id != league_id {
                return Err(invalid_season());
            }
            season.id
        }
        None => {
            season_repo
                .find_active(league_id)
                .await?
                .ok_or(WebError::NotFound {
                    code: "SEASON_NOT_FOUND",
                    message: "No active season configured for league".to_string(),
                })?
                .id
        }
    };

    // Read-through: serve the cached table when it is fresh, otherwise
    // recompute, refill and serve. Misses are never negatively cached.
    if let Some(cached) = state.cache.get(league_id, Some(season_id)).await {
        return Ok(Json(cached).into_response());
    }

    let items = standings::calculate(pool, league_id, Some(season_id)).await?;
    let response = SeasonStandings {
        league_id,
        season_id: Some(season_id),
        items,
    };
    state.cache.set(league_id, Some(season_id), &response).await;

    Ok(Json(response).into_response())
}
