use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::results::{
        DisciplineMedals, MedalQuery, MedalTableResponse, PlacementResponse,
        RecordPlacementsRequest,
    },
    models::DisciplineKey,
    services::results::PlacementEntry,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/heats/{heat_id}/placements",
    params(
        ("heat_id" = Uuid, Path, description = "Heat id")
    ),
    request_body = RecordPlacementsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Placements recorded", body = Vec<PlacementResponse>),
        (status = 400, description = "Tied or missing places, or competitor without a lane"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Heat not found"),
        (status = 409, description = "Heat already has results and replace was not set")
    ),
    tag = "results"
)]
pub async fn record_placements(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
    Json(req): Json<RecordPlacementsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let entries: Vec<PlacementEntry> = req.entries.iter().map(PlacementEntry::from).collect();

    let placements = services::record_placements(db.pool(), heat_id, &entries, req.replace).await?;

    let response: Vec<PlacementResponse> = placements
        .into_iter()
        .map(PlacementResponse::from)
        .collect();

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/heats/{heat_id}/placements",
    params(
        ("heat_id" = Uuid, Path, description = "Heat id")
    ),
    responses(
        (status = 200, description = "Placements of the heat, by place", body = Vec<PlacementResponse>),
        (status = 404, description = "Heat not found")
    ),
    tag = "results"
)]
pub async fn list_placements(
    State(db): State<Database>,
    Path(heat_id): Path<Uuid>,
) -> Result<Json<Vec<PlacementResponse>>, WebError> {
    let placements = services::list_placements(db.pool(), heat_id).await?;

    Ok(Json(
        placements
            .into_iter()
            .map(PlacementResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/medals",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        MedalQuery
    ),
    responses(
        (status = 200, description = "Medal table, or one discipline's tally with ?discipline=", body = MedalTableResponse),
        (status = 400, description = "Malformed discipline key"),
        (status = 404, description = "Event not found")
    ),
    tag = "results"
)]
pub async fn medal_table(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<MedalQuery>,
) -> Result<Response, WebError> {
    if let Some(raw) = query.discipline.as_deref() {
        let discipline: DisciplineKey = raw.parse()?;
        let tally = services::medal_tally(db.pool(), event_id, &discipline).await?;

        return Ok(Json(DisciplineMedals {
            discipline: discipline.to_string(),
            tally,
        })
        .into_response());
    }

    let table = services::medal_table(db.pool(), event_id).await?;

    Ok(Json(MedalTableResponse::from(&table)).into_response())
}
