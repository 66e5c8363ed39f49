use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::DisciplineQuery,
        draw::{DrawRequest, DrawResponse, HeatResponse},
    },
    models::DisciplineKey,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/draws",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = DrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Opening round drawn", body = DrawResponse),
        (status = 400, description = "Empty pool or discipline outside the program"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "The discipline already has heats")
    ),
    tag = "draws"
)]
pub async fn run_draw(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<DrawRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let discipline: DisciplineKey = req.discipline.parse()?;

    let outcome = services::run_draw(db.pool(), event_id, &discipline).await?;

    Ok((StatusCode::CREATED, Json(DrawResponse::from(outcome))).into_response())
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/draws/next",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = DrawRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Next round seeded from results", body = DrawResponse),
        (status = 400, description = "Results missing, nobody advances or no round after the final"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "The next round already has heats")
    ),
    tag = "draws"
)]
pub async fn run_next_round(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<DrawRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let discipline: DisciplineKey = req.discipline.parse()?;

    let outcome = services::run_next_round(db.pool(), event_id, &discipline).await?;

    Ok((StatusCode::CREATED, Json(DrawResponse::from(outcome))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/heats",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        DisciplineQuery
    ),
    responses(
        (status = 200, description = "Heats with lane assignments", body = Vec<HeatResponse>),
        (status = 400, description = "Malformed discipline key")
    ),
    tag = "draws"
)]
pub async fn list_heats(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<DisciplineQuery>,
) -> Result<Json<Vec<HeatResponse>>, WebError> {
    let discipline = query.key()?;
    let heats = services::list_heats(db.pool(), event_id, &discipline).await?;

    Ok(Json(heats.into_iter().map(HeatResponse::from).collect()))
}
