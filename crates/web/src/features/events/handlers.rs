use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::{PaginatedResponse, PaginationParams},
        event::{CreateEventRequest, DisciplineResponse, EventResponse, UpdateEventStatusRequest},
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of events", body = PaginatedResponse<EventResponse>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(db): State<Database>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<EventResponse>>, WebError> {
    params.validate()?;

    let (events, total) = services::list_events(db.pool(), &params).await?;
    let data = events.into_iter().map(EventResponse::from).collect();

    Ok(Json(PaginatedResponse::new(data, &params, total)))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let event = services::get_event(db.pool(), event_id).await?;

    Ok(Json(EventResponse::from(event)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/disciplines",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Disciplines derived from the event program", body = Vec<DisciplineResponse>),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn list_disciplines(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<DisciplineResponse>>, WebError> {
    let disciplines = services::list_disciplines(db.pool(), event_id).await?;

    Ok(Json(
        disciplines
            .into_iter()
            .map(DisciplineResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created successfully", body = EventResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already exists")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    req.validate_consistency().map_err(WebError::BadRequest)?;

    let event = services::create_event(state.db.pool(), &req, state.draw_defaults).await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/events/{event_id}/status",
    params(
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    request_body = UpdateEventStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = EventResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn update_event_status(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateEventStatusRequest>,
) -> Result<Response, WebError> {
    let event = services::update_status(db.pool(), event_id, req.status).await?;

    Ok(Json(EventResponse::from(event)).into_response())
}
