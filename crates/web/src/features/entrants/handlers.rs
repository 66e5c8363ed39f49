use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::entrant::{CreateEntrantRequest, EntrantResponse},
};
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/entrants/{entrant_id}",
    params(
        ("entrant_id" = i32, Path, description = "Entrant id")
    ),
    responses(
        (status = 200, description = "Entrant found", body = EntrantResponse),
        (status = 404, description = "Entrant not found")
    ),
    tag = "entrants"
)]
pub async fn get_entrant(
    State(db): State<Database>,
    Path(entrant_id): Path<i32>,
) -> Result<Response, WebError> {
    let entrant = services::get_entrant(db.pool(), entrant_id).await?;

    Ok(Json(EntrantResponse::from(entrant)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/entrants",
    request_body = CreateEntrantRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Entrant created successfully", body = EntrantResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "entrants"
)]
pub async fn create_entrant(
    State(db): State<Database>,
    Json(req): Json<CreateEntrantRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entrant = services::create_entrant(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(EntrantResponse::from(entrant))).into_response())
}
