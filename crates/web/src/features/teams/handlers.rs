use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        registration::RegistrationResponse,
        team::{
            AddMemberRequest, CreateTeamRequest, RecomputeResponse, RemoveMemberResponse,
            TeamResponse,
        },
    },
    models::DisciplineKey,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Validation error, single-seat class or unknown boat class"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(db): State<Database>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let discipline: DisciplineKey = req.discipline.parse()?;

    let team = services::create_team(
        db.pool(),
        req.event_id,
        &discipline,
        &req.name,
        req.city.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::new(team, Vec::new()))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    responses(
        (status = 200, description = "Team with its members", body = TeamResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let (team, members) = services::get_team(db.pool(), team_id).await?;

    Ok(Json(TeamResponse::new(team, members)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/members",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    request_body = AddMemberRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Member added", body = RegistrationResponse),
        (status = 400, description = "Entrant has no registration for the discipline"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found"),
        (status = 409, description = "Team full, role taken, registration not confirmed or concurrent change")
    ),
    tag = "teams"
)]
pub async fn add_member(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Response, WebError> {
    let registration = services::add_member(db.pool(), team_id, req.entrant_id, req.role).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/teams/{team_id}/members/{entrant_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team id"),
        ("entrant_id" = i32, Path, description = "Entrant id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Member removed", body = RemoveMemberResponse),
        (status = 400, description = "Entrant is not on the team"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn remove_member(
    State(db): State<Database>,
    Path((team_id, entrant_id)): Path<(Uuid, i32)>,
) -> Result<Response, WebError> {
    let removal = services::remove_member(db.pool(), team_id, entrant_id).await?;

    Ok(Json(RemoveMemberResponse::from(removal)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/teams/{team_id}/recompute",
    params(
        ("team_id" = Uuid, Path, description = "Team id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Member statuses recomputed", body = RecomputeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn recompute_status(
    State(db): State<Database>,
    Path(team_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let changes = services::recompute_status(db.pool(), team_id).await?;

    Ok(Json(RecomputeResponse { team_id, changes }).into_response())
}
