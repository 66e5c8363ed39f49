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
        registration::{
            DisqualifyRequest, EligibleEntrant, MarkPaidRequest, RegistrationResponse,
            SignUpRequest,
        },
    },
    models::DisciplineKey,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/registrations/{registration_id}",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    responses(
        (status = 200, description = "Registration found", body = RegistrationResponse),
        (status = 404, description = "Registration not found")
    ),
    tag = "registrations"
)]
pub async fn get_registration(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let registration = services::get_registration(db.pool(), registration_id).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/eligible",
    params(
        ("event_id" = Uuid, Path, description = "Event id"),
        DisciplineQuery
    ),
    responses(
        (status = 200, description = "Entrant pool of the discipline", body = Vec<EligibleEntrant>),
        (status = 400, description = "Malformed discipline key"),
        (status = 404, description = "Event not found")
    ),
    tag = "registrations"
)]
pub async fn list_eligible(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<DisciplineQuery>,
) -> Result<Json<Vec<EligibleEntrant>>, WebError> {
    let discipline = query.key()?;
    let entrants = services::list_eligible(db.pool(), event_id, &discipline).await?;

    Ok(Json(entrants))
}

#[utoipa::path(
    post,
    path = "/api/registrations",
    request_body = SignUpRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Registration queued", body = RegistrationResponse),
        (status = 400, description = "Validation error or ineligible entrant"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or entrant not found"),
        (status = 409, description = "Registration closed or already registered")
    ),
    tag = "registrations"
)]
pub async fn sign_up(
    State(db): State<Database>,
    Json(req): Json<SignUpRequest>,
) -> Result<Response, WebError> {
    req.validate()?;
    let discipline: DisciplineKey = req.discipline.parse()?;

    let registration =
        services::sign_up(db.pool(), req.entrant_id, req.event_id, &discipline, req.cost).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations/{registration_id}/confirm",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registration confirmed", body = RegistrationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Registration closed or invalid transition")
    ),
    tag = "registrations"
)]
pub async fn confirm(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let registration = services::confirm(db.pool(), registration_id).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations/{registration_id}/register",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Single-seat registration ready to race", body = RegistrationResponse),
        (status = 400, description = "Crewed class"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Invalid transition")
    ),
    tag = "registrations"
)]
pub async fn register_individual(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let registration = services::register_individual(db.pool(), registration_id).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations/{registration_id}/disqualify",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    request_body = DisqualifyRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registration disqualified", body = RegistrationResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Invalid transition")
    ),
    tag = "registrations"
)]
pub async fn disqualify(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
    Json(req): Json<DisqualifyRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let registration = services::disqualify(db.pool(), registration_id, &req.reason).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations/{registration_id}/no-show",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registration marked as no-show", body = RegistrationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Invalid transition")
    ),
    tag = "registrations"
)]
pub async fn mark_no_show(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let registration = services::mark_no_show(db.pool(), registration_id).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/registrations/{registration_id}/paid",
    params(
        ("registration_id" = Uuid, Path, description = "Registration id")
    ),
    request_body = MarkPaidRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payment flag updated", body = RegistrationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found")
    ),
    tag = "registrations"
)]
pub async fn mark_paid(
    State(db): State<Database>,
    Path(registration_id): Path<Uuid>,
    Json(req): Json<MarkPaidRequest>,
) -> Result<Response, WebError> {
    let registration = services::mark_paid(db.pool(), registration_id, req.is_paid).await?;

    Ok(Json(RegistrationResponse::from(registration)).into_response())
}
