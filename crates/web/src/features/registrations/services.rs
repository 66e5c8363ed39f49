use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::{
    dto::registration::EligibleEntrant,
    error::Result,
    models::{DisciplineKey, Registration},
    services::registrations::Registrations,
};
use uuid::Uuid;

pub async fn get_registration(pool: &PgPool, id: Uuid) -> Result<Registration> {
    Registrations::new(pool).find(id).await
}

pub async fn sign_up(
    pool: &PgPool,
    entrant_id: i32,
    event_id: Uuid,
    discipline: &DisciplineKey,
    cost: Decimal,
) -> Result<Registration> {
    Registrations::new(pool)
        .sign_up(entrant_id, event_id, discipline, cost)
        .await
}

pub async fn confirm(pool: &PgPool, id: Uuid) -> Result<Registration> {
    Registrations::new(pool).confirm(id).await
}

pub async fn register_individual(pool: &PgPool, id: Uuid) -> Result<Registration> {
    Registrations::new(pool).register_individual(id).await
}

pub async fn disqualify(pool: &PgPool, id: Uuid, reason: &str) -> Result<Registration> {
    Registrations::new(pool).disqualify(id, reason.trim()).await
}

pub async fn mark_no_show(pool: &PgPool, id: Uuid) -> Result<Registration> {
    Registrations::new(pool).mark_no_show(id).await
}

pub async fn mark_paid(pool: &PgPool, id: Uuid, is_paid: bool) -> Result<Registration> {
    Registrations::new(pool).mark_paid(id, is_paid).await
}

pub async fn list_eligible(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
) -> Result<Vec<EligibleEntrant>> {
    Registrations::new(pool)
        .list_eligible(event_id, discipline)
        .await
}
