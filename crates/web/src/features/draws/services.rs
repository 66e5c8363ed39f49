use sqlx::PgPool;
use storage::{
    error::Result,
    models::DisciplineKey,
    repository::heat::HeatWithLanes,
    services::draws::{DrawOutcome, Draws},
};
use uuid::Uuid;

pub async fn run_draw(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
) -> Result<DrawOutcome> {
    Draws::new(pool).run_draw(event_id, discipline).await
}

pub async fn run_next_round(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
) -> Result<DrawOutcome> {
    Draws::new(pool).run_next_round(event_id, discipline).await
}

pub async fn list_heats(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
) -> Result<Vec<HeatWithLanes>> {
    Draws::new(pool).heats(event_id, discipline).await
}
