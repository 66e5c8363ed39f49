use sqlx::PgPool;
use storage::{
    error::Result,
    models::{DisciplineKey, Placement},
    services::{
        results::{PlacementEntry, Results},
        results_aggregator::{MedalTable, MedalTally},
    },
};
use uuid::Uuid;

pub async fn record_placements(
    pool: &PgPool,
    heat_id: Uuid,
    entries: &[PlacementEntry],
    replace: bool,
) -> Result<Vec<Placement>> {
    Results::new(pool)
        .record_placements(heat_id, entries, replace)
        .await
}

pub async fn list_placements(pool: &PgPool, heat_id: Uuid) -> Result<Vec<Placement>> {
    Results::new(pool).placements(heat_id).await
}

pub async fn medal_table(pool: &PgPool, event_id: Uuid) -> Result<MedalTable> {
    Results::new(pool).medal_table(event_id).await
}

pub async fn medal_tally(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
) -> Result<MedalTally> {
    Results::new(pool).medal_tally(event_id, discipline).await
}
