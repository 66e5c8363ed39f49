use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Competitor, DisciplineKey, Placement, Round, Sex};
use crate::services::results_aggregator::PlacedResult;

const PLACEMENT_COLUMNS: &str =
    "placement_id, heat_id, registration_id, team_id, finish_time, place, created_at";

#[derive(Debug, FromRow)]
struct PlacementInContext {
    boat_class: String,
    sex: Sex,
    distance_m: i32,
    age_group: String,
    round: Round,
    registration_id: Option<Uuid>,
    team_id: Option<Uuid>,
    place: i32,
}

impl PlacementInContext {
    fn into_placed(self) -> Option<PlacedResult> {
        let competitor = match (self.registration_id, self.team_id) {
            (Some(id), None) => Competitor::Individual(id),
            (None, Some(id)) => Competitor::Crew(id),
            _ => return None,
        };
        Some(PlacedResult {
            discipline: DisciplineKey::new(
                self.boat_class,
                self.sex,
                self.distance_m.max(0) as u32,
                self.age_group,
            ),
            round: self.round,
            competitor,
            place: self.place.max(0) as u32,
        })
    }
}

pub struct PlacementRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlacementRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_heat(&self, heat_id: Uuid) -> Result<Vec<Placement>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_for_heats(&mut conn, &[heat_id]).await
    }

    pub async fn list_for_heats(
        conn: &mut PgConnection,
        heat_ids: &[Uuid],
    ) -> Result<Vec<Placement>> {
        let placements = sqlx::query_as::<_, Placement>(&format!(
            "SELECT {PLACEMENT_COLUMNS} FROM placements \
             WHERE heat_id = ANY($1) \
             ORDER BY heat_id, place"
        ))
        .bind(heat_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(placements)
    }

    pub async fn count_for_heat(conn: &mut PgConnection, heat_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM placements WHERE heat_id = $1")
            .bind(heat_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }

    pub async fn delete_for_heat(conn: &mut PgConnection, heat_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM placements WHERE heat_id = $1")
            .bind(heat_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert(
        conn: &mut PgConnection,
        heat_id: Uuid,
        competitor: Competitor,
        place: u32,
        finish_time: Option<Decimal>,
    ) -> Result<Placement> {
        let placement = sqlx::query_as::<_, Placement>(&format!(
            "INSERT INTO placements (heat_id, registration_id, team_id, finish_time, place) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PLACEMENT_COLUMNS}"
        ))
        .bind(heat_id)
        .bind(competitor.registration_id())
        .bind(competitor.team_id())
        .bind(finish_time)
        .bind(place as i32)
        .fetch_one(&mut *conn)
        .await?;

        Ok(placement)
    }

    /// Every placement of an event tagged with its discipline and round.
    pub async fn list_placed_results(&self, event_id: Uuid) -> Result<Vec<PlacedResult>> {
        let rows = sqlx::query_as::<_, PlacementInContext>(
            r#"
            SELECT h.boat_class, h.sex, h.distance_m, h.age_group, h.round,
                   p.registration_id, p.team_id, p.place
            FROM placements p
            INNER JOIN heats h ON h.heat_id = p.heat_id
            WHERE h.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(PlacementInContext::into_placed)
            .collect())
    }
}
