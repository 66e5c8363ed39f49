use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{DisciplineKey, Heat, HeatLane, Round};
use crate::services::draw_planner::DrawPlan;

const HEAT_COLUMNS: &str =
    "heat_id, event_id, boat_class, sex, distance_m, age_group, round, heat_number, created_at";

/// A persisted heat together with its lane assignments.
#[derive(Debug, Clone)]
pub struct HeatWithLanes {
    pub heat: Heat,
    pub lanes: Vec<HeatLane>,
}

pub struct HeatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HeatRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Heat> {
        sqlx::query_as::<_, Heat>(&format!(
            "SELECT {HEAT_COLUMNS} FROM heats WHERE heat_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Serializes result entry for one heat.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Heat> {
        sqlx::query_as::<_, Heat>(&format!(
            "SELECT {HEAT_COLUMNS} FROM heats WHERE heat_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn lanes_in(conn: &mut PgConnection, heat_id: Uuid) -> Result<Vec<HeatLane>> {
        let lanes = sqlx::query_as::<_, HeatLane>(
            "SELECT heat_id, lane, registration_id, team_id FROM heat_lanes \
             WHERE heat_id = $1 ORDER BY lane",
        )
        .bind(heat_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lanes)
    }

    /// Whether a crew has been drawn into any heat.
    pub async fn team_has_lanes(conn: &mut PgConnection, team_id: Uuid) -> Result<bool> {
        let drawn = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM heat_lanes WHERE team_id = $1)",
        )
        .bind(team_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(drawn)
    }

    /// All heats of a discipline, ordered by round then heat number.
    pub async fn list_for_discipline(
        conn: &mut PgConnection,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<Heat>> {
        let mut heats = sqlx::query_as::<_, Heat>(&format!(
            "SELECT {HEAT_COLUMNS} FROM heats \
             WHERE event_id = $1 AND boat_class = $2 AND sex = $3 \
               AND distance_m = $4 AND age_group = $5"
        ))
        .bind(event_id)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .fetch_all(&mut *conn)
        .await?;

        // rounds are stored as text, so order them here
        heats.sort_by_key(|h| (h.round, h.heat_number));
        Ok(heats)
    }

    /// Heats of a discipline with their lanes, for start protocols.
    pub async fn list_with_lanes(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<HeatWithLanes>> {
        let mut conn = self.pool.acquire().await?;
        let heats = Self::list_for_discipline(&mut conn, event_id, discipline).await?;
        Self::attach_lanes(&mut conn, heats).await
    }

    async fn attach_lanes(conn: &mut PgConnection, heats: Vec<Heat>) -> Result<Vec<HeatWithLanes>> {
        let heat_ids: Vec<Uuid> = heats.iter().map(|h| h.heat_id).collect();
        let lanes = sqlx::query_as::<_, HeatLane>(
            "SELECT heat_id, lane, registration_id, team_id FROM heat_lanes \
             WHERE heat_id = ANY($1) ORDER BY heat_id, lane",
        )
        .bind(&heat_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(heats
            .into_iter()
            .map(|heat| {
                let lanes = lanes
                    .iter()
                    .filter(|l| l.heat_id == heat.heat_id)
                    .cloned()
                    .collect();
                HeatWithLanes { heat, lanes }
            })
            .collect())
    }

    /// Writes the heats and lanes of a plan. A heat that already exists for
    /// the same discipline, round and number trips the unique index.
    pub async fn insert_plan(
        conn: &mut PgConnection,
        event_id: Uuid,
        plan: &DrawPlan,
    ) -> Result<Vec<HeatWithLanes>> {
        let mut inserted = Vec::with_capacity(plan.heats.len());

        for planned in &plan.heats {
            let heat = sqlx::query_as::<_, Heat>(&format!(
                "INSERT INTO heats (event_id, boat_class, sex, distance_m, age_group, \
                                    round, heat_number) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {HEAT_COLUMNS}"
            ))
            .bind(event_id)
            .bind(&plan.discipline.boat_class)
            .bind(plan.discipline.sex)
            .bind(plan.discipline.distance_m as i32)
            .bind(&plan.discipline.age_group)
            .bind(planned.round)
            .bind(planned.heat_number as i32)
            .fetch_one(&mut *conn)
            .await?;

            let mut lanes = Vec::with_capacity(planned.lanes.len());
            for lane in &planned.lanes {
                let row = sqlx::query_as::<_, HeatLane>(
                    "INSERT INTO heat_lanes (heat_id, lane, registration_id, team_id) \
                     VALUES ($1, $2, $3, $4) \
                     RETURNING heat_id, lane, registration_id, team_id",
                )
                .bind(heat.heat_id)
                .bind(lane.lane as i32)
                .bind(lane.competitor.registration_id())
                .bind(lane.competitor.team_id())
                .fetch_one(&mut *conn)
                .await?;
                lanes.push(row);
            }

            inserted.push(HeatWithLanes { heat, lanes });
        }

        Ok(inserted)
    }

    /// Latest round drawn for a discipline, if any.
    pub fn latest_round(heats: &[Heat]) -> Option<Round> {
        heats.iter().map(|h| h.round).max()
    }
}
