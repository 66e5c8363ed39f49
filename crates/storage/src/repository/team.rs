use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{EngineError, Result, StorageError};
use crate::models::{DisciplineKey, RegistrationStatus, Team};

const TEAM_COLUMNS: &str = "team_id, event_id, name, city, boat_class, sex, distance_m, \
     age_group, member_count, capacity, created_at";

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
        name: &str,
        city: Option<&str>,
        capacity: u32,
    ) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "INSERT INTO teams (event_id, name, city, boat_class, sex, distance_m, age_group, \
                                member_count, capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8) \
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(event_id)
        .bind(name)
        .bind(city)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .bind(capacity as i32)
        .fetch_one(self.pool)
        .await?;

        Ok(team)
    }

    /// Takes the team's row lock; every membership change goes through it.
    ///
    /// A deadlock or lock timeout while waiting is reported as
    /// `ConcurrencyConflict` so the operator can resubmit.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Team> {
        sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| StorageError::from(e).lock_conflict_on(id))?
        .ok_or(StorageError::NotFound)
    }

    /// Conditional count update: fails with `ConcurrencyConflict` when the
    /// stored count is no longer the one the caller based its checks on.
    pub async fn update_member_count(
        conn: &mut PgConnection,
        id: Uuid,
        expected: i32,
        member_count: i32,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE teams SET member_count = $3 \
             WHERE team_id = $1 AND member_count = $2 AND $3 <= capacity",
        )
        .bind(id)
        .bind(expected)
        .bind(member_count)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::ConcurrencyConflict { team_id: id }.into());
        }

        Ok(())
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM teams WHERE team_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Crews of a discipline whose members are ready to race, in creation order.
    pub async fn list_ready(
        conn: &mut PgConnection,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams t \
             WHERE t.event_id = $1 AND t.boat_class = $2 AND t.sex = $3 \
               AND t.distance_m = $4 AND t.age_group = $5 \
               AND EXISTS ( \
                   SELECT 1 FROM registrations r \
                   WHERE r.team_id = t.team_id AND r.status = $6 \
               ) \
             ORDER BY t.created_at, t.team_id"
        ))
        .bind(event_id)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .bind(RegistrationStatus::Registered)
        .fetch_all(&mut *conn)
        .await?;

        Ok(teams)
    }
}
