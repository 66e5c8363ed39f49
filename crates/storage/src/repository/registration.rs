use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::registration::EligibleEntrant;
use crate::error::{Result, StorageError};
use crate::models::{DisciplineKey, Registration, RegistrationStatus, RoleTag};

const REGISTRATION_COLUMNS: &str = "registration_id, entrant_id, event_id, team_id, role, status, \
     boat_class, sex, distance_m, age_group, is_paid, cost, disqualified_reason, created_at";

/// Repository for Registration rows.
///
/// Team linkage (`team_id`, `role`) is only written through [`attach`](Self::attach)
/// and [`detach`](Self::detach), both called by the roster builder.
pub struct RegistrationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(
        &self,
        entrant_id: i32,
        event_id: Uuid,
        discipline: &DisciplineKey,
        cost: Decimal,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "INSERT INTO registrations (entrant_id, event_id, status, boat_class, sex, \
                                        distance_m, age_group, cost) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(entrant_id)
        .bind(event_id)
        .bind(RegistrationStatus::Queued)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .bind(cost)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::ConstraintViolation(format!(
                    "Entrant {entrant_id} is already registered for {discipline}"
                ))
            } else if err.is_foreign_key_violation() {
                StorageError::NotFound
            } else {
                err
            }
        })
    }

    pub async fn find_in(conn: &mut PgConnection, id: Uuid) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE registration_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Locks one registration for the rest of the transaction.
    ///
    /// A crew member's row is only locked after its team row.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE registration_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Locks the entrant's registration for one discipline of an event.
    pub async fn lock_for_discipline(
        conn: &mut PgConnection,
        entrant_id: i32,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Option<Registration>> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE entrant_id = $1 AND event_id = $2 AND boat_class = $3 AND sex = $4 \
               AND distance_m = $5 AND age_group = $6 \
             FOR UPDATE"
        ))
        .bind(entrant_id)
        .bind(event_id)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(registration)
    }

    /// Locks and returns every member of a team in joining order.
    pub async fn lock_team_members(
        conn: &mut PgConnection,
        team_id: Uuid,
    ) -> Result<Vec<Registration>> {
        let members = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE team_id = $1 \
             ORDER BY created_at, registration_id \
             FOR UPDATE"
        ))
        .bind(team_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| StorageError::from(e).lock_conflict_on(team_id))?;

        Ok(members)
    }

    pub async fn list_by_team(&self, team_id: Uuid) -> Result<Vec<Registration>> {
        let members = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE team_id = $1 \
             ORDER BY created_at, registration_id"
        ))
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(members)
    }

    /// Single-seat registrations ready to race, in sign-up order.
    pub async fn list_registered_individuals(
        conn: &mut PgConnection,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE event_id = $1 AND boat_class = $2 AND sex = $3 \
               AND distance_m = $4 AND age_group = $5 \
               AND status = $6 AND team_id IS NULL \
             ORDER BY created_at, registration_id"
        ))
        .bind(event_id)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .bind(RegistrationStatus::Registered)
        .fetch_all(&mut *conn)
        .await?;

        Ok(registrations)
    }

    /// Entrant pool of a discipline with each entrant's current status.
    pub async fn list_eligible(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<EligibleEntrant>> {
        let entrants = sqlx::query_as::<_, EligibleEntrant>(
            r#"
            SELECT e.entrant_id, e.first_name, e.last_name, e.sex, e.boat_classes,
                   r.registration_id, r.status, r.team_id, r.role, r.is_paid
            FROM registrations r
            INNER JOIN entrants e ON e.entrant_id = r.entrant_id
            WHERE r.event_id = $1 AND r.boat_class = $2 AND r.sex = $3
              AND r.distance_m = $4 AND r.age_group = $5
              AND r.status NOT IN ('no_show', 'disqualified')
            ORDER BY r.created_at, r.registration_id
            "#,
        )
        .bind(event_id)
        .bind(&discipline.boat_class)
        .bind(discipline.sex)
        .bind(discipline.distance_m as i32)
        .bind(&discipline.age_group)
        .fetch_all(self.pool)
        .await?;

        Ok(entrants)
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET status = $2 WHERE registration_id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn set_disqualified(
        conn: &mut PgConnection,
        id: Uuid,
        reason: &str,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET status = $2, disqualified_reason = $3 \
             WHERE registration_id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(RegistrationStatus::Disqualified)
        .bind(reason)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn attach(
        conn: &mut PgConnection,
        id: Uuid,
        team_id: Uuid,
        role: RoleTag,
        status: RegistrationStatus,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET team_id = $2, role = $3, status = $4 \
             WHERE registration_id = $1 AND team_id IS NULL \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(team_id)
        .bind(role)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn detach(
        conn: &mut PgConnection,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET team_id = NULL, role = NULL, status = $2 \
             WHERE registration_id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn set_paid(&self, id: Uuid, is_paid: bool) -> Result<Registration> {
        sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET is_paid = $2 WHERE registration_id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(is_paid)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
