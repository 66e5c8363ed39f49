use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::event::CreateEventRequest;
use crate::error::{Result, StorageError};
use crate::models::{DrawSettings, Event, EventStatus};

const EVENT_COLUMNS: &str = "event_id, name, slug, status, city, start_date, end_date, program, \
     lane_capacity, advance_per_heat, advance_by_time, created_at";

/// Repository for Event database operations
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List events, most recent first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             ORDER BY start_date DESC, created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    pub async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Event> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, id).await
    }

    /// Reads an event inside an open transaction.
    pub async fn find_in(conn: &mut PgConnection, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create a new event. `settings` fills in whatever the request leaves out.
    pub async fn create(&self, req: &CreateEventRequest, settings: DrawSettings) -> Result<Event> {
        let settings = req
            .draw_settings
            .as_ref()
            .map(|s| s.resolve(settings))
            .unwrap_or(settings);

        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, slug, status, city, start_date, end_date, program, \
                                 lane_capacity, advance_per_heat, advance_by_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.slug)
        .bind(req.status.unwrap_or(EventStatus::Draft))
        .bind(&req.city)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(Json(&req.program))
        .bind(settings.lane_capacity as i32)
        .bind(settings.advance_per_heat as i32)
        .bind(settings.advance_by_time as i32)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.code().as_deref() == Some("23505")
            {
                return StorageError::ConstraintViolation("Slug already exists".to_string());
            }
            StorageError::from(e)
        })
    }

    pub async fn update_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET status = $2 WHERE event_id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
