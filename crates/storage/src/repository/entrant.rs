use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::dto::entrant::CreateEntrantRequest;
use crate::error::{Result, StorageError};
use crate::models::Entrant;

const ENTRANT_COLUMNS: &str =
    "entrant_id, first_name, last_name, sex, birth_date, city, boat_classes, created_at";

pub struct EntrantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EntrantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Entrant> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, id).await
    }

    pub async fn find_in(conn: &mut PgConnection, id: i32) -> Result<Entrant> {
        sqlx::query_as::<_, Entrant>(&format!(
            "SELECT {ENTRANT_COLUMNS} FROM entrants WHERE entrant_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateEntrantRequest) -> Result<Entrant> {
        let boat_classes: Vec<String> = req
            .boat_classes
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let entrant = sqlx::query_as::<_, Entrant>(&format!(
            "INSERT INTO entrants (first_name, last_name, sex, birth_date, city, boat_classes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ENTRANT_COLUMNS}"
        ))
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.sex)
        .bind(req.birth_date)
        .bind(&req.city)
        .bind(Json(boat_classes))
        .fetch_one(self.pool)
        .await?;

        Ok(entrant)
    }
}
