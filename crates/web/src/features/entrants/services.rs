use sqlx::PgPool;
use storage::{
    dto::entrant::CreateEntrantRequest, error::Result, models::Entrant,
    repository::entrant::EntrantRepository,
};

pub async fn get_entrant(pool: &PgPool, entrant_id: i32) -> Result<Entrant> {
    EntrantRepository::new(pool).find_by_id(entrant_id).await
}

pub async fn create_entrant(pool: &PgPool, request: &CreateEntrantRequest) -> Result<Entrant> {
    let entrant = EntrantRepository::new(pool).create(request).await?;
    tracing::info!(entrant_id = entrant.entrant_id, "Entrant created");
    Ok(entrant)
}
