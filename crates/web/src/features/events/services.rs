use sqlx::PgPool;
use storage::{
    dto::{common::PaginationParams, event::CreateEventRequest},
    error::Result,
    models::{DisciplineKey, DrawSettings, Event, EventStatus},
    repository::event::EventRepository,
    services::roster_rules::RosterRules,
};
use uuid::Uuid;

/// One page of events plus the total count
pub async fn list_events(pool: &PgPool, params: &PaginationParams) -> Result<(Vec<Event>, i64)> {
    let repo = EventRepository::new(pool);
    let events = repo.list(params.limit(), params.offset()).await?;
    let total = repo.count().await?;
    Ok((events, total))
}

pub async fn get_event(pool: &PgPool, event_id: Uuid) -> Result<Event> {
    EventRepository::new(pool).find_by_id(event_id).await
}

/// Rejects programs naming a boat class the roster rules cannot resolve
pub async fn create_event(
    pool: &PgPool,
    request: &CreateEventRequest,
    defaults: DrawSettings,
) -> Result<Event> {
    RosterRules::from_program(&request.program)?;

    let event = EventRepository::new(pool).create(request, defaults).await?;
    tracing::info!(event_id = %event.event_id, slug = %event.slug, "Event created");
    Ok(event)
}

pub async fn update_status(pool: &PgPool, event_id: Uuid, status: EventStatus) -> Result<Event> {
    let event = EventRepository::new(pool)
        .update_status(event_id, status)
        .await?;
    tracing::info!(%event_id, %status, "Event status changed");
    Ok(event)
}

pub async fn list_disciplines(pool: &PgPool, event_id: Uuid) -> Result<Vec<DisciplineKey>> {
    let event = EventRepository::new(pool).find_by_id(event_id).await?;
    Ok(event.program.disciplines())
}
