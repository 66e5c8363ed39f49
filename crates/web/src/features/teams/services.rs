use sqlx::PgPool;
use storage::{
    error::Result,
    models::{DisciplineKey, Registration, RoleTag, Team},
    services::{
        roster::StatusChange,
        roster_builder::{Removal, RosterBuilder},
    },
};
use uuid::Uuid;

pub async fn create_team(
    pool: &PgPool,
    event_id: Uuid,
    discipline: &DisciplineKey,
    name: &str,
    city: Option<&str>,
) -> Result<Team> {
    RosterBuilder::new(pool)
        .create_team(event_id, discipline, name, city)
        .await
}

pub async fn get_team(pool: &PgPool, team_id: Uuid) -> Result<(Team, Vec<Registration>)> {
    RosterBuilder::new(pool).team_with_members(team_id).await
}

pub async fn add_member(
    pool: &PgPool,
    team_id: Uuid,
    entrant_id: i32,
    role: RoleTag,
) -> Result<Registration> {
    RosterBuilder::new(pool)
        .add_member(team_id, entrant_id, role)
        .await
}

pub async fn remove_member(pool: &PgPool, team_id: Uuid, entrant_id: i32) -> Result<Removal> {
    RosterBuilder::new(pool)
        .remove_member(team_id, entrant_id)
        .await
}

pub async fn recompute_status(pool: &PgPool, team_id: Uuid) -> Result<Vec<StatusChange>> {
    RosterBuilder::new(pool).recompute_status(team_id).await
}
