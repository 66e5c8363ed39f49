use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Competitor;

/// Recorded finish of one competitor in one heat. `finish_time` is in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Placement {
    pub placement_id: Uuid,
    pub heat_id: Uuid,
    pub registration_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub finish_time: Option<Decimal>,
    pub place: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Placement {
    pub fn competitor(&self) -> Option<Competitor> {
        match (self.registration_id, self.team_id) {
            (Some(id), None) => Some(Competitor::Individual(id)),
            (None, Some(id)) => Some(Competitor::Crew(id)),
            _ => None,
        }
    }
}
