use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{DisciplineKey, Sex};

/// A crew for one crewed discipline of one event.
///
/// `member_count` mirrors the number of registrations linked to the team and
/// never exceeds `capacity`; both are maintained by the roster builder only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub team_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub boat_class: String,
    pub sex: Sex,
    pub distance_m: i32,
    pub age_group: String,
    pub member_count: i32,
    pub capacity: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Team {
    pub fn discipline(&self) -> DisciplineKey {
        DisciplineKey::new(
            self.boat_class.as_str(),
            self.sex,
            self.distance_m.max(0) as u32,
            self.age_group.as_str(),
        )
    }
}
