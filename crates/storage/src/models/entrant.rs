use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::models::Sex;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entrant {
    pub entrant_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: chrono::NaiveDate,
    pub city: Option<String>,
    /// Boat classes the entrant may start in.
    #[schema(value_type = Vec<String>)]
    pub boat_classes: Json<Vec<String>>,
    pub created_at: chrono::NaiveDateTime,
}

impl Entrant {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_eligible_for(&self, boat_class: &str) -> bool {
        self.boat_classes.iter().any(|c| c.trim() == boat_class)
    }
}
