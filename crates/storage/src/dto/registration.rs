use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Registration, RegistrationStatus, RoleTag, Sex};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    pub entrant_id: i32,

    pub event_id: Uuid,

    /// Discipline key, e.g. `K-1/M/500/Senior`
    #[validate(length(min = 1, max = 255))]
    pub discipline: String,

    #[serde(default)]
    #[validate(custom(function = "validate_cost"))]
    pub cost: Decimal,
}

fn validate_cost(cost: &Decimal) -> Result<(), validator::ValidationError> {
    if cost.is_sign_negative() {
        return Err(validator::ValidationError::new("negative_cost"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DisqualifyRequest {
    #[validate(length(min = 1, max = 1000, message = "A reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkPaidRequest {
    #[serde(default = "default_paid")]
    pub is_paid: bool,
}

fn default_paid() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub registration_id: Uuid,
    pub entrant_id: i32,
    pub event_id: Uuid,
    pub discipline: String,
    pub team_id: Option<Uuid>,
    pub role: Option<RoleTag>,
    pub status: RegistrationStatus,
    pub is_paid: bool,
    pub cost: Decimal,
    pub disqualified_reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<Registration> for RegistrationResponse {
    fn from(registration: Registration) -> Self {
        Self {
            discipline: registration.discipline().to_string(),
            registration_id: registration.registration_id,
            entrant_id: registration.entrant_id,
            event_id: registration.event_id,
            team_id: registration.team_id,
            role: registration.role,
            status: registration.status,
            is_paid: registration.is_paid,
            cost: registration.cost,
            disqualified_reason: registration.disqualified_reason,
            created_at: registration.created_at,
        }
    }
}

/// One row of a discipline's entrant pool.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EligibleEntrant {
    pub entrant_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    #[schema(value_type = Vec<String>)]
    pub boat_classes: Json<Vec<String>>,
    pub registration_id: Uuid,
    pub status: RegistrationStatus,
    pub team_id: Option<Uuid>,
    pub role: Option<RoleTag>,
    pub is_paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_cannot_be_negative() {
        let mut req = SignUpRequest {
            entrant_id: 7,
            event_id: Uuid::nil(),
            discipline: "K-1/F/200/Senior".to_string(),
            cost: Decimal::new(1500, 2),
        };
        assert!(req.validate().is_ok());

        req.cost = Decimal::new(-1, 0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_mark_paid_defaults_to_true() {
        let req: MarkPaidRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_paid);
    }
}
