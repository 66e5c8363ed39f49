use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{DisciplineKey, RoleTag, Sex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Queued,
    Confirmed,
    AwaitingTeam,
    Registered,
    NoShow,
    Disqualified,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Confirmed => "confirmed",
            Self::AwaitingTeam => "awaiting_team",
            Self::Registered => "registered",
            Self::NoShow => "no_show",
            Self::Disqualified => "disqualified",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoShow | Self::Disqualified)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "confirmed" => Ok(Self::Confirmed),
            "awaiting_team" => Ok(Self::AwaitingTeam),
            "registered" => Ok(Self::Registered),
            "no_show" => Ok(Self::NoShow),
            "disqualified" => Ok(Self::Disqualified),
            other => Err(EngineError::Validation(format!(
                "unknown registration status '{other}'"
            ))),
        }
    }
}

/// One entrant's participation in one discipline of one event.
///
/// `team_id` and `role` are only ever written by the roster builder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Registration {
    pub registration_id: Uuid,
    pub entrant_id: i32,
    pub event_id: Uuid,
    pub team_id: Option<Uuid>,
    pub role: Option<RoleTag>,
    pub status: RegistrationStatus,
    pub boat_class: String,
    pub sex: Sex,
    pub distance_m: i32,
    pub age_group: String,
    pub is_paid: bool,
    pub cost: Decimal,
    pub disqualified_reason: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl Registration {
    pub fn discipline(&self) -> DisciplineKey {
        DisciplineKey::new(
            self.boat_class.as_str(),
            self.sex,
            self.distance_m.max(0) as u32,
            self.age_group.as_str(),
        )
    }
}
