use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{DisciplineKey, Sex};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    Preliminary,
    Semifinal,
    Final,
}

impl Round {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Semifinal => "semifinal",
            Self::Final => "final",
        }
    }

    /// The round fed by this one's advancers; `None` after the final.
    pub fn next(&self) -> Option<Round> {
        match self {
            Self::Preliminary => Some(Self::Semifinal),
            Self::Semifinal => Some(Self::Final),
            Self::Final => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Round {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preliminary" => Ok(Self::Preliminary),
            "semifinal" => Ok(Self::Semifinal),
            "final" => Ok(Self::Final),
            other => Err(EngineError::Validation(format!("unknown round '{other}'"))),
        }
    }
}

/// What occupies a lane: an individual registration or a whole crew.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Competitor {
    Individual(Uuid),
    Crew(Uuid),
}

impl Competitor {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Individual(id) | Self::Crew(id) => *id,
        }
    }

    pub fn registration_id(&self) -> Option<Uuid> {
        match self {
            Self::Individual(id) => Some(*id),
            Self::Crew(_) => None,
        }
    }

    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            Self::Crew(id) => Some(*id),
            Self::Individual(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Heat {
    pub heat_id: Uuid,
    pub event_id: Uuid,
    pub boat_class: String,
    pub sex: Sex,
    pub distance_m: i32,
    pub age_group: String,
    pub round: Round,
    pub heat_number: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Heat {
    pub fn discipline(&self) -> DisciplineKey {
        DisciplineKey::new(
            self.boat_class.as_str(),
            self.sex,
            self.distance_m.max(0) as u32,
            self.age_group.as_str(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HeatLane {
    pub heat_id: Uuid,
    pub lane: i32,
    pub registration_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

impl HeatLane {
    pub fn competitor(&self) -> Option<Competitor> {
        match (self.registration_id, self.team_id) {
            (Some(id), None) => Some(Competitor::Individual(id)),
            (None, Some(id)) => Some(Competitor::Crew(id)),
            _ => None,
        }
    }
}
