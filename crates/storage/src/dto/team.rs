use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Registration, RegistrationStatus, RoleTag, Team};
use crate::services::roster::StatusChange;
use crate::services::roster_builder::Removal;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    pub event_id: Uuid,

    /// Discipline key of a crewed class, e.g. `D-10/X/200/Senior`
    #[validate(length(min = 1, max = 255))]
    pub discipline: String,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,

    #[validate(length(max = 255))]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub entrant_id: i32,
    #[serde(default = "default_role")]
    pub role: RoleTag,
}

fn default_role() -> RoleTag {
    RoleTag::Member
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMemberResponse {
    pub registration_id: Uuid,
    pub entrant_id: i32,
    pub role: Option<RoleTag>,
    pub status: RegistrationStatus,
}

impl From<Registration> for TeamMemberResponse {
    fn from(registration: Registration) -> Self {
        Self {
            registration_id: registration.registration_id,
            entrant_id: registration.entrant_id,
            role: registration.role,
            status: registration.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub discipline: String,
    pub member_count: i32,
    pub capacity: i32,
    pub members: Vec<TeamMemberResponse>,
    pub created_at: NaiveDateTime,
}

impl TeamResponse {
    pub fn new(team: Team, members: Vec<Registration>) -> Self {
        Self {
            discipline: team.discipline().to_string(),
            team_id: team.team_id,
            event_id: team.event_id,
            name: team.name,
            city: team.city,
            member_count: team.member_count,
            capacity: team.capacity,
            members: members.into_iter().map(TeamMemberResponse::from).collect(),
            created_at: team.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoveMemberResponse {
    pub registration_id: Uuid,
    pub status: RegistrationStatus,
    /// Set when the last member left and the team was deleted
    pub team_deleted: bool,
}

impl From<Removal> for RemoveMemberResponse {
    fn from(removal: Removal) -> Self {
        Self {
            registration_id: removal.registration.registration_id,
            status: removal.registration.status,
            team_deleted: removal.team_deleted,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecomputeResponse {
    pub team_id: Uuid,
    pub changes: Vec<StatusChange>,
}
