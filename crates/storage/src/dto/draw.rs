use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Competitor, Round};
use crate::repository::heat::HeatWithLanes;
use crate::services::draws::DrawOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DrawRequest {
    /// Discipline key, e.g. `K-1/M/500/Senior`
    #[validate(length(min = 1, max = 255))]
    pub discipline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LaneResponse {
    pub lane: i32,
    pub competitor: Option<Competitor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatResponse {
    pub heat_id: Uuid,
    pub discipline: String,
    pub round: Round,
    pub heat_number: i32,
    pub lanes: Vec<LaneResponse>,
}

impl From<HeatWithLanes> for HeatResponse {
    fn from(drawn: HeatWithLanes) -> Self {
        Self {
            heat_id: drawn.heat.heat_id,
            discipline: drawn.heat.discipline().to_string(),
            round: drawn.heat.round,
            heat_number: drawn.heat.heat_number,
            lanes: drawn
                .lanes
                .into_iter()
                .map(|lane| LaneResponse {
                    lane: lane.lane,
                    competitor: lane.competitor(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawResponse {
    pub discipline: String,
    /// Rounds still to be raced, the drawn one first
    pub rounds: Vec<Round>,
    pub heats: Vec<HeatResponse>,
}

impl From<DrawOutcome> for DrawResponse {
    fn from(outcome: DrawOutcome) -> Self {
        Self {
            discipline: outcome.discipline.to_string(),
            rounds: outcome.rounds,
            heats: outcome.heats.into_iter().map(HeatResponse::from).collect(),
        }
    }
}
