use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Competitor, Placement};
use crate::services::results::PlacementEntry;
use crate::services::results_aggregator::{MedalTable, MedalTally};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlacementEntryRequest {
    pub competitor: Competitor,
    pub place: u32,
    /// Seconds
    pub finish_time: Option<Decimal>,
}

impl From<&PlacementEntryRequest> for PlacementEntry {
    fn from(req: &PlacementEntryRequest) -> Self {
        Self {
            competitor: req.competitor,
            place: req.place,
            finish_time: req.finish_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordPlacementsRequest {
    #[validate(length(min = 1, message = "At least one placement is required"))]
    pub entries: Vec<PlacementEntryRequest>,
    /// Replace results already recorded for the heat
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlacementResponse {
    pub placement_id: Uuid,
    pub heat_id: Uuid,
    pub competitor: Option<Competitor>,
    pub place: i32,
    pub finish_time: Option<Decimal>,
}

impl From<Placement> for PlacementResponse {
    fn from(placement: Placement) -> Self {
        Self {
            competitor: placement.competitor(),
            placement_id: placement.placement_id,
            heat_id: placement.heat_id,
            place: placement.place,
            finish_time: placement.finish_time,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedalQuery {
    /// Restrict the table to one discipline key
    pub discipline: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisciplineMedals {
    pub discipline: String,
    pub tally: MedalTally,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MedalTableResponse {
    pub disciplines: Vec<DisciplineMedals>,
    pub overall: MedalTally,
}

impl From<&MedalTable> for MedalTableResponse {
    fn from(table: &MedalTable) -> Self {
        Self {
            disciplines: table
                .iter()
                .map(|(key, tally)| DisciplineMedals {
                    discipline: key.to_string(),
                    tally: *tally,
                })
                .collect(),
            overall: table.overall(),
        }
    }
}
