use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{EngineError, Result, StorageError};
use crate::models::{Competitor, DisciplineKey, Placement};
use crate::repository::event::EventRepository;
use crate::repository::heat::HeatRepository;
use crate::repository::placement::PlacementRepository;
use crate::services::results_aggregator::{MedalTable, MedalTally, validate_places};

/// One finish as entered by the results desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementEntry {
    pub competitor: Competitor,
    pub place: u32,
    pub finish_time: Option<Decimal>,
}

/// Entries must name distinct competitors that hold a lane in the heat.
pub fn check_entries(
    lane_holders: &HashSet<Competitor>,
    entries: &[PlacementEntry],
) -> std::result::Result<(), EngineError> {
    if entries.is_empty() {
        return Err(EngineError::Validation(
            "at least one placement is required".to_string(),
        ));
    }
    validate_places(entries.iter().map(|e| e.place))?;

    let mut seen = HashSet::new();
    for entry in entries {
        if !lane_holders.contains(&entry.competitor) {
            return Err(EngineError::Validation(format!(
                "competitor {} does not race in this heat",
                entry.competitor.id()
            )));
        }
        if !seen.insert(entry.competitor) {
            return Err(EngineError::Validation(format!(
                "competitor {} is placed twice",
                entry.competitor.id()
            )));
        }
        if entry.finish_time.is_some_and(|t| t <= Decimal::ZERO) {
            return Err(EngineError::Validation(format!(
                "finish time of competitor {} must be positive",
                entry.competitor.id()
            )));
        }
    }
    Ok(())
}

pub struct Results<'a> {
    pool: &'a PgPool,
}

impl<'a> Results<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Records a heat's finishes all-or-nothing. A heat with results only
    /// accepts a full replacement (`replace`), used for corrections.
    pub async fn record_placements(
        &self,
        heat_id: Uuid,
        entries: &[PlacementEntry],
        replace: bool,
    ) -> Result<Vec<Placement>> {
        let mut tx = self.pool.begin().await?;

        HeatRepository::lock(&mut tx, heat_id).await?;
        let lane_holders: HashSet<Competitor> = HeatRepository::lanes_in(&mut tx, heat_id)
            .await?
            .iter()
            .filter_map(|lane| lane.competitor())
            .collect();

        check_entries(&lane_holders, entries)
            .inspect_err(|e| tracing::warn!(%heat_id, "Placements rejected: {e}"))?;

        let recorded = PlacementRepository::count_for_heat(&mut tx, heat_id).await?;
        if recorded > 0 {
            if !replace {
                return Err(StorageError::ConstraintViolation(format!(
                    "Heat {heat_id} already has results; submit them as a correction"
                )));
            }
            PlacementRepository::delete_for_heat(&mut tx, heat_id).await?;
        }

        let mut placements = Vec::with_capacity(entries.len());
        for entry in entries {
            let placement = PlacementRepository::insert(
                &mut tx,
                heat_id,
                entry.competitor,
                entry.place,
                entry.finish_time,
            )
            .await?;
            placements.push(placement);
        }
        placements.sort_by_key(|p| p.place);

        tx.commit().await?;

        tracing::info!(
            %heat_id,
            placements = placements.len(),
            corrected = recorded > 0,
            "Heat results recorded"
        );
        Ok(placements)
    }

    pub async fn placements(&self, heat_id: Uuid) -> Result<Vec<Placement>> {
        HeatRepository::new(self.pool).find_by_id(heat_id).await?;
        PlacementRepository::new(self.pool)
            .list_for_heat(heat_id)
            .await
    }

    pub async fn medal_table(&self, event_id: Uuid) -> Result<MedalTable> {
        EventRepository::new(self.pool).find_by_id(event_id).await?;
        let placed = PlacementRepository::new(self.pool)
            .list_placed_results(event_id)
            .await?;
        Ok(MedalTable::aggregate(&placed))
    }

    pub async fn medal_tally(&self, event_id: Uuid, discipline: &DisciplineKey) -> Result<MedalTally> {
        Ok(self.medal_table(event_id).await?.tally(discipline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(id: u128) -> Competitor {
        Competitor::Individual(Uuid::from_u128(id))
    }

    fn entry(id: u128, place: u32, seconds: i64) -> PlacementEntry {
        PlacementEntry {
            competitor: runner(id),
            place,
            finish_time: Some(Decimal::new(seconds, 0)),
        }
    }

    fn lanes() -> HashSet<Competitor> {
        [runner(1), runner(2), runner(3)].into_iter().collect()
    }

    #[test]
    fn test_valid_entries_pass() {
        let entries = [entry(2, 1, 110), entry(1, 2, 112), entry(3, 3, 115)];
        assert!(check_entries(&lanes(), &entries).is_ok());
    }

    #[test]
    fn test_competitor_must_hold_a_lane() {
        let entries = [entry(1, 1, 110), entry(9, 2, 112)];
        assert!(check_entries(&lanes(), &entries).is_err());

        let crew = [PlacementEntry {
            competitor: Competitor::Crew(Uuid::from_u128(1)),
            place: 1,
            finish_time: None,
        }];
        assert!(check_entries(&lanes(), &crew).is_err());
    }

    #[test]
    fn test_ties_and_duplicates_are_rejected() {
        assert!(check_entries(&lanes(), &[entry(1, 1, 110), entry(2, 1, 110)]).is_err());
        assert!(check_entries(&lanes(), &[entry(1, 1, 110), entry(1, 2, 111)]).is_err());
        assert!(check_entries(&lanes(), &[]).is_err());
    }

    #[test]
    fn test_finish_time_must_be_positive() {
        assert!(check_entries(&lanes(), &[entry(1, 1, 0)]).is_err());
    }
}
