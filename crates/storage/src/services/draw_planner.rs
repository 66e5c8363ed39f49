//! Heat structure of a discipline.
//!
//! Planning is a two step pipeline: the first call allocates the opening
//! round from the registered pool, later calls allocate the next round from
//! recorded finishes once they have been entered.

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::EngineError;
use crate::models::{Competitor, DisciplineKey, DrawSettings, Round};
use crate::services::results_aggregator::validate_places;

/// Entrant counts deciding how many rounds a discipline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawThresholds {
    /// Up to this many entrants race a straight final.
    pub final_only_max: u32,
    /// Up to this many entrants race semifinals and a final.
    pub two_rounds_max: u32,
}

impl Default for DrawThresholds {
    fn default() -> Self {
        Self {
            final_only_max: 9,
            two_rounds_max: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlannedLane {
    pub lane: u32,
    pub competitor: Competitor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlannedHeat {
    pub round: Round,
    pub heat_number: u32,
    pub lanes: Vec<PlannedLane>,
}

impl PlannedHeat {
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Rounds the discipline will run and the heats of the round allocated now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DrawPlan {
    pub discipline: DisciplineKey,
    pub rounds: Vec<Round>,
    pub heats: Vec<PlannedHeat>,
}

impl DrawPlan {
    /// The round whose heats this plan allocates.
    pub fn round(&self) -> Option<Round> {
        self.heats.first().map(|heat| heat.round)
    }
}

/// One competitor's recorded finish, as fed back for the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finish {
    pub competitor: Competitor,
    pub place: u32,
    pub finish_time: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatResult {
    pub heat_number: u32,
    pub finishes: Vec<Finish>,
}

pub fn round_structure(entrants: u32, lane_capacity: u32, thresholds: DrawThresholds) -> Vec<Round> {
    // a pool that cannot share one start line never becomes a straight final
    let final_only_max = thresholds.final_only_max.min(lane_capacity);

    if entrants <= final_only_max {
        vec![Round::Final]
    } else if entrants <= thresholds.two_rounds_max {
        vec![Round::Semifinal, Round::Final]
    } else {
        vec![Round::Preliminary, Round::Semifinal, Round::Final]
    }
}

/// Deals competitors across `ceil(n / lane_capacity)` heats in input order,
/// so heat sizes differ by at most one. Lanes follow dealing order.
pub fn split_into_heats(
    round: Round,
    competitors: &[Competitor],
    lane_capacity: u32,
) -> Result<Vec<PlannedHeat>, EngineError> {
    if lane_capacity == 0 {
        return Err(EngineError::Validation(
            "lane capacity must be at least 1".to_string(),
        ));
    }

    let heat_count = competitors.len().div_ceil(lane_capacity as usize);
    let mut heats: Vec<PlannedHeat> = (1..=heat_count as u32)
        .map(|heat_number| PlannedHeat {
            round,
            heat_number,
            lanes: Vec::new(),
        })
        .collect();

    for (index, competitor) in competitors.iter().enumerate() {
        let heat = &mut heats[index % heat_count];
        heat.lanes.push(PlannedLane {
            lane: heat.lanes.len() as u32 + 1,
            competitor: *competitor,
        });
    }

    Ok(heats)
}

fn ensure_unique(competitors: &[Competitor]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for competitor in competitors {
        if !seen.insert(competitor.id()) {
            return Err(EngineError::Validation(format!(
                "competitor {} appears twice in the draw pool",
                competitor.id()
            )));
        }
    }
    Ok(())
}

/// Allocates the opening round for a discipline's registered pool.
pub fn plan_draw(
    discipline: &DisciplineKey,
    pool: &[Competitor],
    settings: &DrawSettings,
    thresholds: DrawThresholds,
) -> Result<DrawPlan, EngineError> {
    if pool.is_empty() {
        return Err(EngineError::EmptyPool {
            discipline: discipline.clone(),
        });
    }
    ensure_unique(pool)?;

    let rounds = round_structure(pool.len() as u32, settings.lane_capacity, thresholds);
    let heats = split_into_heats(rounds[0], pool, settings.lane_capacity)?;

    Ok(DrawPlan {
        discipline: discipline.clone(),
        rounds,
        heats,
    })
}

fn by_time(a: &Option<Decimal>, b: &Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Picks advancers from a finished round and allocates the round after it.
///
/// The top `advance_per_heat` of every heat qualify directly, seeded by place,
/// then time, then heat number. The `advance_by_time` fastest of the rest
/// follow. The final always runs as one heat.
pub fn plan_next_round(
    discipline: &DisciplineKey,
    previous: Round,
    results: &[HeatResult],
    settings: &DrawSettings,
) -> Result<DrawPlan, EngineError> {
    let next = previous.next().ok_or_else(|| {
        EngineError::Validation(format!("{discipline} has no round after the final"))
    })?;

    let mut direct: Vec<(u32, &Finish)> = Vec::new();
    let mut remaining: Vec<(u32, &Finish)> = Vec::new();

    for heat in results {
        validate_places(heat.finishes.iter().map(|f| f.place))?;

        let mut finishes: Vec<&Finish> = heat.finishes.iter().collect();
        finishes.sort_by_key(|f| f.place);

        for (index, finish) in finishes.into_iter().enumerate() {
            if (index as u32) < settings.advance_per_heat {
                direct.push((heat.heat_number, finish));
            } else {
                remaining.push((heat.heat_number, finish));
            }
        }
    }

    direct.sort_by(|(heat_a, a), (heat_b, b)| {
        a.place
            .cmp(&b.place)
            .then_with(|| by_time(&a.finish_time, &b.finish_time))
            .then_with(|| heat_a.cmp(heat_b))
    });

    remaining.retain(|(_, finish)| finish.finish_time.is_some());
    remaining.sort_by(|(heat_a, a), (heat_b, b)| {
        by_time(&a.finish_time, &b.finish_time)
            .then_with(|| a.place.cmp(&b.place))
            .then_with(|| heat_a.cmp(heat_b))
    });
    remaining.truncate(settings.advance_by_time as usize);

    let advancers: Vec<Competitor> = direct
        .iter()
        .chain(remaining.iter())
        .map(|(_, finish)| finish.competitor)
        .collect();

    if advancers.is_empty() {
        return Err(EngineError::EmptyPool {
            discipline: discipline.clone(),
        });
    }
    ensure_unique(&advancers)?;

    if next == Round::Final && advancers.len() as u32 > settings.lane_capacity {
        return Err(EngineError::Validation(format!(
            "{} finalists for {discipline} exceed the lane capacity of {}",
            advancers.len(),
            settings.lane_capacity
        )));
    }

    let rounds: Vec<Round> = std::iter::successors(Some(next), Round::next).collect();
    let heats = split_into_heats(next, &advancers, settings.lane_capacity)?;

    Ok(DrawPlan {
        discipline: discipline.clone(),
        rounds,
        heats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use uuid::Uuid;

    fn discipline() -> DisciplineKey {
        DisciplineKey::new("K-1", Sex::Female, 200, "Senior")
    }

    fn pool(n: u32) -> Vec<Competitor> {
        (0..n)
            .map(|i| Competitor::Individual(Uuid::from_u128(i as u128 + 1)))
            .collect()
    }

    fn settings(lane_capacity: u32) -> DrawSettings {
        DrawSettings {
            lane_capacity,
            advance_per_heat: 3,
            advance_by_time: 0,
        }
    }

    fn sizes(plan: &DrawPlan) -> Vec<usize> {
        plan.heats.iter().map(PlannedHeat::len).collect()
    }

    #[test]
    fn test_small_pool_races_a_straight_final() {
        let plan = plan_draw(&discipline(), &pool(7), &settings(8), DrawThresholds::default())
            .unwrap();
        assert_eq!(plan.rounds, vec![Round::Final]);
        assert_eq!(plan.round(), Some(Round::Final));
        assert_eq!(sizes(&plan), vec![7]);
    }

    #[test]
    fn test_mid_pool_gets_semifinals_only() {
        let plan = plan_draw(&discipline(), &pool(15), &settings(8), DrawThresholds::default())
            .unwrap();
        assert_eq!(plan.rounds, vec![Round::Semifinal, Round::Final]);
        assert!(plan.heats.iter().all(|h| h.round == Round::Semifinal));
        assert_eq!(sizes(&plan), vec![8, 7]);
    }

    #[test]
    fn test_large_pool_starts_with_preliminaries() {
        let plan = plan_draw(&discipline(), &pool(25), &settings(8), DrawThresholds::default())
            .unwrap();
        assert_eq!(
            plan.rounds,
            vec![Round::Preliminary, Round::Semifinal, Round::Final]
        );
        assert_eq!(sizes(&plan), vec![7, 6, 6, 6]);
        assert_eq!(
            plan.heats.iter().map(|h| h.heat_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_final_never_exceeds_lane_capacity() {
        let plan = plan_draw(&discipline(), &pool(9), &settings(8), DrawThresholds::default())
            .unwrap();
        assert_eq!(plan.rounds, vec![Round::Semifinal, Round::Final]);
        assert_eq!(sizes(&plan), vec![5, 4]);
    }

    #[test]
    fn test_empty_pool_is_reported() {
        let err = plan_draw(&discipline(), &[], &settings(8), DrawThresholds::default())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::EmptyPool {
                discipline: discipline()
            }
        );
    }

    #[test]
    fn test_duplicate_competitor_is_rejected() {
        let mut entrants = pool(3);
        entrants.push(entrants[0]);
        assert!(matches!(
            plan_draw(&discipline(), &entrants, &settings(8), DrawThresholds::default()),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_draw_is_deterministic() {
        let entrants = pool(31);
        let first = plan_draw(&discipline(), &entrants, &settings(9), DrawThresholds::default());
        let second = plan_draw(&discipline(), &entrants, &settings(9), DrawThresholds::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_heats_are_balanced_and_within_capacity() {
        for lane_capacity in 1..=10 {
            for n in 1..=60 {
                let heats = split_into_heats(Round::Preliminary, &pool(n), lane_capacity).unwrap();
                let min = heats.iter().map(PlannedHeat::len).min().unwrap();
                let max = heats.iter().map(PlannedHeat::len).max().unwrap();
                assert!(max - min <= 1, "n={n} cap={lane_capacity}");
                assert!(max as u32 <= lane_capacity, "n={n} cap={lane_capacity}");
                assert_eq!(heats.iter().map(PlannedHeat::len).sum::<usize>(), n as usize);
                for heat in &heats {
                    let lanes: Vec<u32> = heat.lanes.iter().map(|l| l.lane).collect();
                    assert_eq!(lanes, (1..=heat.len() as u32).collect::<Vec<_>>());
                }
            }
        }
    }

    #[test]
    fn test_zero_lane_capacity_is_invalid() {
        assert!(split_into_heats(Round::Final, &pool(3), 0).is_err());
    }

    fn finish(id: u128, place: u32, seconds: i64) -> Finish {
        Finish {
            competitor: Competitor::Individual(Uuid::from_u128(id)),
            place,
            finish_time: Some(Decimal::new(seconds, 0)),
        }
    }

    #[test]
    fn test_next_round_takes_top_finishers_per_heat() {
        let results = vec![
            HeatResult {
                heat_number: 1,
                finishes: vec![finish(1, 1, 40), finish(2, 2, 41), finish(3, 3, 45)],
            },
            HeatResult {
                heat_number: 2,
                finishes: vec![finish(4, 2, 42), finish(5, 1, 39), finish(6, 3, 43)],
            },
        ];
        let settings = DrawSettings {
            lane_capacity: 8,
            advance_per_heat: 2,
            advance_by_time: 1,
        };

        let plan = plan_next_round(&discipline(), Round::Semifinal, &results, &settings).unwrap();

        assert_eq!(plan.rounds, vec![Round::Final]);
        assert_eq!(plan.heats.len(), 1);
        let order: Vec<Uuid> = plan.heats[0]
            .lanes
            .iter()
            .map(|l| l.competitor.id())
            .collect();
        // winners by time, then runners-up by time, then the fastest third
        assert_eq!(
            order,
            [5, 1, 2, 4, 6]
                .into_iter()
                .map(Uuid::from_u128)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_preliminaries_feed_semifinals() {
        let results: Vec<HeatResult> = (0..4u128)
            .map(|heat| HeatResult {
                heat_number: heat as u32 + 1,
                finishes: (0..6u128)
                    .map(|i| finish(heat * 10 + i + 1, i as u32 + 1, 40 + i as i64))
                    .collect(),
            })
            .collect();

        let plan =
            plan_next_round(&discipline(), Round::Preliminary, &results, &settings(8)).unwrap();

        assert_eq!(plan.rounds, vec![Round::Semifinal, Round::Final]);
        assert_eq!(sizes(&plan), vec![6, 6]);
    }

    #[test]
    fn test_no_round_after_final() {
        let results = vec![HeatResult {
            heat_number: 1,
            finishes: vec![finish(1, 1, 40)],
        }];
        assert!(matches!(
            plan_next_round(&discipline(), Round::Final, &results, &settings(8)),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_final_is_rejected() {
        let results: Vec<HeatResult> = (0..4u128)
            .map(|heat| HeatResult {
                heat_number: heat as u32 + 1,
                finishes: (0..4u128)
                    .map(|i| finish(heat * 10 + i + 1, i as u32 + 1, 40))
                    .collect(),
            })
            .collect();
        assert!(matches!(
            plan_next_round(&discipline(), Round::Semifinal, &results, &settings(8)),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_tied_places_in_results_are_rejected() {
        let results = vec![HeatResult {
            heat_number: 1,
            finishes: vec![finish(1, 1, 40), finish(2, 1, 40)],
        }];
        assert!(matches!(
            plan_next_round(&discipline(), Round::Semifinal, &results, &settings(8)),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_no_advancers_is_an_empty_pool() {
        let results = vec![HeatResult {
            heat_number: 1,
            finishes: Vec::new(),
        }];
        assert!(matches!(
            plan_next_round(&discipline(), Round::Semifinal, &results, &settings(8)),
            Err(EngineError::EmptyPool { .. })
        ));
    }
}
