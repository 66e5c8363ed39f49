use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::EngineError;
use crate::models::{Competitor, DisciplineKey, Round};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MedalTally {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    /// Every placed competitor, medal or not.
    pub total: u32,
}

impl MedalTally {
    fn credit(&mut self, place: u32) {
        match place {
            1 => self.gold += 1,
            2 => self.silver += 1,
            3 => self.bronze += 1,
            _ => {}
        }
        self.total += 1;
    }

    fn merge(&mut self, other: &MedalTally) {
        self.gold += other.gold;
        self.silver += other.silver;
        self.bronze += other.bronze;
        self.total += other.total;
    }
}

/// A placement together with the heat context needed to bucket it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedResult {
    pub discipline: DisciplineKey,
    pub round: Round,
    pub competitor: Competitor,
    pub place: u32,
}

/// Places within one heat must be positive and unique; ties are entry errors.
pub fn validate_places(places: impl IntoIterator<Item = u32>) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for place in places {
        if place == 0 {
            return Err(EngineError::Validation(
                "places start at 1".to_string(),
            ));
        }
        if !seen.insert(place) {
            return Err(EngineError::Validation(format!(
                "place {place} is recorded twice in the same heat"
            )));
        }
    }
    Ok(())
}

/// Medal tallies per discipline, folded from final-round placements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedalTable {
    by_discipline: BTreeMap<DisciplineKey, MedalTally>,
}

impl MedalTable {
    /// Pure fold over the placements: the input order does not matter and
    /// folding the same set twice gives the same table.
    pub fn aggregate<'a>(placements: impl IntoIterator<Item = &'a PlacedResult>) -> Self {
        let mut by_discipline: BTreeMap<DisciplineKey, MedalTally> = BTreeMap::new();
        for placement in placements {
            if placement.round != Round::Final {
                continue;
            }
            by_discipline
                .entry(placement.discipline.clone())
                .or_default()
                .credit(placement.place);
        }
        Self { by_discipline }
    }

    pub fn tally(&self, discipline: &DisciplineKey) -> MedalTally {
        self.by_discipline
            .get(discipline)
            .copied()
            .unwrap_or_default()
    }

    pub fn overall(&self) -> MedalTally {
        self.by_discipline
            .values()
            .fold(MedalTally::default(), |mut acc, tally| {
                acc.merge(tally);
                acc
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DisciplineKey, &MedalTally)> {
        self.by_discipline.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use uuid::Uuid;

    fn placed(discipline: &DisciplineKey, round: Round, id: u128, place: u32) -> PlacedResult {
        PlacedResult {
            discipline: discipline.clone(),
            round,
            competitor: Competitor::Individual(Uuid::from_u128(id)),
            place,
        }
    }

    fn sample() -> (DisciplineKey, DisciplineKey, Vec<PlacedResult>) {
        let k1 = DisciplineKey::new("K-1", Sex::Male, 500, "Senior");
        let dragon = DisciplineKey::new("D-10", Sex::Mixed, 200, "Senior");
        let placements = vec![
            placed(&k1, Round::Final, 1, 1),
            placed(&k1, Round::Final, 2, 2),
            placed(&k1, Round::Final, 3, 3),
            placed(&k1, Round::Final, 4, 4),
            placed(&k1, Round::Semifinal, 5, 1),
            placed(&dragon, Round::Final, 6, 1),
            placed(&dragon, Round::Final, 7, 2),
        ];
        (k1, dragon, placements)
    }

    #[test]
    fn test_final_places_become_medals() {
        let (k1, dragon, placements) = sample();
        let table = MedalTable::aggregate(&placements);

        assert_eq!(
            table.tally(&k1),
            MedalTally {
                gold: 1,
                silver: 1,
                bronze: 1,
                total: 4
            }
        );
        assert_eq!(
            table.tally(&dragon),
            MedalTally {
                gold: 1,
                silver: 1,
                bronze: 0,
                total: 2
            }
        );
        assert_eq!(table.overall().total, 6);
    }

    #[test]
    fn test_tally_ignores_input_order() {
        let (_, _, placements) = sample();
        let forward = MedalTable::aggregate(&placements);

        let mut shuffled = placements.clone();
        shuffled.reverse();
        shuffled.rotate_left(3);
        assert_eq!(MedalTable::aggregate(&shuffled), forward);

        // folding again is idempotent
        assert_eq!(MedalTable::aggregate(&placements), forward);
    }

    #[test]
    fn test_unknown_discipline_has_empty_tally() {
        let table = MedalTable::aggregate(&Vec::<PlacedResult>::new());
        let key = DisciplineKey::new("C-1", Sex::Female, 200, "Junior");
        assert_eq!(table.tally(&key), MedalTally::default());
    }

    #[test]
    fn test_places_must_be_positive_and_unique() {
        assert!(validate_places([1, 2, 3]).is_ok());
        assert!(validate_places([3, 1]).is_ok());
        assert!(validate_places([1, 1]).is_err());
        assert!(validate_places([0, 1]).is_err());
    }
}
