use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{AgeBands, BoatClass, DisciplineKey, Sex};

/// Lifecycle of an event. Only `RegistrationOpen` accepts confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    RegistrationOpen,
    RegistrationClosed,
    Live,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::RegistrationOpen => "registration_open",
            Self::RegistrationClosed => "registration_closed",
            Self::Live => "live",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn accepts_registrations(&self) -> bool {
        matches!(self, Self::RegistrationOpen)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "registration_open" => Ok(Self::RegistrationOpen),
            "registration_closed" => Ok(Self::RegistrationClosed),
            "live" => Ok(Self::Live),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "unknown event status '{other}'"
            ))),
        }
    }
}

/// Sexes, distances and age groups offered for one boat class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassProgram {
    pub sexes: Vec<Sex>,
    pub distances: Vec<u32>,
    pub age_groups: Vec<String>,
}

/// The event configuration `class -> {sexes, distances, age groups}`.
///
/// Disciplines are never stored; they are derived from this table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventProgram {
    pub classes: BTreeMap<String, ClassProgram>,
    #[serde(default)]
    pub age_bands: AgeBands,
}

impl EventProgram {
    /// Every discipline of the program, ordered by class, sex, distance, age group.
    pub fn disciplines(&self) -> Vec<DisciplineKey> {
        let mut keys: Vec<DisciplineKey> = self
            .classes
            .iter()
            .flat_map(|(class, program)| {
                program.sexes.iter().flat_map(move |sex| {
                    program.distances.iter().flat_map(move |distance| {
                        program.age_groups.iter().map(move |age_group| {
                            DisciplineKey::new(class.as_str(), *sex, *distance, age_group.as_str())
                        })
                    })
                })
            })
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn contains(&self, key: &DisciplineKey) -> bool {
        self.classes.get(&key.boat_class).is_some_and(|program| {
            program.sexes.contains(&key.sex)
                && program.distances.contains(&key.distance_m)
                && program.age_groups.iter().any(|g| g == &key.age_group)
        })
    }

    /// Names must already be in the form discipline keys are built in,
    /// otherwise `contains` misses the disciplines `disciplines` lists.
    pub fn check_names(&self) -> Result<(), EngineError> {
        for (name, offer) in &self.classes {
            let class = BoatClass::parse(name)?;
            if class.name() != name {
                return Err(EngineError::Validation(format!(
                    "boat class '{name}' must be written as '{class}'"
                )));
            }
            if let Some(group) = offer.age_groups.iter().find(|g| !is_canonical(g)) {
                return Err(EngineError::Validation(format!(
                    "age group '{group}' of {name} must be non-empty and trimmed"
                )));
            }
        }
        if let Some(label) = self.age_bands.labels().find(|l| !is_canonical(l)) {
            return Err(EngineError::Validation(format!(
                "age band '{label}' must be non-empty and trimmed"
            )));
        }
        Ok(())
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

fn is_canonical(label: &str) -> bool {
    !label.is_empty() && label.trim() == label
}

/// Heat capacity and advancement configuration of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DrawSettings {
    pub lane_capacity: u32,
    /// Top finishers of every heat that advance to the next round.
    pub advance_per_heat: u32,
    /// Additional fastest non-qualifiers across all heats of a round.
    pub advance_by_time: u32,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            lane_capacity: 9,
            advance_per_heat: 3,
            advance_by_time: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: EventStatus,
    pub city: Option<String>,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    #[schema(value_type = EventProgram)]
    pub program: Json<EventProgram>,
    pub lane_capacity: i32,
    pub advance_per_heat: i32,
    pub advance_by_time: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Event {
    pub fn draw_settings(&self) -> DrawSettings {
        DrawSettings {
            lane_capacity: self.lane_capacity.max(0) as u32,
            advance_per_heat: self.advance_per_heat.max(0) as u32,
            advance_by_time: self.advance_by_time.max(0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> EventProgram {
        let mut classes = BTreeMap::new();
        classes.insert(
            "K-1".to_string(),
            ClassProgram {
                sexes: vec![Sex::Male, Sex::Female],
                distances: vec![200, 500],
                age_groups: vec!["Senior".to_string()],
            },
        );
        classes.insert(
            "D-10".to_string(),
            ClassProgram {
                sexes: vec![Sex::Mixed],
                distances: vec![200],
                age_groups: vec!["Senior".to_string(), "Master".to_string()],
            },
        );
        EventProgram {
            classes,
            age_bands: AgeBands::default(),
        }
    }

    #[test]
    fn test_disciplines_are_the_cross_product() {
        let disciplines = program().disciplines();
        assert_eq!(disciplines.len(), 4 + 2);
        assert_eq!(
            disciplines[0],
            DisciplineKey::new("D-10", Sex::Mixed, 200, "Master")
        );
    }

    #[test]
    fn test_padded_class_name_is_rejected() {
        let mut program = program();
        let offer = program.classes.remove("K-1").unwrap();
        program.classes.insert(" K-2".to_string(), offer);

        assert!(matches!(
            program.check_names(),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_padded_age_group_is_rejected() {
        let mut padded_group = program();
        padded_group.classes.get_mut("K-1").unwrap().age_groups = vec!["Senior ".to_string()];
        assert!(padded_group.check_names().is_err());

        let mut padded_band = program();
        padded_band.age_bands.0[0].label = " Junior".to_string();
        assert!(padded_band.check_names().is_err());
    }

    #[test]
    fn test_canonical_program_lists_only_disciplines_it_contains() {
        let program = program();
        assert!(program.check_names().is_ok());
        let listed = program.disciplines();
        assert!(listed.iter().all(|key| program.contains(key)));
    }

    #[test]
    fn test_contains_checks_every_component() {
        let program = program();
        assert!(program.contains(&DisciplineKey::new("K-1", Sex::Female, 500, "Senior")));
        assert!(!program.contains(&DisciplineKey::new("K-1", Sex::Female, 1000, "Senior")));
        assert!(!program.contains(&DisciplineKey::new("K-2", Sex::Female, 500, "Senior")));
        assert!(!program.contains(&DisciplineKey::new("D-10", Sex::Male, 200, "Senior")));
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in [
            EventStatus::Draft,
            EventStatus::RegistrationOpen,
            EventStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
        assert!(EventStatus::RegistrationOpen.accepts_registrations());
        assert!(!EventStatus::Live.accepts_registrations());
    }
}
