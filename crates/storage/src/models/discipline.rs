use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    /// Mixed crews, never an entrant's own sex.
    #[serde(rename = "X")]
    Mixed,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Mixed => "X",
        }
    }

    /// Whether an entrant of sex `entrant` may start in a discipline of this sex.
    pub fn admits(&self, entrant: Sex) -> bool {
        match self {
            Self::Mixed => entrant != Self::Mixed,
            own => *own == entrant,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "MEN" => Ok(Self::Male),
            "F" | "FEMALE" | "WOMEN" => Ok(Self::Female),
            "X" | "MIXED" => Ok(Self::Mixed),
            other => Err(EngineError::Validation(format!("unknown sex '{other}'"))),
        }
    }
}

/// The bucket entrants compete within: boat class, sex, distance and age group.
///
/// Equality is structural, so two keys built from differently formatted
/// input (extra whitespace, other casing of the sex) compare equal once parsed.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub struct DisciplineKey {
    pub boat_class: String,
    pub sex: Sex,
    pub distance_m: u32,
    pub age_group: String,
}

impl DisciplineKey {
    pub fn new(
        boat_class: impl Into<String>,
        sex: Sex,
        distance_m: u32,
        age_group: impl Into<String>,
    ) -> Self {
        Self {
            boat_class: boat_class.into().trim().to_string(),
            sex,
            distance_m,
            age_group: age_group.into().trim().to_string(),
        }
    }
}

impl fmt::Display for DisciplineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.boat_class, self.sex, self.distance_m, self.age_group
        )
    }
}

impl FromStr for DisciplineKey {
    type Err = EngineError;

    /// Parses the `class/sex/distance/age_group` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').map(str::trim).collect();
        let [boat_class, sex, distance, age_group] = parts.as_slice() else {
            return Err(EngineError::Validation(format!(
                "discipline '{s}' must look like class/sex/distance/age_group"
            )));
        };

        if boat_class.is_empty() || age_group.is_empty() {
            return Err(EngineError::Validation(format!(
                "discipline '{s}' has an empty component"
            )));
        }

        let distance_m = distance.parse().map_err(|_| {
            EngineError::Validation(format!("distance '{distance}' is not a number of meters"))
        })?;

        Ok(Self::new(*boat_class, sex.parse()?, distance_m, *age_group))
    }
}

/// One age group band, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgeBand {
    pub label: String,
    pub min_age: u32,
    pub max_age: Option<u32>,
}

impl AgeBand {
    pub fn new(label: impl Into<String>, min_age: u32, max_age: Option<u32>) -> Self {
        Self {
            label: label.into(),
            min_age,
            max_age,
        }
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && self.max_age.is_none_or(|max| age <= max)
    }
}

/// Ordered age bands of an event; the first matching band wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AgeBands(pub Vec<AgeBand>);

impl Default for AgeBands {
    fn default() -> Self {
        Self(vec![
            AgeBand::new("Junior", 0, Some(18)),
            AgeBand::new("Senior", 19, Some(34)),
            AgeBand::new("Master", 35, None),
        ])
    }
}

impl AgeBands {
    /// Age in the competition year, the usual convention for paddling age groups.
    pub fn competition_age(birth_date: NaiveDate, event_date: NaiveDate) -> u32 {
        (event_date.year() - birth_date.year()).max(0) as u32
    }

    pub fn group_for(
        &self,
        birth_date: NaiveDate,
        event_date: NaiveDate,
    ) -> Result<&str, EngineError> {
        let age = Self::competition_age(birth_date, event_date);
        self.0
            .iter()
            .find(|band| band.contains(age))
            .map(|band| band.label.as_str())
            .ok_or_else(|| EngineError::Validation(format!("no age group covers age {age}")))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|band| band.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discipline_key_round_trips_through_display() {
        let key = DisciplineKey::new("K-1", Sex::Male, 500, "Senior");
        assert_eq!(key.to_string(), "K-1/M/500/Senior");
        assert_eq!("K-1/M/500/Senior".parse::<DisciplineKey>().unwrap(), key);
    }

    #[test]
    fn test_discipline_key_ignores_formatting_drift() {
        let key: DisciplineKey = " K-1 / m / 500 / Senior ".parse().unwrap();
        assert_eq!(key, DisciplineKey::new("K-1", Sex::Male, 500, "Senior"));
    }

    #[test]
    fn test_discipline_key_rejects_malformed_input() {
        assert!("K-1-M-500-Senior".parse::<DisciplineKey>().is_err());
        assert!("K-1/M/far/Senior".parse::<DisciplineKey>().is_err());
        assert!("K-1/M/500/".parse::<DisciplineKey>().is_err());
    }

    #[test]
    fn test_mixed_admits_both_sexes() {
        assert!(Sex::Mixed.admits(Sex::Male));
        assert!(Sex::Mixed.admits(Sex::Female));
        assert!(!Sex::Female.admits(Sex::Male));
    }

    #[test]
    fn test_age_group_uses_competition_year() {
        let bands = AgeBands::default();
        let event = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        // turns 19 in December, still a senior for the whole season
        let born = NaiveDate::from_ymd_opt(2006, 12, 31).unwrap();
        assert_eq!(bands.group_for(born, event).unwrap(), "Senior");

        let born = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert_eq!(bands.group_for(born, event).unwrap(), "Junior");

        let born = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        assert_eq!(bands.group_for(born, event).unwrap(), "Master");
    }

    #[test]
    fn test_age_group_gap_is_an_error() {
        let bands = AgeBands(vec![AgeBand::new("Senior", 19, Some(34))]);
        let event = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let born = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        assert!(bands.group_for(born, event).is_err());
    }
}
