use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{BoatClass, Entrant, Sex};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEntrantRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255))]
    pub last_name: String,

    #[validate(custom(function = "validate_entrant_sex"))]
    pub sex: Sex,

    pub birth_date: NaiveDate,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    /// Boat classes the entrant may start in, e.g. `["K-1", "D-10"]`
    #[validate(custom(function = "validate_boat_classes"))]
    pub boat_classes: Vec<String>,
}

fn validate_entrant_sex(sex: &Sex) -> Result<(), validator::ValidationError> {
    if *sex == Sex::Mixed {
        return Err(validator::ValidationError::new("mixed_is_for_crews"));
    }
    Ok(())
}

fn validate_boat_classes(classes: &[String]) -> Result<(), validator::ValidationError> {
    if classes.iter().all(|c| BoatClass::parse(c).is_ok()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unknown_boat_class"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntrantResponse {
    pub entrant_id: i32,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    pub city: Option<String>,
    pub boat_classes: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl From<Entrant> for EntrantResponse {
    fn from(entrant: Entrant) -> Self {
        Self {
            entrant_id: entrant.entrant_id,
            display_name: entrant.display_name(),
            first_name: entrant.first_name,
            last_name: entrant.last_name,
            sex: entrant.sex,
            birth_date: entrant.birth_date,
            city: entrant.city,
            boat_classes: entrant.boat_classes.0,
            created_at: entrant.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sex: Sex, classes: &[&str]) -> CreateEntrantRequest {
        CreateEntrantRequest {
            first_name: "Anna".to_string(),
            last_name: "Petrova".to_string(),
            sex,
            birth_date: NaiveDate::from_ymd_opt(1998, 3, 14).unwrap(),
            city: None,
            boat_classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_entrant_sex_cannot_be_mixed() {
        assert!(request(Sex::Female, &["K-1"]).validate().is_ok());
        assert!(request(Sex::Mixed, &["K-1"]).validate().is_err());
    }

    #[test]
    fn test_boat_classes_must_parse() {
        assert!(request(Sex::Male, &["K-2", "D-10"]).validate().is_ok());
        assert!(request(Sex::Male, &["K-3"]).validate().is_err());
    }
}
