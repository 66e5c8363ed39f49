use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{DisciplineKey, DrawSettings, Event, EventProgram, EventStatus, Sex};

/// Request payload for creating an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Slug must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    /// Defaults to `draft`
    pub status: Option<EventStatus>,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub program: EventProgram,

    /// Falls back to the server defaults for anything left out
    pub draw_settings: Option<DrawSettingsRequest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DrawSettingsRequest {
    pub lane_capacity: Option<u32>,
    pub advance_per_heat: Option<u32>,
    pub advance_by_time: Option<u32>,
}

impl DrawSettingsRequest {
    pub fn resolve(&self, defaults: DrawSettings) -> DrawSettings {
        DrawSettings {
            lane_capacity: self.lane_capacity.unwrap_or(defaults.lane_capacity),
            advance_per_heat: self.advance_per_heat.unwrap_or(defaults.advance_per_heat),
            advance_by_time: self.advance_by_time.unwrap_or(defaults.advance_by_time),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: EventStatus,
    pub city: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program: EventProgram,
    pub draw_settings: DrawSettings,
    pub created_at: chrono::NaiveDateTime,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let draw_settings = event.draw_settings();
        Self {
            event_id: event.event_id,
            name: event.name,
            slug: event.slug,
            status: event.status,
            city: event.city,
            start_date: event.start_date,
            end_date: event.end_date,
            program: event.program.0,
            draw_settings,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisciplineResponse {
    /// Canonical key, usable as the `discipline` query parameter
    pub key: String,
    pub boat_class: String,
    pub sex: Sex,
    pub distance_m: u32,
    pub age_group: String,
}

impl From<DisciplineKey> for DisciplineResponse {
    fn from(key: DisciplineKey) -> Self {
        Self {
            key: key.to_string(),
            boat_class: key.boat_class,
            sex: key.sex,
            distance_m: key.distance_m,
            age_group: key.age_group,
        }
    }
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    let is_valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--");

    if is_valid {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_slug"))
    }
}

impl CreateEventRequest {
    /// Checks that need more than one field
    pub fn validate_consistency(&self) -> Result<(), String> {
        if self.end_date < self.start_date {
            return Err("End date must be on or after start date".to_string());
        }

        if self.program.classes.is_empty() {
            return Err("The program must offer at least one boat class".to_string());
        }

        self.program.check_names().map_err(|e| e.to_string())?;

        for (class, offer) in &self.program.classes {
            if offer.sexes.is_empty() || offer.distances.is_empty() || offer.age_groups.is_empty()
            {
                return Err(format!(
                    "Boat class {class} needs at least one sex, distance and age group"
                ));
            }
            if let Some(unknown) = offer
                .age_groups
                .iter()
                .find(|g| !self.program.age_bands.labels().any(|label| label == g.as_str()))
            {
                return Err(format!("Age group {unknown} has no age band"));
            }
        }

        if let Some(settings) = &self.draw_settings
            && settings.lane_capacity == Some(0)
        {
            return Err("Lane capacity must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassProgram;
    use std::collections::BTreeMap;

    fn request() -> CreateEventRequest {
        let mut classes = BTreeMap::new();
        classes.insert(
            "K-1".to_string(),
            ClassProgram {
                sexes: vec![Sex::Male],
                distances: vec![200],
                age_groups: vec!["Senior".to_string()],
            },
        );
        CreateEventRequest {
            name: "Spring Regatta".to_string(),
            slug: "spring-regatta".to_string(),
            status: None,
            city: Some("Kazan".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 11).unwrap(),
            program: EventProgram {
                classes,
                age_bands: Default::default(),
            },
            draw_settings: None,
        }
    }

    #[test]
    fn test_valid_request() {
        let req = request();
        assert!(req.validate().is_ok());
        assert!(req.validate_consistency().is_ok());
    }

    #[test]
    fn test_slug_format() {
        let mut req = request();
        req.slug = "Spring Regatta".to_string();
        assert!(req.validate().is_err());

        req.slug = "spring--regatta".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_dates_and_program_are_checked() {
        let mut req = request();
        req.end_date = NaiveDate::from_ymd_opt(2025, 5, 9).unwrap();
        assert!(req.validate_consistency().is_err());

        let mut req = request();
        req.program.classes.clear();
        assert!(req.validate_consistency().is_err());

        let mut req = request();
        if let Some(offer) = req.program.classes.get_mut("K-1") {
            offer.age_groups = vec!["Veteran".to_string()];
        }
        assert!(req.validate_consistency().is_err());
    }

    #[test]
    fn test_program_names_must_be_canonical() {
        let mut req = request();
        let offer = req.program.classes.remove("K-1").unwrap();
        req.program.classes.insert("K-1 ".to_string(), offer);
        assert!(req.validate_consistency().is_err());
    }

    #[test]
    fn test_draw_settings_fill_from_defaults() {
        let partial = DrawSettingsRequest {
            lane_capacity: Some(8),
            ..Default::default()
        };
        let settings = partial.resolve(DrawSettings::default());
        assert_eq!(settings.lane_capacity, 8);
        assert_eq!(settings.advance_per_heat, 3);
        assert_eq!(settings.advance_by_time, 0);
    }
}
