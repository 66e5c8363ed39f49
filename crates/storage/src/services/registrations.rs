use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::registration::EligibleEntrant;
use crate::error::{EngineError, Result, StorageError};
use crate::models::{DisciplineKey, Entrant, Event, Registration};
use crate::repository::entrant::EntrantRepository;
use crate::repository::event::EventRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::team::TeamRepository;
use crate::services::roster_rules::RosterRules;
use crate::services::{registration_state, roster_builder};

/// Checks that an entrant may start in a discipline of an event.
pub fn check_eligibility(
    event: &Event,
    entrant: &Entrant,
    discipline: &DisciplineKey,
) -> std::result::Result<(), EngineError> {
    if !event.program.contains(discipline) {
        return Err(EngineError::Validation(format!(
            "{discipline} is not part of the program of {}",
            event.name
        )));
    }

    // every class in the program must resolve, not only the one signed up for
    RosterRules::from_program(&event.program)?.class(&discipline.boat_class)?;

    if !entrant.is_eligible_for(&discipline.boat_class) {
        return Err(EngineError::Validation(format!(
            "{} is not eligible for {}",
            entrant.display_name(),
            discipline.boat_class
        )));
    }

    if !discipline.sex.admits(entrant.sex) {
        return Err(EngineError::Validation(format!(
            "{} cannot start in a {} discipline",
            entrant.display_name(),
            discipline.sex
        )));
    }

    let age_group = event
        .program
        .age_bands
        .group_for(entrant.birth_date, event.start_date)?;
    if age_group != discipline.age_group {
        return Err(EngineError::Validation(format!(
            "{} belongs to age group {age_group}, not {}",
            entrant.display_name(),
            discipline.age_group
        )));
    }

    Ok(())
}

/// Locks a registration in the roster builder's order: the team row first,
/// then the registration row.
async fn lock_in_team_order(conn: &mut PgConnection, id: Uuid) -> Result<Registration> {
    let seen_team = RegistrationRepository::find_in(conn, id).await?.team_id;

    if let Some(team_id) = seen_team {
        match TeamRepository::lock(conn, team_id).await {
            Ok(_) => {}
            Err(StorageError::NotFound) => {
                return Err(EngineError::ConcurrencyConflict { team_id }.into());
            }
            Err(e) => return Err(e),
        }
    }

    let registration = RegistrationRepository::lock(conn, id)
        .await
        .map_err(|e| match seen_team {
            Some(team_id) => e.lock_conflict_on(team_id),
            None => e,
        })?;
    ensure_same_team(seen_team, registration.team_id)?;
    Ok(registration)
}

/// The team read before locking must still be the one after it.
fn ensure_same_team(seen: Option<Uuid>, locked: Option<Uuid>) -> std::result::Result<(), EngineError> {
    match seen.or(locked) {
        Some(team_id) if seen != locked => Err(EngineError::ConcurrencyConflict { team_id }),
        _ => Ok(()),
    }
}

/// Registration lifecycle backed by the database.
pub struct Registrations<'a> {
    pool: &'a PgPool,
}

impl<'a> Registrations<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Registration> {
        RegistrationRepository::new(self.pool).find_by_id(id).await
    }

    pub async fn sign_up(
        &self,
        entrant_id: i32,
        event_id: Uuid,
        discipline: &DisciplineKey,
        cost: Decimal,
    ) -> Result<Registration> {
        let event = EventRepository::new(self.pool).find_by_id(event_id).await?;
        if !event.status.accepts_registrations() {
            return Err(EngineError::RegistrationClosed { event_id }.into());
        }
        let entrant = EntrantRepository::new(self.pool)
            .find_by_id(entrant_id)
            .await?;

        check_eligibility(&event, &entrant, discipline)
            .inspect_err(|e| tracing::warn!(entrant_id, %event_id, "Sign-up rejected: {e}"))?;

        let registration = RegistrationRepository::new(self.pool)
            .create(entrant_id, event_id, discipline, cost)
            .await?;

        tracing::info!(
            registration_id = %registration.registration_id,
            entrant_id,
            %event_id,
            %discipline,
            "Registration queued"
        );
        Ok(registration)
    }

    pub async fn confirm(&self, id: Uuid) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let registration = RegistrationRepository::lock(&mut tx, id).await?;
        let event = EventRepository::find_in(&mut tx, registration.event_id).await?;
        let status =
            registration_state::confirm(id, registration.status, event.event_id, event.status)
                .inspect_err(|e| tracing::warn!(registration_id = %id, "Confirm rejected: {e}"))?;

        if status == registration.status {
            return Ok(registration);
        }
        let registration = RegistrationRepository::set_status(&mut tx, id, status).await?;
        tx.commit().await?;

        tracing::info!(registration_id = %id, "Registration confirmed");
        Ok(registration)
    }

    /// Direct path to `Registered` for single-seat disciplines.
    pub async fn register_individual(&self, id: Uuid) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let registration = RegistrationRepository::lock(&mut tx, id).await?;
        let event = EventRepository::find_in(&mut tx, registration.event_id).await?;
        let rules = RosterRules::from_program(&event.program)?;
        let class = rules.class(&registration.boat_class)?;

        let status = registration_state::register_individual(id, registration.status, class)
            .inspect_err(|e| tracing::warn!(registration_id = %id, "Register rejected: {e}"))?;

        if status == registration.status {
            return Ok(registration);
        }
        let registration = RegistrationRepository::set_status(&mut tx, id, status).await?;
        tx.commit().await?;

        tracing::info!(registration_id = %id, "Individual registration ready");
        Ok(registration)
    }

    /// Terminal. A disqualified crew member also leaves the team.
    pub async fn disqualify(&self, id: Uuid, reason: &str) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let registration = lock_in_team_order(&mut tx, id).await?;
        let status = registration_state::disqualify(id, registration.status)
            .inspect_err(|e| tracing::warn!(registration_id = %id, "Disqualify rejected: {e}"))?;
        if status == registration.status {
            return Ok(registration);
        }

        let mut updated = RegistrationRepository::set_disqualified(&mut tx, id, reason).await?;
        if let Some(team_id) = registration.team_id {
            let removal =
                roster_builder::remove_in(&mut tx, team_id, registration.entrant_id).await?;
            updated = removal.registration;
        }
        tx.commit().await?;

        tracing::info!(
            registration_id = %id,
            team_id = ?registration.team_id,
            "Registration disqualified"
        );
        Ok(updated)
    }

    /// Terminal. The entrant stays listed on the team but no longer counts
    /// towards its on-water crew.
    pub async fn mark_no_show(&self, id: Uuid) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let registration = lock_in_team_order(&mut tx, id).await?;
        let status = registration_state::mark_no_show(id, registration.status)
            .inspect_err(|e| tracing::warn!(registration_id = %id, "No-show rejected: {e}"))?;
        if status == registration.status {
            return Ok(registration);
        }

        let updated = RegistrationRepository::set_status(&mut tx, id, status).await?;
        if let Some(team_id) = registration.team_id {
            roster_builder::recompute_in(&mut tx, team_id).await?;
        }
        tx.commit().await?;

        tracing::info!(registration_id = %id, "Registration marked as no-show");
        Ok(updated)
    }

    pub async fn mark_paid(&self, id: Uuid, is_paid: bool) -> Result<Registration> {
        let registration = RegistrationRepository::new(self.pool)
            .set_paid(id, is_paid)
            .await?;

        tracing::info!(registration_id = %id, is_paid, "Payment flag updated");
        Ok(registration)
    }

    pub async fn list_eligible(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
    ) -> Result<Vec<EligibleEntrant>> {
        // 404 for an unknown event rather than an empty pool
        EventRepository::new(self.pool).find_by_id(event_id).await?;
        RegistrationRepository::new(self.pool)
            .list_eligible(event_id, discipline)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassProgram, EventProgram, EventStatus, Sex};
    use chrono::NaiveDate;
    use sqlx::types::Json;
    use std::collections::BTreeMap;

    fn event() -> Event {
        let mut classes = BTreeMap::new();
        classes.insert(
            "K-1".to_string(),
            ClassProgram {
                sexes: vec![Sex::Female],
                distances: vec![500],
                age_groups: vec!["Senior".to_string(), "Junior".to_string()],
            },
        );
        classes.insert(
            "D-10".to_string(),
            ClassProgram {
                sexes: vec![Sex::Mixed],
                distances: vec![200],
                age_groups: vec!["Senior".to_string()],
            },
        );
        Event {
            event_id: Uuid::from_u128(1),
            name: "Volga Cup".to_string(),
            slug: "volga-cup".to_string(),
            status: EventStatus::RegistrationOpen,
            city: None,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            program: Json(EventProgram {
                classes,
                age_bands: Default::default(),
            }),
            lane_capacity: 9,
            advance_per_heat: 3,
            advance_by_time: 0,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn entrant(sex: Sex, born: i32, classes: &[&str]) -> Entrant {
        Entrant {
            entrant_id: 11,
            first_name: "Olga".to_string(),
            last_name: "Sokolova".to_string(),
            sex,
            birth_date: NaiveDate::from_ymd_opt(born, 8, 20).unwrap(),
            city: None,
            boat_classes: Json(classes.iter().map(|c| c.to_string()).collect()),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_eligible_entrant_passes() {
        let key = DisciplineKey::new("K-1", Sex::Female, 500, "Senior");
        assert!(check_eligibility(&event(), &entrant(Sex::Female, 1995, &["K-1"]), &key).is_ok());

        let dragon = DisciplineKey::new("D-10", Sex::Mixed, 200, "Senior");
        assert!(check_eligibility(&event(), &entrant(Sex::Male, 1995, &["D-10"]), &dragon).is_ok());
    }

    #[test]
    fn test_discipline_outside_program_is_rejected() {
        let key = DisciplineKey::new("K-1", Sex::Female, 1000, "Senior");
        let err = check_eligibility(&event(), &entrant(Sex::Female, 1995, &["K-1"]), &key)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_class_sex_and_age_must_match() {
        let key = DisciplineKey::new("K-1", Sex::Female, 500, "Senior");

        let no_class = entrant(Sex::Female, 1995, &["C-1"]);
        assert!(check_eligibility(&event(), &no_class, &key).is_err());

        let wrong_sex = entrant(Sex::Male, 1995, &["K-1"]);
        assert!(check_eligibility(&event(), &wrong_sex, &key).is_err());

        // 2025 - 2010 = 15, a junior
        let junior = entrant(Sex::Female, 2010, &["K-1"]);
        assert!(check_eligibility(&event(), &junior, &key).is_err());
        let junior_key = DisciplineKey::new("K-1", Sex::Female, 500, "Junior");
        assert!(check_eligibility(&event(), &junior, &junior_key).is_ok());
    }

    #[test]
    fn test_team_changed_while_waiting_for_lock_is_a_conflict() {
        let team = Uuid::from_u128(5);
        let other = Uuid::from_u128(6);

        assert!(ensure_same_team(None, None).is_ok());
        assert!(ensure_same_team(Some(team), Some(team)).is_ok());
        assert_eq!(
            ensure_same_team(Some(team), None),
            Err(EngineError::ConcurrencyConflict { team_id: team })
        );
        assert_eq!(
            ensure_same_team(None, Some(other)),
            Err(EngineError::ConcurrencyConflict { team_id: other })
        );
        assert_eq!(
            ensure_same_team(Some(team), Some(other)),
            Err(EngineError::ConcurrencyConflict { team_id: team })
        );
    }
}
