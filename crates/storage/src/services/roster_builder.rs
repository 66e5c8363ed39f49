//! Team persistence on top of [`Roster`].
//!
//! Every mutation runs in one transaction: the team row is locked with
//! `FOR UPDATE`, the membership rows are re-read under that lock, the
//! in-memory roster applies the change, and the new member count is written
//! with a conditional update against the count the checks were based on.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::models::{ClassKind, DisciplineKey, Registration, RoleTag, Team};
use crate::repository::event::EventRepository;
use crate::repository::heat::HeatRepository;
use crate::repository::registration::RegistrationRepository;
use crate::repository::team::TeamRepository;
use crate::services::roster::{Candidate, Roster, RosterMember, StatusChange};
use crate::services::roster_rules::RosterRules;

/// What is left after a member leaves a team.
#[derive(Debug, Clone)]
pub struct Removal {
    pub registration: Registration,
    /// An emptied crew that already holds a lane keeps its row.
    pub team_deleted: bool,
    pub changes: Vec<StatusChange>,
}

pub struct RosterBuilder<'a> {
    pool: &'a PgPool,
}

impl<'a> RosterBuilder<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_team(
        &self,
        event_id: Uuid,
        discipline: &DisciplineKey,
        name: &str,
        city: Option<&str>,
    ) -> Result<Team> {
        let event = EventRepository::new(self.pool).find_by_id(event_id).await?;
        if !event.program.contains(discipline) {
            return Err(EngineError::Validation(format!(
                "{discipline} is not part of the program of {}",
                event.name
            ))
            .into());
        }

        let rules = RosterRules::from_program(&event.program)?;
        let class = rules.class(&discipline.boat_class)?;
        if !class.is_crewed() {
            return Err(EngineError::Validation(format!(
                "{class} is a single-seat class and has no teams"
            ))
            .into());
        }

        let name = name.trim();
        let city = city.map(str::trim).filter(|c| !c.is_empty());
        if matches!(class.kind(), ClassKind::Dragon { .. }) && (name.is_empty() || city.is_none())
        {
            return Err(EngineError::Validation(format!(
                "{class} teams need a name and a home city"
            ))
            .into());
        }

        let capacity = rules.capacity(&discipline.boat_class)?;
        let team = TeamRepository::new(self.pool)
            .create(event_id, discipline, name, city, capacity)
            .await?;

        tracing::info!(
            team_id = %team.team_id,
            %event_id,
            %discipline,
            capacity,
            "Team created"
        );
        Ok(team)
    }

    pub async fn team_with_members(&self, team_id: Uuid) -> Result<(Team, Vec<Registration>)> {
        let team = TeamRepository::new(self.pool).find_by_id(team_id).await?;
        let members = RegistrationRepository::new(self.pool)
            .list_by_team(team_id)
            .await?;
        Ok((team, members))
    }

    /// Links the entrant's registration for the team's discipline to the team.
    pub async fn add_member(
        &self,
        team_id: Uuid,
        entrant_id: i32,
        role: RoleTag,
    ) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        let team = TeamRepository::lock(&mut tx, team_id).await?;
        let mut roster = load_roster(&mut tx, &team).await?;

        let discipline = team.discipline();
        let registration = RegistrationRepository::lock_for_discipline(
            &mut tx,
            entrant_id,
            team.event_id,
            &discipline,
        )
        .await
        .map_err(|e| e.lock_conflict_on(team_id))?
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "entrant {entrant_id} has no registration for {discipline}"
            ))
        })?;

        if let Some(other) = registration.team_id
            && other != team_id
        {
            return Err(EngineError::Validation(format!(
                "entrant {entrant_id} already belongs to team {other}"
            ))
            .into());
        }

        let outcome = roster
            .add_member(
                Candidate {
                    registration_id: registration.registration_id,
                    entrant_id,
                    status: registration.status,
                },
                role,
            )
            .inspect_err(|e| tracing::warn!(%team_id, entrant_id, "Member rejected: {e}"))?;

        let member = RegistrationRepository::attach(
            &mut tx,
            registration.registration_id,
            team_id,
            outcome.member.role,
            outcome.member.status,
        )
        .await?;
        apply_changes(&mut tx, &outcome.changes, &[member.registration_id]).await?;
        TeamRepository::update_member_count(
            &mut tx,
            team_id,
            team.member_count,
            roster.len() as i32,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            %team_id,
            entrant_id,
            role = %member.role.unwrap_or(RoleTag::Member),
            members = roster.len(),
            fully_formed = roster.is_fully_formed(),
            "Member added"
        );
        Ok(member)
    }

    pub async fn remove_member(&self, team_id: Uuid, entrant_id: i32) -> Result<Removal> {
        let mut tx = self.pool.begin().await?;
        let removal = remove_in(&mut tx, team_id, entrant_id).await?;
        tx.commit().await?;

        tracing::info!(
            %team_id,
            entrant_id,
            team_deleted = removal.team_deleted,
            "Member removed"
        );
        Ok(removal)
    }

    pub async fn recompute_status(&self, team_id: Uuid) -> Result<Vec<StatusChange>> {
        let mut tx = self.pool.begin().await?;
        let changes = recompute_in(&mut tx, team_id).await?;
        tx.commit().await?;

        tracing::info!(%team_id, changed = changes.len(), "Team status recomputed");
        Ok(changes)
    }
}

async fn load_roster(conn: &mut PgConnection, team: &Team) -> Result<Roster> {
    let event = EventRepository::find_in(conn, team.event_id).await?;
    let class = RosterRules::from_program(&event.program)?
        .class(&team.boat_class)?
        .clone();

    let members = RegistrationRepository::lock_team_members(conn, team.team_id)
        .await?
        .into_iter()
        .map(|r| RosterMember {
            registration_id: r.registration_id,
            entrant_id: r.entrant_id,
            role: r.role.unwrap_or(RoleTag::Member),
            status: r.status,
        })
        .collect::<Vec<_>>();

    if members.len() as i32 != team.member_count {
        tracing::error!(
            team_id = %team.team_id,
            stored = team.member_count,
            actual = members.len(),
            "Team member count disagrees with membership rows"
        );
        return Err(EngineError::ConcurrencyConflict {
            team_id: team.team_id,
        }
        .into());
    }

    Ok(Roster::with_members(team.team_id, class, members)?)
}

async fn apply_changes(
    conn: &mut PgConnection,
    changes: &[StatusChange],
    already_written: &[Uuid],
) -> Result<()> {
    for change in changes {
        if already_written.contains(&change.registration_id) {
            continue;
        }
        RegistrationRepository::set_status(conn, change.registration_id, change.to).await?;
    }
    Ok(())
}

/// Removal inside a caller's transaction; also used when a crew member is
/// disqualified.
pub(crate) async fn remove_in(
    conn: &mut PgConnection,
    team_id: Uuid,
    entrant_id: i32,
) -> Result<Removal> {
    let team = TeamRepository::lock(conn, team_id).await?;
    let mut roster = load_roster(conn, &team).await?;

    let outcome = roster
        .remove_member(entrant_id)
        .inspect_err(|e| tracing::warn!(%team_id, entrant_id, "Removal rejected: {e}"))?;

    let registration =
        RegistrationRepository::detach(conn, outcome.removed.registration_id, outcome.removed_status)
            .await?;
    apply_changes(conn, &outcome.changes, &[]).await?;

    let team_deleted = roster.is_empty() && !HeatRepository::team_has_lanes(conn, team_id).await?;
    if team_deleted {
        TeamRepository::delete(conn, team_id).await?;
    } else {
        TeamRepository::update_member_count(conn, team_id, team.member_count, roster.len() as i32)
            .await?;
    }

    Ok(Removal {
        registration,
        team_deleted,
        changes: outcome.changes,
    })
}

pub(crate) async fn recompute_in(conn: &mut PgConnection, team_id: Uuid) -> Result<Vec<StatusChange>> {
    let team = TeamRepository::lock(conn, team_id).await?;
    let mut roster = load_roster(conn, &team).await?;
    let changes = roster.recompute_status()?;
    apply_changes(conn, &changes, &[]).await?;
    Ok(changes)
}
