use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{BoatClass, RegistrationStatus, RoleTag};
use crate::services::{registration_state, roster_rules};

/// A registration as seen from inside a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RosterMember {
    pub registration_id: Uuid,
    pub entrant_id: i32,
    pub role: RoleTag,
    pub status: RegistrationStatus,
}

/// A registration that is about to join a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub registration_id: Uuid,
    pub entrant_id: i32,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusChange {
    pub registration_id: Uuid,
    pub from: RegistrationStatus,
    pub to: RegistrationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub member: RosterMember,
    /// Status changes of every member, the new one included.
    pub changes: Vec<StatusChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: RosterMember,
    /// Status the removed registration falls back to.
    pub removed_status: RegistrationStatus,
    pub changes: Vec<StatusChange>,
}

/// In-memory membership of one team.
///
/// Every operation either applies completely or leaves the roster untouched.
/// The capacity and per-role limits of [`roster_rules`] hold after every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    team_id: Uuid,
    class: BoatClass,
    members: Vec<RosterMember>,
}

impl Roster {
    pub fn new(team_id: Uuid, class: BoatClass) -> Result<Self, EngineError> {
        Self::with_members(team_id, class, Vec::new())
    }

    /// Rebuilds a roster from stored membership rows.
    pub fn with_members(
        team_id: Uuid,
        class: BoatClass,
        members: Vec<RosterMember>,
    ) -> Result<Self, EngineError> {
        if !class.is_crewed() {
            return Err(EngineError::Validation(format!(
                "{class} is a single-seat class and cannot have a team"
            )));
        }
        Ok(Self {
            team_id,
            class,
            members,
        })
    }

    pub fn team_id(&self) -> Uuid {
        self.team_id
    }

    pub fn class(&self) -> &BoatClass {
        &self.class
    }

    pub fn members(&self) -> &[RosterMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        roster_rules::capacity(&self.class)
    }

    pub fn role_count(&self, role: RoleTag) -> u32 {
        self.members.iter().filter(|m| m.role == role).count() as u32
    }

    /// Members that sit in the boat: reserves and dropped-out entrants excluded.
    pub fn on_water_count(&self) -> u32 {
        self.members
            .iter()
            .filter(|m| m.role.is_on_water() && !m.status.is_terminal())
            .count() as u32
    }

    pub fn is_fully_formed(&self) -> bool {
        self.on_water_count() >= roster_rules::on_water_minimum(&self.class)
    }

    pub fn add_member(
        &mut self,
        candidate: Candidate,
        requested_role: RoleTag,
    ) -> Result<AddOutcome, EngineError> {
        if self.members.iter().any(|m| {
            m.entrant_id == candidate.entrant_id || m.registration_id == candidate.registration_id
        }) {
            return Err(EngineError::Validation(format!(
                "entrant {} is already on team {}",
                candidate.entrant_id, self.team_id
            )));
        }

        let capacity = self.capacity();
        if self.members.len() as u32 >= capacity {
            return Err(EngineError::CapacityExceeded {
                team_id: self.team_id,
                boat_class: self.class.name().to_string(),
                capacity,
            });
        }

        let role = roster_rules::normalize_role(&self.class, requested_role);
        let role_limit = roster_rules::roles(&self.class)
            .map(|rules| rules.max_for(role))
            .unwrap_or(0);
        if self.role_count(role) >= role_limit {
            return Err(EngineError::RoleConflict {
                team_id: self.team_id,
                role,
            });
        }

        let attached =
            registration_state::attach_to_team(candidate.registration_id, candidate.status)?;

        let mut next = self.clone();
        next.members.push(RosterMember {
            registration_id: candidate.registration_id,
            entrant_id: candidate.entrant_id,
            role,
            status: attached,
        });
        let mut changes = next.recompute_status()?;

        // report the joining member relative to where it came from
        let joined_status = next.members.last().map(|m| m.status).unwrap_or(attached);
        changes.retain(|c| c.registration_id != candidate.registration_id);
        changes.push(StatusChange {
            registration_id: candidate.registration_id,
            from: candidate.status,
            to: joined_status,
        });

        *self = next;
        let member = self.members[self.members.len() - 1].clone();

        Ok(AddOutcome { member, changes })
    }

    pub fn remove_member(&mut self, entrant_id: i32) -> Result<RemoveOutcome, EngineError> {
        let index = self
            .members
            .iter()
            .position(|m| m.entrant_id == entrant_id)
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "entrant {entrant_id} is not on team {}",
                    self.team_id
                ))
            })?;

        let mut next = self.clone();
        let removed = next.members.remove(index);
        let removed_status =
            registration_state::detach_from_team(removed.registration_id, removed.status)?;
        let changes = next.recompute_status()?;

        *self = next;

        Ok(RemoveOutcome {
            removed,
            removed_status,
            changes,
        })
    }

    /// Moves every member to `Registered` or `AwaitingTeam` depending on
    /// whether the crew reaches its on-water minimum.
    pub fn recompute_status(&mut self) -> Result<Vec<StatusChange>, EngineError> {
        let fully_formed = self.is_fully_formed();

        let targets = self
            .members
            .iter()
            .map(|m| registration_state::settle_with_team(m.registration_id, m.status, fully_formed))
            .collect::<Result<Vec<_>, _>>()?;

        let mut changes = Vec::new();
        for (member, target) in self.members.iter_mut().zip(targets) {
            if member.status != target {
                changes.push(StatusChange {
                    registration_id: member.registration_id,
                    from: member.status,
                    to: target,
                });
                member.status = target;
            }
        }

        Ok(changes)
    }
}
