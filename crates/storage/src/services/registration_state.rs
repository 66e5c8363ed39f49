//! Status workflow of a registration.
//!
//! ```text
//! Queued -> Confirmed -> AwaitingTeam <-> Registered
//! Queued | Confirmed -> Registered          (single-seat classes)
//! AwaitingTeam | Registered -> Queued       (removed from team)
//! any -> NoShow | Disqualified              (terminal)
//! ```

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::RegistrationStatus::*;
use crate::models::{BoatClass, EventStatus, RegistrationStatus};

/// Whether the workflow permits moving from `from` to `to`.
///
/// Staying in the same state is allowed where the operation is idempotent.
pub fn can_transition(from: RegistrationStatus, to: RegistrationStatus) -> bool {
    match (from, to) {
        (Disqualified | NoShow, _) => from == to,
        (_, Disqualified | NoShow) => true,
        (Queued | Confirmed, Confirmed) => true,
        (Confirmed, AwaitingTeam) => true,
        (AwaitingTeam | Registered, AwaitingTeam | Registered) => true,
        (Queued | Confirmed, Registered) => true,
        (AwaitingTeam | Registered, Queued) => true,
        (Queued, Queued) => true,
        _ => false,
    }
}

fn transition(
    registration_id: Uuid,
    from: RegistrationStatus,
    to: RegistrationStatus,
) -> Result<RegistrationStatus, EngineError> {
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(EngineError::InvalidTransition {
            registration_id,
            from,
            to,
        })
    }
}

/// `Queued -> Confirmed`, only while the event is open for registration.
pub fn confirm(
    registration_id: Uuid,
    current: RegistrationStatus,
    event_id: Uuid,
    event_status: EventStatus,
) -> Result<RegistrationStatus, EngineError> {
    if current == Confirmed {
        return Ok(Confirmed);
    }
    if !event_status.accepts_registrations() {
        return Err(EngineError::RegistrationClosed { event_id });
    }
    transition(registration_id, current, Confirmed)
}

/// The direct edge for single-seat classes, bypassing the team states.
pub fn register_individual(
    registration_id: Uuid,
    current: RegistrationStatus,
    class: &BoatClass,
) -> Result<RegistrationStatus, EngineError> {
    if class.is_crewed() {
        return Err(EngineError::Validation(format!(
            "{class} is a crewed class; registrations become ready through their team"
        )));
    }
    if current == Registered {
        return Ok(Registered);
    }
    if !matches!(current, Queued | Confirmed) {
        return Err(EngineError::InvalidTransition {
            registration_id,
            from: current,
            to: Registered,
        });
    }
    transition(registration_id, current, Registered)
}

/// A confirmed registration joining a team starts out waiting for the crew.
pub fn attach_to_team(
    registration_id: Uuid,
    current: RegistrationStatus,
) -> Result<RegistrationStatus, EngineError> {
    match current {
        Confirmed => Ok(AwaitingTeam),
        other => Err(EngineError::InvalidTransition {
            registration_id,
            from: other,
            to: AwaitingTeam,
        }),
    }
}

/// Follows the team's formation state. Terminal registrations are left alone.
pub fn settle_with_team(
    registration_id: Uuid,
    current: RegistrationStatus,
    fully_formed: bool,
) -> Result<RegistrationStatus, EngineError> {
    if current.is_terminal() {
        return Ok(current);
    }
    let target = if fully_formed { Registered } else { AwaitingTeam };
    match current {
        AwaitingTeam | Registered => transition(registration_id, current, target),
        other => Err(EngineError::InvalidTransition {
            registration_id,
            from: other,
            to: target,
        }),
    }
}

/// Leaving a team puts the registration back in the queue.
pub fn detach_from_team(
    registration_id: Uuid,
    current: RegistrationStatus,
) -> Result<RegistrationStatus, EngineError> {
    if current.is_terminal() {
        return Ok(current);
    }
    transition(registration_id, current, Queued)
}

pub fn disqualify(
    registration_id: Uuid,
    current: RegistrationStatus,
) -> Result<RegistrationStatus, EngineError> {
    transition(registration_id, current, Disqualified)
}

pub fn mark_no_show(
    registration_id: Uuid,
    current: RegistrationStatus,
) -> Result<RegistrationStatus, EngineError> {
    transition(registration_id, current, NoShow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RegistrationStatus; 6] = [
        Queued,
        Confirmed,
        AwaitingTeam,
        Registered,
        NoShow,
        Disqualified,
    ];

    fn id() -> Uuid {
        Uuid::from_u128(7)
    }

    #[test]
    fn test_terminal_states_never_reopen() {
        for terminal in [NoShow, Disqualified] {
            for target in ALL {
                if target != terminal {
                    assert!(!can_transition(terminal, target), "{terminal} -> {target}");
                }
            }
        }
    }

    #[test]
    fn test_any_live_state_can_be_disqualified() {
        for from in [Queued, Confirmed, AwaitingTeam, Registered] {
            assert_eq!(disqualify(id(), from).unwrap(), Disqualified);
            assert_eq!(mark_no_show(id(), from).unwrap(), NoShow);
        }
        assert_eq!(disqualify(id(), Disqualified).unwrap(), Disqualified);
        assert!(matches!(
            disqualify(id(), NoShow),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_confirm_requires_open_registration() {
        let event = Uuid::from_u128(1);
        assert_eq!(
            confirm(id(), Queued, event, EventStatus::RegistrationOpen).unwrap(),
            Confirmed
        );
        assert_eq!(
            confirm(id(), Queued, event, EventStatus::Live),
            Err(EngineError::RegistrationClosed { event_id: event })
        );
    }

    #[test]
    fn test_confirm_is_idempotent_even_after_closing() {
        let event = Uuid::from_u128(1);
        assert_eq!(
            confirm(id(), Confirmed, event, EventStatus::RegistrationClosed).unwrap(),
            Confirmed
        );
    }

    #[test]
    fn test_confirm_rejects_later_states() {
        let event = Uuid::from_u128(1);
        assert!(matches!(
            confirm(id(), Registered, event, EventStatus::RegistrationOpen),
            Err(EngineError::InvalidTransition { .. })
        ));
        assert!(matches!(
            confirm(id(), Disqualified, event, EventStatus::RegistrationOpen),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_individual_edge_only_for_single_seats() {
        let k1 = BoatClass::parse("K-1").unwrap();
        let k2 = BoatClass::parse("K-2").unwrap();
        assert_eq!(register_individual(id(), Queued, &k1).unwrap(), Registered);
        assert_eq!(register_individual(id(), Confirmed, &k1).unwrap(), Registered);
        assert!(matches!(
            register_individual(id(), Confirmed, &k2),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            register_individual(id(), Disqualified, &k1),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_team_states_follow_formation() {
        assert_eq!(attach_to_team(id(), Confirmed).unwrap(), AwaitingTeam);
        assert!(attach_to_team(id(), Queued).is_err());
        assert_eq!(settle_with_team(id(), AwaitingTeam, true).unwrap(), Registered);
        assert_eq!(settle_with_team(id(), Registered, false).unwrap(), AwaitingTeam);
        assert_eq!(settle_with_team(id(), NoShow, true).unwrap(), NoShow);
        assert!(settle_with_team(id(), Confirmed, true).is_err());
    }

    #[test]
    fn test_detach_returns_to_queue() {
        assert_eq!(detach_from_team(id(), Registered).unwrap(), Queued);
        assert_eq!(detach_from_team(id(), AwaitingTeam).unwrap(), Queued);
        assert_eq!(detach_from_team(id(), Disqualified).unwrap(), Disqualified);
    }
}
