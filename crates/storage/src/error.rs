use thiserror::Error;
use uuid::Uuid;

use crate::models::{DisciplineKey, RegistrationStatus, RoleTag, Round};

/// Rule violations raised by the roster, registration and draw engine.
///
/// All of these are recoverable: they are reported back to the operator
/// who triggered the action and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Boat class '{0}' is not configured")]
    UnknownBoatClass(String),

    #[error("Team {team_id} ({boat_class}) is full: capacity {capacity}")]
    CapacityExceeded {
        team_id: Uuid,
        boat_class: String,
        capacity: u32,
    },

    #[error("Team {team_id} has no free {role} slot")]
    RoleConflict { team_id: Uuid, role: RoleTag },

    #[error("Registration {registration_id} cannot move from {from} to {to}")]
    InvalidTransition {
        registration_id: Uuid,
        from: RegistrationStatus,
        to: RegistrationStatus,
    },

    #[error("Registration for event {event_id} is not open")]
    RegistrationClosed { event_id: Uuid },

    #[error("No entrants to draw for {discipline}")]
    EmptyPool { discipline: DisciplineKey },

    #[error("Team {team_id} was modified concurrently, please retry")]
    ConcurrencyConflict { team_id: Uuid },

    #[error("Heats for {discipline} ({round}) already exist")]
    DrawExists {
        discipline: DisciplineKey,
        round: Round,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Deadlock victim, serialization failure or lock timeout.
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if matches!(e.code().as_deref(), Some("40001" | "40P01" | "55P03"))
        )
    }

    /// Reports a lost lock race on a team's rows as `ConcurrencyConflict`.
    pub fn lock_conflict_on(self, team_id: Uuid) -> Self {
        if self.is_lock_failure() {
            EngineError::ConcurrencyConflict { team_id }.into()
        } else {
            self
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct PgCode(&'static str);

    impl fmt::Display for PgCode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "postgres error {}", self.0)
        }
    }

    impl StdError for PgCode {}

    impl DatabaseError for PgCode {
        fn message(&self) -> &str {
            "postgres error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn postgres(code: &'static str) -> StorageError {
        StorageError::Database(sqlx::Error::Database(Box::new(PgCode(code))))
    }

    #[test]
    fn test_lost_lock_races_become_conflicts() {
        let team_id = Uuid::from_u128(7);
        for code in ["40001", "40P01", "55P03"] {
            let err = postgres(code);
            assert!(err.is_lock_failure(), "{code}");
            assert!(matches!(
                err.lock_conflict_on(team_id),
                StorageError::Engine(EngineError::ConcurrencyConflict { team_id: id }) if id == team_id
            ));
        }
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = postgres("23505");
        assert!(err.is_unique_violation());
        assert!(!err.is_lock_failure());
        assert!(matches!(
            err.lock_conflict_on(Uuid::nil()),
            StorageError::Database(_)
        ));
        assert!(postgres("23503").is_foreign_key_violation());
    }
}
