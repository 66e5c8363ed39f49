use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::{EngineError, StorageError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

fn engine_status(error: &EngineError) -> StatusCode {
    match error {
        EngineError::Validation(_)
        | EngineError::UnknownBoatClass(_)
        | EngineError::EmptyPool { .. } => StatusCode::BAD_REQUEST,
        EngineError::CapacityExceeded { .. }
        | EngineError::RoleConflict { .. }
        | EngineError::InvalidTransition { .. }
        | EngineError::RegistrationClosed { .. }
        | EngineError::ConcurrencyConflict { .. }
        | EngineError::DrawExists { .. } => StatusCode::CONFLICT,
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::Engine(e)) => engine_status(e),
            Self::Storage(e) if e.is_lock_failure() => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(StorageError::Engine(e)) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Storage(e) if e.is_lock_failure() => {
                tracing::warn!("Lost a lock race: {}", e);
                json!({
                    "error": "The record was modified concurrently, please retry"
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<EngineError> for WebError {
    fn from(error: EngineError) -> Self {
        Self::Storage(StorageError::Engine(error))
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use storage::models::{DisciplineKey, RegistrationStatus, Round, Sex};
    use uuid::Uuid;

    fn status(error: impl Into<WebError>) -> StatusCode {
        error.into().into_response().status()
    }

    #[test]
    fn test_engine_errors_map_to_client_statuses() {
        let team_id = Uuid::nil();
        let discipline = DisciplineKey::new("K-1", Sex::Male, 500, "Senior");

        assert_eq!(
            status(EngineError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(EngineError::UnknownBoatClass("K-3".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(EngineError::EmptyPool {
                discipline: discipline.clone()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(EngineError::CapacityExceeded {
                team_id,
                boat_class: "D-10".into(),
                capacity: 14
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(EngineError::InvalidTransition {
                registration_id: Uuid::nil(),
                from: RegistrationStatus::Disqualified,
                to: RegistrationStatus::Registered,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(EngineError::ConcurrencyConflict { team_id }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(EngineError::DrawExists {
                discipline,
                round: Round::Final
            }),
            StatusCode::CONFLICT
        );
    }

    #[derive(Debug)]
    struct Deadlock;

    impl fmt::Display for Deadlock {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("deadlock detected")
        }
    }

    impl std::error::Error for Deadlock {}

    impl sqlx::error::DatabaseError for Deadlock {
        fn message(&self) -> &str {
            "deadlock detected"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("40P01".into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    #[test]
    fn test_deadlock_victim_is_a_conflict() {
        let error = StorageError::Database(sqlx::Error::Database(Box::new(Deadlock)));
        assert_eq!(status(error), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_errors_map_to_statuses() {
        assert_eq!(status(StorageError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(StorageError::ConstraintViolation("Slug already exists".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StorageError::Database(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status(WebError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
