//! Domain error types.

use thiserror::Error;

/// Name of the partial unique index that keeps at most one pending command
/// per device and command name.
pub const PENDING_DEDUP_INDEX: &str = "commands_pending_device_name_idx";

/// PostgreSQL SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors produced by command lifecycle operations.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command '{name}' is already pending for device {device_id}")]
    Duplicate { device_id: String, name: String },

    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl CommandError {
    /// Wraps a database error with the operation that produced it.
    pub fn store(operation: &'static str, source: sqlx::Error) -> Self {
        CommandError::Store { operation, source }
    }
}

/// Returns true if `err` is a unique violation on the pending dedup index.
///
/// Violations of any other constraint are not duplicates.
pub fn is_pending_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(PENDING_DEDUP_INDEX)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err = CommandError::Duplicate {
            device_id: "356938035643809".to_string(),
            name: "reboot".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'reboot' is already pending for device 356938035643809"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = CommandError::NotFound("id 42".to_string());
        assert_eq!(err.to_string(), "Command not found: id 42");
    }

    #[test]
    fn test_store_wraps_operation() {
        let err = CommandError::store("enqueue", sqlx::Error::PoolTimedOut);
        let message = err.to_string();
        assert!(message.starts_with("Store error during enqueue"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_non_database_error_is_not_duplicate() {
        assert!(!is_pending_duplicate(&sqlx::Error::RowNotFound));
        assert!(!is_pending_duplicate(&sqlx::Error::PoolTimedOut));
    }
}
