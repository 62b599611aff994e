use thiserror::Error;

/// Outcome of a single call against a counter store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),

    #[error("write conflict on counter: {0}")]
    Conflict(String),

    /// Another caller created the counter first.
    #[error("counter already exists")]
    AlreadyExists,

    #[error("counter store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether another attempt at the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => StoreError::AlreadyExists,
                // serialization_failure, deadlock_detected, lock_not_available
                Some("40001") | Some("40P01") | Some("55P03") => {
                    StoreError::Conflict(db_err.message().to_string())
                }
                // query_canceled (statement_timeout; the transaction is rolled back),
                // admin_shutdown, crash_shutdown, cannot_connect_now, too_many_connections
                Some("57014") | Some("57P01") | Some("57P02") | Some("57P03") | Some("53300") => {
                    StoreError::Unavailable(db_err.message().to_string())
                }
                _ => StoreError::Backend(err.to_string()),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AllocateError {
    #[error("no code format configured for entity kind {0:?}")]
    UnknownEntityKind(String),

    #[error("could not allocate a {kind} code after {attempts} attempt(s): {source}")]
    StoreUnavailable {
        kind: String,
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_transient() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_transient());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn decode_errors_are_not_transient() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn init_race_is_not_transient() {
        assert!(!StoreError::AlreadyExists.is_transient());
    }
}
