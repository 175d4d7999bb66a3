use diesel::result::Error as DieselError;
use thiserror::Error;

/// Error raised while building the pool or migrating the schema.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("cannot init database pool : {0}")]
    Pool(String),
    #[error("cannot run database migrations : {0}")]
    Migration(String),
}

/// Runtime database error carrying the operation it happened in
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to get connection from pool for operation '{operation}': {message}")]
    PoolError { operation: String, message: String },

    #[error("Database interaction failed for operation '{operation}': {message}")]
    InteractionError { operation: String, message: String },

    #[error("Record not found in operation '{operation}'")]
    NotFound { operation: String },

    #[error("Database query error in operation '{operation}': {message}")]
    QueryError { operation: String, message: String },

    #[error("Unique constraint violation in operation '{operation}': {message}")]
    UniqueViolation { operation: String, message: String },
}

impl DatabaseError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Operation label attached when the error was raised
    pub fn operation(&self) -> &str {
        match self {
            Self::PoolError { operation, .. }
            | Self::InteractionError { operation, .. }
            | Self::NotFound { operation }
            | Self::QueryError { operation, .. }
            | Self::UniqueViolation { operation, .. } => operation,
        }
    }

    /// Replace the placeholder operation set by the `From<DieselError>` conversion.
    #[must_use]
    pub fn with_operation(self, new_operation: &str) -> Self {
        let operation = new_operation.to_string();
        match self {
            Self::PoolError { message, .. } => Self::PoolError { operation, message },
            Self::InteractionError { message, .. } => Self::InteractionError { operation, message },
            Self::NotFound { .. } => Self::NotFound { operation },
            Self::QueryError { message, .. } => Self::QueryError { operation, message },
            Self::UniqueViolation { message, .. } => Self::UniqueViolation { operation, message },
        }
    }
}

impl From<DieselError> for DatabaseError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound {
                operation: "unknown".to_string(),
            },
            DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => Self::UniqueViolation {
                operation: "unknown".to_string(),
                message: info.message().to_string(),
            },
            other => Self::QueryError {
                operation: "unknown".to_string(),
                message: other.to_string(),
            },
        }
    }
}
