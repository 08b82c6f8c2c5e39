use std::fmt;

/// Result type for database operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for database operations
#[derive(Debug)]
pub enum Error {
    /// Validation error - invalid input data or a reference to a missing row
    ValidationError(String),

    /// Connection error - database unreachable or authentication failure
    ConnectionError(String),

    /// Not found error - the row doesn't exist or belongs to another user
    NotFoundError(String),

    /// Database error - SQL errors, constraint violations
    DatabaseError(String),

    /// Pool error - connection pool issues
    PoolError(String),

    /// Transaction error - transaction-specific errors
    TransactionError(String),

    /// The user already owns the maximum number of workspaces
    WorkspaceLimitExceeded { limit: i64 },

    /// An item could not be moved to the requested location
    MovementError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Error::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Error::PoolError(msg) => write!(f, "Pool error: {}", msg),
            Error::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
            Error::WorkspaceLimitExceeded { limit } => {
                write!(f, "Cannot have more than {} workspaces", limit)
            }
            Error::MovementError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Convert tokio-postgres errors to database errors
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            let code = db_error.code();

            // A foreign key pointing at a row that doesn't exist (e.g. an unknown model_id)
            if *code == tokio_postgres::error::SqlState::FOREIGN_KEY_VIOLATION {
                let detail = db_error.detail().unwrap_or_else(|| db_error.message());
                return Error::ValidationError(format!(
                    "Referenced record does not exist: {}",
                    detail
                ));
            }

            return Error::DatabaseError(format!("{}: {}", code.code(), db_error.message()));
        }

        Error::DatabaseError(format!("{:?}", err))
    }
}

/// Convert deadpool errors to database errors
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Error::PoolError(err.to_string())
    }
}

/// Convert deadpool build errors to database errors
impl From<deadpool_postgres::BuildError> for Error {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Error::ConnectionError(err.to_string())
    }
}
