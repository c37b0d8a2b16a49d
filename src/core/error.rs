use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Compile error: {0}")]
    Compile(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database client error: {0}")]
    Client(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
