/// Unified error type for all engine operations.
///
/// The first three variants form the user-facing taxonomy: validation
/// failures are correctable by the caller, not-found errors mean the
/// referenced entity vanished under us (stale index after an external
/// mutation), and invariant violations indicate a bug in the engine
/// itself rather than bad input.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::StoreError(err.to_string())
    }
}

impl ServiceError {
    /// True when the failure is correctable by the caller re-entering
    /// input, as opposed to a programming error or store fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::NotFound(_)
                | Self::InvalidOperation(_)
                | Self::InvalidStatus(_)
        )
    }
}

// Type alias kept for call sites that predate the rename.
pub type AppError = ServiceError;
