use thiserror::Error;

#[derive(Debug, Error)]
pub enum DpaError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Limit exceeded: {what} is capped at {limit}")]
    LimitExceeded { what: String, limit: usize },

    #[error("Unsupported repayment: {0}")]
    UnsupportedRepayment(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DpaError {
    fn from(e: serde_json::Error) -> Self {
        DpaError::SerializationError(e.to_string())
    }
}
