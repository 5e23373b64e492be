use crate::domain::error::AccountingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Accounting(#[from] AccountingError),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Publish error: {0}")]
    Publish(String),
}

impl InfraError {
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Accounting(error) if error.is_integrity_violation())
    }
}
