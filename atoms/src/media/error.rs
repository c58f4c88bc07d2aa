use thiserror::Error;

/// Failures surfaced by an [`ImageStore`](super::ImageStore) backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Image with id {0} not found")]
    NotFound(String),

    #[error("Image with id {0} already exists")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Connectivity(String),

    #[error("Malformed record in store: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Wrap a failed DynamoDB call, naming the operation.
    pub fn connectivity_fault(op: &str, e: impl std::fmt::Display) -> Self {
        StoreError::Connectivity(format!("DynamoDB {} error: {}", op, e))
    }
}
