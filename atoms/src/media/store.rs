//! Storage seam for image records.
//!
//! Handlers only see `dyn ImageStore`, so the DynamoDB backend and the
//! in-memory backend are interchangeable.

use async_trait::async_trait;

use super::error::StoreError;
use super::model::{Image, Timestamp};

/// Backend for the image table.
///
/// Implementations are shared across in-flight requests and must be
/// `Send + Sync`. Ids are generated by the backend on insert.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Returns every record in backend order. Order is not stable across
    /// mutations.
    async fn list(&self) -> Result<Vec<Image>, StoreError>;

    /// Creates a record with a freshly generated id and returns it.
    ///
    /// # Errors
    ///
    /// `Conflict` if the generated id is already taken, `Connectivity` if
    /// the backend cannot be reached.
    async fn insert(
        &self,
        url: String,
        created_at: Option<Timestamp>,
    ) -> Result<Image, StoreError>;

    /// Removes the record with `id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such record exists; nothing is mutated in that case.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub(crate) fn new_image_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
