//! In-memory image backend.
//!
//! Non-persistent; everything is lost when the process exits. Used by the
//! test suites and for running the handlers without a table.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::model::{Image, Timestamp};
use super::store::{new_image_id, ImageStore};

/// [`ImageStore`] over a `Vec` guarded by an async `RwLock`.
///
/// Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<Vec<Image>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn list(&self) -> Result<Vec<Image>, StoreError> {
        Ok(self.images.read().await.clone())
    }

    async fn insert(
        &self,
        url: String,
        created_at: Option<Timestamp>,
    ) -> Result<Image, StoreError> {
        let image = Image {
            id: new_image_id(),
            url,
            created_at,
        };

        let mut images = self.images.write().await;
        if images.iter().any(|i| i.id == image.id) {
            return Err(StoreError::Conflict(image.id));
        }
        images.push(image.clone());
        Ok(image)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut images = self.images.write().await;
        match images.iter().position(|i| i.id == id) {
            Some(idx) => {
                images.remove(idx);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}
