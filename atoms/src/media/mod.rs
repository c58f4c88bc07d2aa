// Re-export model types, the store seam and HTTP handlers
pub mod error;
pub mod http;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;


pub use error::StoreError;
pub use http::*;
pub use memory::MemoryImageStore;
pub use model::{CreateImagePayload, Image, Timestamp};
pub use service::{DynamoImageStore, ID_ATTRIBUTE};
pub use store::ImageStore;
