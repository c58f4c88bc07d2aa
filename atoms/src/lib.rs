//! Domain atoms for the image service.
//!
//! Logic here takes its store as an argument and never reaches for global
//! clients; the process-wide state lives in `imagedb-shared`.

pub mod media;
