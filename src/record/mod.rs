// src/record/mod.rs

//! Durable task records.
//!
//! - [`model`] is the JSON document stored per task.
//! - [`store`] reads and writes one record at a time through a
//!   [`crate::fs::FileSystem`].

pub mod model;
pub mod store;

pub use model::{Attachment, RecordId, TaskRecord, Update};
pub use store::{DEFAULT_EXTENSION, RecordStore};
