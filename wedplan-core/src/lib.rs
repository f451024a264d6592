//! Core of the wedplan ecosystem.
//!
//! - `model`: the single shared wedding document and its entities
//! - `mutation`: the edits a view can propose
//! - `stats`: totals, countdown and progress derived from the document
//! - `store`: document store contract plus in-memory and file adapters
//! - `sync`: debounced save with echo suppression
//! - `calendar` / `suggestion`: pure halves of the external integrations

pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod id;
pub mod model;
pub mod mutation;
pub mod stats;
pub mod store;
pub mod suggestion;
pub mod sync;

pub use error::{WeddingError, WeddingResult};
pub use model::WeddingDocument;
pub use mutation::Mutation;
pub use sync::{SyncEvent, SyncSession, SyncState};
