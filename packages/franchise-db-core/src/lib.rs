//! Record-lifecycle and referential-integrity engine for the franchise dataset.
//!
//! Provides dense identifier tables, compaction on delete, per-category
//! cascade policies, create/update validation, the filter/sort/page query
//! pipeline, and copy-on-write snapshot storage.

pub mod cascade;
pub mod compaction;
pub mod config;
pub mod database;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod projection;
pub mod table;
pub mod validation;

pub use database::{Database, WriteScope};
pub use dataset::Dataset;
pub use entity::{Entity, EntityKind};
pub use error::{DbError, Result, ValidationReason};
