//! # Bookrec Core
//!
//! Core data structures for the book recommendation platform.
//!
//! This crate provides the building blocks shared by the offline
//! preprocessing pipeline and the query-time recommendation engine.
//!
//! ## Modules
//!
//! - `types`: cleaned record types and recommendation result types
//! - `snapshot`: the precomputed artifact bundle and its on-disk store
//! - `error`: load-failure error types
//!
//! The preprocess crate builds these structures; the engine crate loads them
//! once at startup and consumes them read-only.

pub mod error;
pub mod snapshot;
pub mod types;

pub use error::SnapshotError;
pub use snapshot::{PivotTable, Snapshot};
pub use types::{
    AggregateEntry, BookRecord, MergedRow, PopularEntry, RatingEvent, RecommendationList,
    RecommendedBook, UserRecord,
};

/// Result type alias for snapshot store operations
pub type Result<T> = std::result::Result<T, SnapshotError>;
