//! Record and result types shared across the platform.
//!
//! All of these are plain data carriers: the preprocess crate produces them,
//! the engine crate reads them, nothing mutates them after cleaning.

use serde::{Deserialize, Serialize};

/// A cleaned book row.
///
/// `title` is the primary soft-key used for matching (case-insensitive
/// substring) and is not guaranteed unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year_of_publication: i32,
    /// Medium-resolution cover URL; the only image size kept after cleaning.
    pub cover_image_url: String,
}

/// A single rating event from the historical dataset.
///
/// A rating of 0 means "not explicitly rated": it is excluded from
/// popularity counts and averages but retained in the merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: u32,
    pub isbn: String,
    /// 0-10 scale, 0 = implicit signal.
    pub rating: u8,
}

/// A cleaned user row. Location fields are lower-cased; missing segments
/// hold the literal placeholder "other".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: u32,
    pub age: u8,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// One row of the merged dataset: book x rating-event x user.
///
/// This is the base table the year and location strategies filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year_of_publication: i32,
    pub cover_image_url: String,
    pub user_id: u32,
    pub rating: u8,
    pub age: u8,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Per-title aggregate over ALL ratings (zero ratings included), joined to
/// one representative book row. Sorted descending by `aggregated_rating`.
///
/// Drives the author and publisher strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub title: String,
    pub rating_count: u32,
    pub average_rating: f64,
    /// rating_count x average_rating, a popularity-weighted score.
    pub aggregated_rating: f64,
    pub author: String,
    pub publisher: String,
    pub cover_image_url: String,
}

/// Per-title popularity over nonzero ratings only, filtered to well-rated
/// titles. Feeds the "top books" landing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularEntry {
    pub title: String,
    pub author: String,
    pub cover_image_url: String,
    pub rating_count: u32,
    pub average_rating: f64,
}

/// A single recommended book as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedBook {
    pub name: String,
    pub cover: String,
    pub author: String,
}

/// The universal output unit: one labeled, ordered list of books.
///
/// Every strategy returns exactly one of these; "not found" is a normal
/// result with an explanatory label and an empty `books` list, never an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationList {
    /// Human-readable heading, or an explanatory message when `books` is
    /// empty.
    pub title: String,
    pub books: Vec<RecommendedBook>,
}

impl RecommendationList {
    pub fn new(label: impl Into<String>, books: Vec<RecommendedBook>) -> Self {
        Self {
            title: label.into(),
            books,
        }
    }

    /// An empty result carrying only an explanatory label.
    pub fn empty(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
