//! The precomputed artifact bundle and its on-disk store.
//!
//! The preprocess pipeline writes one file per artifact into a snapshot
//! directory; the engine loads all of them back at startup. Loading is
//! all-or-nothing: a missing or corrupt file fails the whole load with an
//! error naming that artifact, never a partial snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::types::{AggregateEntry, BookRecord, MergedRow, PopularEntry};

pub const MERGED_ARTIFACT: &str = "merged.bin";
pub const AGGREGATE_ARTIFACT: &str = "aggregate.bin";
pub const BOOKS_ARTIFACT: &str = "books.bin";
pub const PIVOT_ARTIFACT: &str = "pivot.bin";
pub const SIMILARITY_ARTIFACT: &str = "similarity.bin";
pub const TOP_BOOKS_ARTIFACT: &str = "top_books.bin";

/// Title x user rating matrix over the experienced-user / well-known-title
/// subset, with its row index.
///
/// Row `i` of `matrix` holds the ratings for `titles[i]`; columns are users,
/// absent cells are 0. Row order is the sorted distinct title list, so the
/// index is deterministic for a given input dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotTable {
    pub titles: Vec<String>,
    pub matrix: Array2<f32>,
}

impl PivotTable {
    /// Positional index of an exact (case-sensitive) title, as stored.
    pub fn position(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|t| t == title)
    }
}

/// The immutable bundle of precomputed tables loaded once at startup.
///
/// Invariants: `similarity` is symmetric with a 1.0 diagonal (up to float
/// epsilon) and is indexed positionally by `pivot.titles`; indices are
/// stable only within one preprocessing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub merged: Vec<MergedRow>,
    pub aggregate: Vec<AggregateEntry>,
    pub books: Vec<BookRecord>,
    pub pivot: PivotTable,
    pub similarity: Array2<f32>,
}

impl Snapshot {
    /// Write every artifact into `dir` (one file each).
    pub fn save(&self, dir: &Path) -> Result<()> {
        write_artifact(dir, MERGED_ARTIFACT, &self.merged)?;
        write_artifact(dir, AGGREGATE_ARTIFACT, &self.aggregate)?;
        write_artifact(dir, BOOKS_ARTIFACT, &self.books)?;
        write_artifact(dir, PIVOT_ARTIFACT, &self.pivot)?;
        write_artifact(dir, SIMILARITY_ARTIFACT, &self.similarity)?;
        Ok(())
    }

    /// Load every artifact from `dir`, failing on the first missing or
    /// corrupt file.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            merged: read_artifact(dir, MERGED_ARTIFACT)?,
            aggregate: read_artifact(dir, AGGREGATE_ARTIFACT)?,
            books: read_artifact(dir, BOOKS_ARTIFACT)?,
            pivot: read_artifact(dir, PIVOT_ARTIFACT)?,
            similarity: read_artifact(dir, SIMILARITY_ARTIFACT)?,
        })
    }
}

/// Persist the landing-page popularity table. Stored beside the snapshot but
/// not part of the five-artifact query bundle.
pub fn save_top_books(dir: &Path, top_books: &[PopularEntry]) -> Result<()> {
    write_artifact(dir, TOP_BOOKS_ARTIFACT, &top_books.to_vec())
}

pub fn load_top_books(dir: &Path) -> Result<Vec<PopularEntry>> {
    read_artifact(dir, TOP_BOOKS_ARTIFACT)
}

fn write_artifact<T: Serialize>(dir: &Path, artifact: &'static str, value: &T) -> Result<()> {
    let file = File::create(dir.join(artifact))
        .map_err(|source| SnapshotError::Create { artifact, source })?;
    bincode::serialize_into(BufWriter::new(file), value)
        .map_err(|source| SnapshotError::Encode { artifact, source })
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, artifact: &'static str) -> Result<T> {
    let path = dir.join(artifact);
    let file = File::open(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::MissingArtifact { artifact, path }
        } else {
            SnapshotError::Read { artifact, source }
        }
    })?;
    bincode::deserialize_from(BufReader::new(file))
        .map_err(|source| SnapshotError::Decode { artifact, source })
}
