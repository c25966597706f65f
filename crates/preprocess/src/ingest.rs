//! CSV ingestion for the three raw dataset tables.
//!
//! Numeric fields that are dirty in the source data (year, age) are carried
//! as strings/options here and resolved during cleaning; a missing file is a
//! fatal load failure naming the input table.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use bookrec_core::RatingEvent;

/// A raw book row as shipped in the dataset. The year field may hold a
/// misparsed publisher string, so it stays a string until cleaning.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBookRow {
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "Book-Title")]
    pub title: String,
    #[serde(rename = "Book-Author")]
    pub author: Option<String>,
    #[serde(rename = "Year-Of-Publication")]
    pub year_of_publication: String,
    #[serde(rename = "Publisher")]
    pub publisher: Option<String>,
    #[serde(rename = "Image-URL-S")]
    pub image_url_s: String,
    #[serde(rename = "Image-URL-M")]
    pub image_url_m: String,
    #[serde(rename = "Image-URL-L")]
    pub image_url_l: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRatingRow {
    #[serde(rename = "User-ID")]
    user_id: u32,
    #[serde(rename = "ISBN")]
    isbn: String,
    #[serde(rename = "Book-Rating")]
    rating: u8,
}

/// A raw user row; location is the unsplit "City, State, Country" string.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUserRow {
    #[serde(rename = "User-ID")]
    pub user_id: u32,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Age")]
    pub age: Option<f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("input table '{table}' not found at {path}")]
    MissingTable { table: &'static str, path: PathBuf },

    #[error("failed to read input table '{table}' at {path}")]
    Read {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub fn load_books(path: &Path) -> Result<Vec<RawBookRow>, IngestError> {
    load_table("books", path)
}

pub fn load_ratings(path: &Path) -> Result<Vec<RatingEvent>, IngestError> {
    let rows: Vec<RawRatingRow> = load_table("ratings", path)?;
    Ok(rows
        .into_iter()
        .map(|row| RatingEvent {
            user_id: row.user_id,
            isbn: row.isbn,
            rating: row.rating,
        })
        .collect())
}

pub fn load_users(path: &Path) -> Result<Vec<RawUserRow>, IngestError> {
    load_table("users", path)
}

fn load_table<T: DeserializeOwned>(table: &'static str, path: &Path) -> Result<Vec<T>, IngestError> {
    if !path.exists() {
        return Err(IngestError::MissingTable {
            table,
            path: path.to_path_buf(),
        });
    }

    let read_err = |source| IngestError::Read {
        table,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.map_err(read_err)?);
    }
    Ok(rows)
}
