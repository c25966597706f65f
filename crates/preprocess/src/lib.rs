//! Offline preprocessing pipeline.
//!
//! Ingests the raw books/ratings/users CSV tables, cleans them, derives the
//! precomputed recommendation artifacts and writes them as a snapshot for
//! the query engine. Runs once, offline; the engine never touches raw data.

pub mod clean;
pub mod config;
pub mod derive;
pub mod ingest;

pub use config::PreprocessConfig;
pub use derive::DerivedArtifacts;
pub use ingest::IngestError;

use anyhow::Context;
use tracing::info;

/// Run the full pipeline: load, clean, derive, persist.
///
/// Fails fast before deriving anything if a raw source table is absent.
pub fn run(config: &PreprocessConfig) -> anyhow::Result<()> {
    let raw_books = ingest::load_books(&config.dataset.books)?;
    let ratings = ingest::load_ratings(&config.dataset.ratings)?;
    let raw_users = ingest::load_users(&config.dataset.users)?;
    info!(
        books = raw_books.len(),
        ratings = ratings.len(),
        users = raw_users.len(),
        "loaded raw tables"
    );

    let books = clean::clean_books(raw_books);
    let users = clean::clean_users(raw_users);

    let artifacts = derive::derive(&books, &ratings, &users);

    std::fs::create_dir_all(&config.snapshot.dir).with_context(|| {
        format!(
            "failed to create snapshot directory {}",
            config.snapshot.dir.display()
        )
    })?;
    artifacts.snapshot.save(&config.snapshot.dir)?;
    bookrec_core::snapshot::save_top_books(&config.snapshot.dir, &artifacts.top_books)?;
    info!(dir = %config.snapshot.dir.display(), "snapshot written");

    Ok(())
}
