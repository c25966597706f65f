//! Pipeline configuration: dataset file locations and snapshot directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreprocessConfig {
    /// Raw CSV table locations
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Snapshot output
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    pub books: PathBuf,
    pub ratings: PathBuf,
    pub users: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            books: PathBuf::from("dataset/Books.csv"),
            ratings: PathBuf::from("dataset/Ratings.csv"),
            users: PathBuf::from("dataset/Users.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Directory the artifact files are written into
    pub dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("snapshot"),
        }
    }
}

impl PreprocessConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/preprocess").required(false))
            .add_source(config::Environment::with_prefix("PREPROCESS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
