//! Recommendation service configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Snapshot location
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8082)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Directory the preprocess pipeline wrote the artifact files into
    pub dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("snapshot"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/engine").required(false))
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
