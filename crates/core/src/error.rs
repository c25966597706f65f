//! Load-failure error types.
//!
//! A missing or unreadable snapshot artifact is fatal at startup and must
//! prevent the engine from serving traffic; every variant names the artifact
//! involved so the failure is attributable to one file.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot artifact '{artifact}' not found at {path}")]
    MissingArtifact {
        artifact: &'static str,
        path: PathBuf,
    },

    #[error("failed to read snapshot artifact '{artifact}'")]
    Read {
        artifact: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot artifact '{artifact}'")]
    Decode {
        artifact: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to create snapshot artifact '{artifact}'")]
    Create {
        artifact: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot artifact '{artifact}'")]
    Encode {
        artifact: &'static str,
        #[source]
        source: bincode::Error,
    },
}

impl SnapshotError {
    /// The artifact file this failure is about.
    pub fn artifact(&self) -> &'static str {
        match self {
            SnapshotError::MissingArtifact { artifact, .. }
            | SnapshotError::Read { artifact, .. }
            | SnapshotError::Decode { artifact, .. }
            | SnapshotError::Create { artifact, .. }
            | SnapshotError::Encode { artifact, .. } => artifact,
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
