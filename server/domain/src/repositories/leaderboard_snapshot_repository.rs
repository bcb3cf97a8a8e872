use crate::models::{PlayerRecord, Snapshot};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSlot {
    Current,
    Previous,
}

/// What happened to the snapshot that was current before a rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRotation {
    Demoted,
    /// Nothing to demote; expected on the very first rotation.
    NoCurrentSnapshot,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub history: HistoryRotation,
    pub last_updated_written: bool,
}

/// The new snapshot could not be installed as current. Files that were in
/// place before the rotation are left as they were.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("could not encode snapshot: {0}")]
    Encode(String),
    #[error("could not create snapshot directory {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not stage snapshot at {path}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not move staged snapshot into {path}")]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
pub trait LeaderboardSnapshotRepository {
    /// Installs `snapshot` as current, demoting the old current to previous.
    async fn rotate(&self, snapshot: &Snapshot) -> Result<RotationReport, RotationError>;

    async fn read_snapshot(&self, slot: SnapshotSlot) -> anyhow::Result<Option<Vec<PlayerRecord>>>;

    async fn read_last_updated(&self) -> anyhow::Result<Option<DateTime<Utc>>>;
}
