use chrono::{DateTime, TimeZone, Utc};
use domain::models::{PlayerRecord, Snapshot};
use domain::repositories::{
    HistoryRotation, LeaderboardSnapshotRepository, RotationError, RotationReport, SnapshotSlot,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

mod atomic_file;

use atomic_file::StagedFile;

pub mod config {
    use std::path::PathBuf;

    fn default_directory() -> PathBuf {
        PathBuf::from("data")
    }

    fn default_current_file_name() -> String {
        "players-new.json".to_owned()
    }

    fn default_previous_file_name() -> String {
        "players-old.json".to_owned()
    }

    fn default_last_updated_file_name() -> String {
        "timestamp.json".to_owned()
    }

    #[derive(Debug, serde::Deserialize, Clone)]
    pub struct SnapshotDirectory {
        #[serde(default = "default_directory")]
        pub directory: PathBuf,
        #[serde(default = "default_current_file_name")]
        pub current_file_name: String,
        #[serde(default = "default_previous_file_name")]
        pub previous_file_name: String,
        #[serde(default = "default_last_updated_file_name")]
        pub last_updated_file_name: String,
    }

    impl SnapshotDirectory {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(envy::prefixed("SNAPSHOT_").from_env::<Self>()?)
        }

        pub fn at(directory: impl Into<PathBuf>) -> Self {
            Self {
                directory: directory.into(),
                current_file_name: default_current_file_name(),
                previous_file_name: default_previous_file_name(),
                last_updated_file_name: default_last_updated_file_name(),
            }
        }
    }
}

#[derive(Debug)]
enum Demotion {
    Staged(StagedFile),
    NoCurrentSnapshot,
    Failed(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct LastUpdated {
    /// Unix time in milliseconds.
    updated: i64,
}

/// Keeps the current and previous leaderboard as JSON arrays of player
/// records, next to a last-updated timestamp.
///
/// Only one process may rotate a directory at a time. Readers never observe
/// a partially written file since every file is replaced by rename.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotRepository {
    config: config::SnapshotDirectory,
}

impl JsonFileSnapshotRepository {
    pub fn new(config: config::SnapshotDirectory) -> Self {
        Self { config }
    }

    fn path_of(&self, slot: SnapshotSlot) -> PathBuf {
        let file_name = match slot {
            SnapshotSlot::Current => &self.config.current_file_name,
            SnapshotSlot::Previous => &self.config.previous_file_name,
        };
        self.config.directory.join(file_name)
    }

    fn last_updated_path(&self) -> PathBuf {
        self.config.directory.join(&self.config.last_updated_file_name)
    }

    /// Stages the old current snapshot as the next previous one without
    /// moving it into place.
    async fn stage_demotion(&self) -> Demotion {
        let contents = match tokio::fs::read(self.path_of(SnapshotSlot::Current)).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Demotion::NoCurrentSnapshot,
            Err(error) => return Demotion::Failed(error.to_string()),
        };

        match atomic_file::stage(&self.path_of(SnapshotSlot::Previous), &contents).await {
            Ok(staged) => Demotion::Staged(staged),
            Err(error) => Demotion::Failed(error.to_string()),
        }
    }

    /// Installs the new current snapshot, then the demoted one. Previous is
    /// only replaced once current has been.
    async fn install_rotation(
        &self,
        current: StagedFile,
        demotion: Demotion,
    ) -> Result<HistoryRotation, RotationError> {
        let current_path = self.path_of(SnapshotSlot::Current);
        if let Err(source) = current.install(&current_path).await {
            if let Demotion::Staged(previous) = demotion {
                previous.discard().await;
            }
            return Err(RotationError::Install {
                path: current_path,
                source,
            });
        }

        let history = match demotion {
            Demotion::Staged(previous) => {
                match previous.install(&self.path_of(SnapshotSlot::Previous)).await {
                    Ok(()) => HistoryRotation::Demoted,
                    Err(error) => HistoryRotation::Failed(error.to_string()),
                }
            }
            Demotion::NoCurrentSnapshot => HistoryRotation::NoCurrentSnapshot,
            Demotion::Failed(reason) => HistoryRotation::Failed(reason),
        };
        Ok(history)
    }

    async fn write_last_updated(&self, utc_timestamp: DateTime<Utc>) -> anyhow::Result<()> {
        let encoded = serde_json::to_vec(&LastUpdated {
            updated: utc_timestamp.timestamp_millis(),
        })?;
        atomic_file::write_atomically(&self.last_updated_path(), &encoded).await?;
        Ok(())
    }
}

async fn read_if_exists(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}

#[async_trait::async_trait]
impl LeaderboardSnapshotRepository for JsonFileSnapshotRepository {
    #[tracing::instrument(skip_all, fields(players = snapshot.players.len()))]
    async fn rotate(&self, snapshot: &Snapshot) -> Result<RotationReport, RotationError> {
        let directory = &self.config.directory;
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|source| RotationError::Directory {
                path: directory.clone(),
                source,
            })?;

        let encoded = serde_json::to_vec(&snapshot.players)
            .map_err(|e| RotationError::Encode(e.to_string()))?;

        // stage first: if the new snapshot cannot be written, nothing on disk changes
        let current = self.path_of(SnapshotSlot::Current);
        let staged = atomic_file::stage(&current, &encoded)
            .await
            .map_err(|source| RotationError::Stage {
                path: current.clone(),
                source,
            })?;

        let demotion = self.stage_demotion().await;
        let history = self.install_rotation(staged, demotion).await?;
        match &history {
            HistoryRotation::Demoted => tracing::info!("demoted current snapshot to previous"),
            HistoryRotation::NoCurrentSnapshot => {
                tracing::warn!("no current snapshot to demote, previous snapshot left as is");
            }
            HistoryRotation::Failed(reason) => {
                tracing::warn!(%reason, "could not demote current snapshot, continuing");
            }
        }

        let last_updated_written = match self.write_last_updated(snapshot.utc_timestamp).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "wrote snapshot but not its timestamp");
                false
            }
        };

        tracing::info!(path = %current.display(), "installed new current snapshot");
        Ok(RotationReport {
            history,
            last_updated_written,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn read_snapshot(&self, slot: SnapshotSlot) -> anyhow::Result<Option<Vec<PlayerRecord>>> {
        let Some(contents) = read_if_exists(&self.path_of(slot)).await? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_slice(&contents)?))
    }

    #[tracing::instrument(skip(self))]
    async fn read_last_updated(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        let Some(contents) = read_if_exists(&self.last_updated_path()).await? else {
            return Ok(None);
        };

        let LastUpdated { updated } = serde_json::from_slice(&contents)?;
        Utc.timestamp_millis_opt(updated)
            .single()
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("{updated} is not a valid timestamp"))
    }
}
