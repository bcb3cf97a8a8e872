use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::models::{
    ConnectCode, ConnectCodeField, FetchError, PlayerRecord, ProfileEnvelope, ProfiledUser,
    RankedNetplayProfile, Snapshot,
};
use domain::repositories::{
    HistoryRotation, LeaderboardSnapshotRepository, PlayerProfileRepository, RotationError,
    RotationReport, SnapshotSlot,
};
use tokio::time::Instant;

pub fn code(code: &str) -> ConnectCode {
    ConnectCode::parse(code).unwrap()
}

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Profile(ProfileEnvelope),
    Fail(FetchError),
    Delayed(Duration, Box<ScriptedResponse>),
    Hang,
}

pub fn ranked(connect_code: &str, rating: f64, games: u32) -> ScriptedResponse {
    ScriptedResponse::Profile(ProfileEnvelope {
        user: Some(ProfiledUser {
            display_name: connect_code.to_lowercase(),
            connect_code: ConnectCodeField {
                code: code(connect_code),
            },
            ranked_netplay_profile: Some(RankedNetplayProfile {
                rating_ordinal: rating,
                rating_update_count: Some(games),
                wins: Some(games),
                losses: Some(0),
                daily_global_placement: None,
                daily_regional_placement: None,
                continent: None,
                characters: vec![],
            }),
        }),
    })
}

/// Upstream stand-in answering each connect code with a fixed response.
#[derive(Debug, Default)]
pub struct ScriptedProfiles {
    responses: HashMap<String, ScriptedResponse>,
    starts: Mutex<Vec<Instant>>,
}

impl ScriptedProfiles {
    pub fn new<K: AsRef<str>>(responses: impl IntoIterator<Item = (K, ScriptedResponse)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(code, response)| (code.as_ref().to_owned(), response))
                .collect(),
            starts: Mutex::default(),
        }
    }

    pub fn start_times(&self) -> Vec<Instant> {
        let mut starts = self.starts.lock().unwrap().clone();
        starts.sort();
        starts
    }
}

async fn respond(response: ScriptedResponse) -> Result<ProfileEnvelope, FetchError> {
    let mut response = response;
    loop {
        match response {
            ScriptedResponse::Profile(envelope) => return Ok(envelope),
            ScriptedResponse::Fail(error) => return Err(error),
            ScriptedResponse::Delayed(delay, then) => {
                tokio::time::sleep(delay).await;
                response = *then;
            }
            ScriptedResponse::Hang => std::future::pending::<()>().await,
        }
    }
}

#[async_trait::async_trait]
impl PlayerProfileRepository for ScriptedProfiles {
    async fn fetch_profile(&self, code: &ConnectCode) -> Result<ProfileEnvelope, FetchError> {
        self.starts.lock().unwrap().push(Instant::now());
        let response = self
            .responses
            .get(code.as_str())
            .cloned()
            .unwrap_or(ScriptedResponse::Profile(ProfileEnvelope::default()));
        respond(response).await
    }
}

/// Snapshot store kept in memory, recording every rotation it performs.
#[derive(Debug, Default)]
pub struct InMemorySnapshots {
    pub current: Mutex<Option<Vec<PlayerRecord>>>,
    pub previous: Mutex<Option<Vec<PlayerRecord>>>,
    pub last_updated: Mutex<Option<DateTime<Utc>>>,
    pub rotations: Mutex<usize>,
    pub fail_with_disk_full: bool,
}

#[async_trait::async_trait]
impl LeaderboardSnapshotRepository for InMemorySnapshots {
    async fn rotate(&self, snapshot: &Snapshot) -> Result<RotationReport, RotationError> {
        *self.rotations.lock().unwrap() += 1;
        if self.fail_with_disk_full {
            return Err(RotationError::Stage {
                path: "players-new.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"),
            });
        }

        let demoted = self
            .current
            .lock()
            .unwrap()
            .replace(snapshot.players.clone());
        let history = match demoted {
            Some(players) => {
                *self.previous.lock().unwrap() = Some(players);
                HistoryRotation::Demoted
            }
            None => HistoryRotation::NoCurrentSnapshot,
        };
        *self.last_updated.lock().unwrap() = Some(snapshot.utc_timestamp);

        Ok(RotationReport {
            history,
            last_updated_written: true,
        })
    }

    async fn read_snapshot(
        &self,
        slot: SnapshotSlot,
    ) -> anyhow::Result<Option<Vec<PlayerRecord>>> {
        let stored = match slot {
            SnapshotSlot::Current => &self.current,
            SnapshotSlot::Previous => &self.previous,
        };
        Ok(stored.lock().unwrap().clone())
    }

    async fn read_last_updated(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(*self.last_updated.lock().unwrap())
    }
}
