use chrono::{DateTime, Utc};
use derive_more::From;
use serde::{Deserialize, Serialize};

use super::PlayerRecord;

/// Players in ranked order: those with at least one game sorted by rating,
/// followed by those without games.
#[derive(Debug, Clone, PartialEq, From, Serialize, Deserialize)]
pub struct Snapshot {
    pub utc_timestamp: DateTime<Utc>,
    pub players: Vec<PlayerRecord>,
}
