use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::{ConnectCode, ConnectCodeField, PlayerRecord, RankedNetplayProfile};

/// The user object as the upstream API returns it.
///
/// Unranked or unknown players come back without `rankedNetplayProfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfiledUser {
    pub display_name: String,
    pub connect_code: ConnectCodeField,
    #[serde(default)]
    pub ranked_netplay_profile: Option<RankedNetplayProfile>,
}

/// Payload of one successful profile lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileEnvelope {
    pub user: Option<ProfiledUser>,
}

impl ProfileEnvelope {
    pub fn into_player_record(self) -> Option<PlayerRecord> {
        let user = self.user?;
        let profile = user.ranked_netplay_profile?;

        profile.is_well_formed().then(|| PlayerRecord {
            display_name: user.display_name,
            connect_code: user.connect_code,
            ranked_netplay_profile: profile,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream answered with HTTP status {0}")]
    Status(u16),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(ProfileEnvelope),
    Failure(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Outcomes of one fetch batch, keyed by connect code in the order the codes
/// were requested.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcomes(IndexMap<ConnectCode, FetchOutcome>);

impl FetchOutcomes {
    pub fn get(&self, code: &ConnectCode) -> Option<&FetchOutcome> {
        self.0.get(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn successes(&self) -> usize {
        self.0.values().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectCode, &FetchOutcome)> {
        self.0.iter()
    }
}

impl FromIterator<(ConnectCode, FetchOutcome)> for FetchOutcomes {
    fn from_iter<T: IntoIterator<Item = (ConnectCode, FetchOutcome)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FetchOutcomes {
    type Item = (ConnectCode, FetchOutcome);
    type IntoIter = indexmap::map::IntoIter<ConnectCode, FetchOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
