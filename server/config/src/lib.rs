use anyhow::Result;
use domain::models::ConnectCode;
use envy::Error;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, Error>;
}

trait FromEnvLikeKeyValuePairs: Sized {
    fn from_iter(iter: impl Iterator<Item = (String, String)> + Clone) -> Result<Self, Error>;
}

impl<T: FromEnvLikeKeyValuePairs> FromEnv for T {
    fn from_env() -> Result<Self, Error> {
        // std::env::Vars is not Clone
        Self::from_iter(std::env::vars().collect::<Vec<_>>().into_iter())
    }
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub players: PlayerListConfig,
    pub deploy: DeployConfig,
}

impl FromEnvLikeKeyValuePairs for AppConfig {
    fn from_iter(iter: impl Iterator<Item = (String, String)> + Clone) -> Result<Self, Error> {
        Ok(Self {
            fetch: FetchConfig::from_iter(iter.clone())?,
            players: PlayerListConfig::from_iter(iter.clone())?,
            deploy: DeployConfig::from_iter(iter)?,
        })
    }
}

const fn default_max_requests() -> usize {
    5
}

const fn default_window_ms() -> u64 {
    1_000
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Request budget towards the upstream API: at most `max_requests` requests
/// are started in any window of `window_ms` milliseconds.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl FetchConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlayerListConfig {
    #[serde(default)]
    pub connect_codes: Vec<String>,
    pub connect_codes_file: Option<PathBuf>,
}

impl PlayerListConfig {
    /// Collects the configured connect codes, dropping (and logging) every
    /// entry that is not a valid connect code or repeats an earlier one.
    pub fn load_connect_codes(&self) -> anyhow::Result<Vec<ConnectCode>> {
        let from_file: Vec<String> = match &self.connect_codes_file {
            Some(path) => std::fs::read_to_string(path)?
                .lines()
                .map(str::to_owned)
                .collect(),
            None => vec![],
        };

        Ok(validate_connect_codes(
            self.connect_codes.iter().chain(from_file.iter()),
        ))
    }
}

/// Entries are trimmed before validation; empty entries are skipped silently.
pub fn validate_connect_codes<'a>(raw: impl IntoIterator<Item = &'a String>) -> Vec<ConnectCode> {
    let mut seen = HashSet::new();

    raw.into_iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match ConnectCode::parse(entry) {
            Ok(code) => Some(code),
            Err(error) => {
                tracing::warn!(%error, "skipping invalid connect code");
                None
            }
        })
        .filter(|code| {
            let first_occurrence = seen.insert(code.clone());
            if !first_occurrence {
                tracing::warn!(%code, "skipping duplicate connect code");
            }
            first_occurrence
        })
        .collect()
}

/// Post-rotation deploy step. Both fields must be present for it to run.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct DeployConfig {
    pub repository_root: Option<PathBuf>,
    pub command: Option<String>,
}

impl FromEnvLikeKeyValuePairs for FetchConfig {
    fn from_iter(iter: impl Iterator<Item = (String, String)>) -> Result<Self, Error> {
        envy::prefixed("FETCH_").from_iter(iter)
    }
}

impl FromEnvLikeKeyValuePairs for PlayerListConfig {
    fn from_iter(iter: impl Iterator<Item = (String, String)>) -> Result<Self, Error> {
        envy::prefixed("PLAYERS_").from_iter(iter)
    }
}

impl FromEnvLikeKeyValuePairs for DeployConfig {
    fn from_iter(iter: impl Iterator<Item = (String, String)>) -> Result<Self, Error> {
        envy::prefixed("DEPLOY_").from_iter(iter)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_config_from_iterator() {
        let setting = [
            ("FETCH_MAX_REQUESTS".to_string(), "2".to_string()),
            ("FETCH_WINDOW_MS".to_string(), "1500".to_string()),
            (
                "PLAYERS_CONNECT_CODES".to_string(),
                "C4D#69,DUFF#838,YBAI#170".to_string(),
            ),
            (
                "DEPLOY_REPOSITORY_ROOT".to_string(),
                "/srv/leaderboard".to_string(),
            ),
            ("DEPLOY_COMMAND".to_string(), "npm run deploy".to_string()),
        ];

        let config = AppConfig::from_iter(setting.into_iter()).unwrap();

        assert_eq!(
            config.fetch,
            FetchConfig {
                max_requests: 2,
                window_ms: 1500,
                request_timeout_ms: 10_000,
            }
        );
        assert_eq!(
            config.players.connect_codes,
            vec!["C4D#69", "DUFF#838", "YBAI#170"]
        );
        assert_eq!(config.deploy.command.as_deref(), Some("npm run deploy"));
    }

    #[test]
    fn everything_has_a_default() {
        let config = AppConfig::from_iter(std::iter::empty::<(String, String)>()).unwrap();

        assert_eq!(config.fetch.window(), Duration::from_secs(1));
        assert!(config.players.connect_codes.is_empty());
        assert!(config.deploy.repository_root.is_none());
    }

    #[test]
    fn invalid_and_duplicate_codes_are_dropped() {
        let raw = ["AA#1", "bad#1", "BB#2", "AA#1", "CC#", " DD#4 ", ""]
            .map(str::to_owned)
            .to_vec();

        let codes = validate_connect_codes(&raw);

        assert_eq!(
            codes.iter().map(ConnectCode::as_str).collect::<Vec<_>>(),
            vec!["AA#1", "BB#2", "DD#4"]
        );
        assert!(codes.iter().all(|code| raw.iter().any(|r| r.trim() == code.as_str())));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_before_validation() {
        let raw = ["  AA#1", "BB#2\t", " \t ", "C C#3"].map(str::to_owned).to_vec();

        let codes = validate_connect_codes(&raw);

        assert_eq!(
            codes.iter().map(ConnectCode::as_str).collect::<Vec<_>>(),
            vec!["AA#1", "BB#2"]
        );
    }

    #[test]
    fn codes_are_read_from_list_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("codes.txt");
        std::fs::write(&file, "BB#2\n\nnot a code\nAA#1\n").unwrap();

        let config = PlayerListConfig {
            connect_codes: vec!["AA#1".to_owned()],
            connect_codes_file: Some(file),
        };
        let codes = config.load_connect_codes().unwrap();

        assert_eq!(
            codes.iter().map(ConnectCode::as_str).collect::<Vec<_>>(),
            vec!["AA#1", "BB#2"]
        );
    }
}
