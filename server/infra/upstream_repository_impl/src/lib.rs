mod query;

pub mod config {
    fn default_endpoint_url() -> String {
        "https://internal.slippi.gg/graphql".to_owned()
    }

    fn default_user_agent() -> String {
        concat!("ladder-leaderboard-ingestor/", env!("CARGO_PKG_VERSION")).to_owned()
    }

    #[derive(serde::Deserialize, Debug, Clone)]
    pub struct SlippiApi {
        #[serde(default = "default_endpoint_url")]
        pub endpoint_url: String,
        #[serde(default = "default_user_agent")]
        pub user_agent: String,
    }

    impl SlippiApi {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(envy::prefixed("SLIPPI_API_").from_env::<Self>()?)
        }
    }
}

use domain::models::{ConnectCode, FetchError, ProfileEnvelope};
use domain::repositories::PlayerProfileRepository;
use query::{parse_profile_response, ProfileQuery};

/// Looks up ranked profiles through the Slippi GraphQL gateway.
///
/// Each lookup is a single request; throttling and timeouts are left to the
/// caller.
#[derive(Debug, Clone)]
pub struct GraphQlUpstreamRepository {
    client: reqwest::Client,
    endpoint_url: String,
}

impl GraphQlUpstreamRepository {
    pub fn try_new(config: config::SlippiApi) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url,
        })
    }
}

#[async_trait::async_trait]
impl PlayerProfileRepository for GraphQlUpstreamRepository {
    #[tracing::instrument(skip_all, fields(code = %code))]
    async fn fetch_profile(&self, code: &ConnectCode) -> Result<ProfileEnvelope, FetchError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&ProfileQuery::for_code(code))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_profile_response(&body)
    }
}
