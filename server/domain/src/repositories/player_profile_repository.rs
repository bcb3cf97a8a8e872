use crate::models::{ConnectCode, FetchError, ProfileEnvelope};

#[async_trait::async_trait]
pub trait PlayerProfileRepository {
    async fn fetch_profile(&self, code: &ConnectCode) -> Result<ProfileEnvelope, FetchError>;
}
