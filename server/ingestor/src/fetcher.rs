use std::time::Duration;

use config::FetchConfig;
use domain::models::{ConnectCode, FetchError, FetchOutcome, FetchOutcomes};
use domain::repositories::PlayerProfileRepository;
use futures_util::future::join_all;

use crate::request_budget::RequestBudget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    pub max_requests: usize,
    pub window: Duration,
    pub request_timeout: Duration,
}

impl From<&FetchConfig> for FetchLimits {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
            request_timeout: config.request_timeout(),
        }
    }
}

/// Looks up many profiles at once without exceeding the upstream request
/// budget. A failed or timed out lookup only affects its own outcome.
pub struct RateLimitedFetcher<R> {
    repository: R,
    budget: RequestBudget,
    request_timeout: Duration,
}

impl<R: PlayerProfileRepository + Sync> RateLimitedFetcher<R> {
    pub fn new(repository: R, limits: FetchLimits) -> Self {
        Self {
            repository,
            budget: RequestBudget::new(limits.max_requests, limits.window),
            request_timeout: limits.request_timeout,
        }
    }

    #[tracing::instrument(skip_all, fields(requested = codes.len()))]
    pub async fn fetch_all(&self, codes: &[ConnectCode]) -> FetchOutcomes {
        let outcomes = join_all(codes.iter().map(|code| self.fetch_one(code))).await;
        let outcomes = codes.iter().cloned().zip(outcomes).collect::<FetchOutcomes>();

        tracing::info!(
            succeeded = outcomes.successes(),
            failed = outcomes.failures(),
            "fetched player profiles"
        );
        outcomes
    }

    async fn fetch_one(&self, code: &ConnectCode) -> FetchOutcome {
        self.budget.acquire().await;

        let result = tokio::time::timeout(self.request_timeout, self.repository.fetch_profile(code))
            .await
            .unwrap_or_else(|_| Err(FetchError::Timeout(self.request_timeout)));

        match result {
            Ok(envelope) => FetchOutcome::Success(envelope),
            Err(error) => {
                tracing::warn!(%code, %error, "profile lookup failed");
                FetchOutcome::Failure(error)
            }
        }
    }
}
