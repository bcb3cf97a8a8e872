#![deny(clippy::all, clippy::cargo)]
#![warn(clippy::nursery, clippy::pedantic)]
#![allow(clippy::cargo_common_metadata)]

use config::{AppConfig, FromEnv};
use infra_snapshot_repository_impl::{config::SnapshotDirectory, JsonFileSnapshotRepository};
use infra_upstream_repository_impl::{config::SlippiApi, GraphQlUpstreamRepository};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::deploy::{deploy_if_clean, DeployOutcome};
use crate::environment::Env;
use crate::fetcher::{FetchLimits, RateLimitedFetcher};

mod cycle;
mod deploy;
mod environment;
mod fetcher;
mod request_budget;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = Env::from_env()?;

    // only send sentry events when it's not running locally
    let _sentry_guard = env.sentry_dsn().map(|dsn| {
        let guard = sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                traces_sample_rate: 0.1,
                environment: Some(env.environment_name.clone().into()),
                ..Default::default()
            },
        ));
        sentry::configure_scope(|scope| scope.set_level(Some(sentry::Level::Warning)));
        guard
    });

    // initialize tracing
    // see https://github.com/tokio-rs/axum/blob/79a0a54bc9f0f585c974b5e6793541baff980662/examples/tracing-aka-logging/src/main.rs
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry::integrations::tracing::layer())
        .init();

    let app_config = AppConfig::from_env()?;
    let codes = app_config.players.load_connect_codes()?;
    tracing::info!(players = codes.len(), "loaded connect codes");

    let fetcher = RateLimitedFetcher::new(
        GraphQlUpstreamRepository::try_new(SlippiApi::from_env()?)?,
        FetchLimits::from(&app_config.fetch),
    );
    let store = JsonFileSnapshotRepository::new(SnapshotDirectory::from_env()?);

    let cycle = tokio::select! {
        result = cycle::run_cycle(&fetcher, &store, &codes) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, abandoning fetch cycle");
            return Err("interrupted before a new snapshot was installed".into());
        }
    };

    let summary = match cycle {
        Ok(summary) => summary,
        Err(error) => {
            tracing::error!(%error, "fetch cycle failed, stored snapshots left as they were");
            return Err(error.into());
        }
    };
    tracing::info!(
        requested = summary.requested,
        included = summary.build.included,
        history = ?summary.rotation.history,
        "installed new snapshot"
    );

    cycle::log_rank_movement(&store, &summary.snapshot.players).await;

    match deploy_if_clean(&app_config.deploy).await? {
        DeployOutcome::NotConfigured => tracing::debug!("no deploy configured"),
        DeployOutcome::SkippedPendingChanges => {}
        DeployOutcome::Deployed => tracing::info!("deploy complete"),
    }

    Ok(())
}
