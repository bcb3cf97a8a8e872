use chrono::Utc;
use domain::models::{ConnectCode, PlayerRecord, Snapshot};
use domain::ranking::{compare_snapshots, RankMovement};
use domain::repositories::{
    LeaderboardSnapshotRepository, PlayerProfileRepository, RotationError, RotationReport,
    SnapshotSlot,
};
use domain::snapshot_builder::{build_snapshot, BuildReport, EmptyResultError};
use thiserror::Error;

use crate::fetcher::RateLimitedFetcher;

/// Errors that end a cycle. Either way the stored snapshots stay as they
/// were before the cycle started.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),
    #[error(transparent)]
    Rotation(#[from] RotationError),
}

/// A cycle that returns this has installed a new current snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub snapshot: Snapshot,
    pub requested: usize,
    pub build: BuildReport,
    pub rotation: RotationReport,
}

#[tracing::instrument(skip_all, fields(requested = codes.len()))]
pub async fn run_cycle<R, S>(
    fetcher: &RateLimitedFetcher<R>,
    store: &S,
    codes: &[ConnectCode],
) -> Result<CycleSummary, CycleError>
where
    R: PlayerProfileRepository + Sync,
    S: LeaderboardSnapshotRepository + Sync,
{
    let outcomes = fetcher.fetch_all(codes).await;
    let (snapshot, build) = build_snapshot(outcomes, Utc::now())?;

    tracing::info!(
        included = build.included,
        failed = build.failed,
        without_profile = build.without_profile,
        "built snapshot"
    );

    let rotation = store.rotate(&snapshot).await?;

    Ok(CycleSummary {
        snapshot,
        requested: codes.len(),
        build,
        rotation,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementSummary {
    pub climbed: usize,
    pub dropped: usize,
    pub held: usize,
    pub entered: usize,
    pub unranked: usize,
}

pub fn summarize_movement(previous: &[PlayerRecord], current: &[PlayerRecord]) -> MovementSummary {
    let mut summary = MovementSummary::default();

    for row in compare_snapshots(previous, current) {
        let movement = row.movement();
        tracing::debug!(
            code = %row.current.player.code(),
            rank = ?row.current.rank,
            previous_rank = ?row.previous.and_then(|p| p.rank),
            ?movement,
            "standing"
        );

        match movement {
            Some(RankMovement::Climbed(_)) => summary.climbed += 1,
            Some(RankMovement::Dropped(_)) => summary.dropped += 1,
            Some(RankMovement::Held) => summary.held += 1,
            Some(RankMovement::Entered) => summary.entered += 1,
            None => summary.unranked += 1,
        }
    }

    summary
}

/// Compares the freshly installed snapshot with the one it replaced.
pub async fn log_rank_movement(
    store: &(impl LeaderboardSnapshotRepository + Sync),
    current: &[PlayerRecord],
) -> Option<MovementSummary> {
    match store.read_snapshot(SnapshotSlot::Previous).await {
        Ok(Some(previous)) => {
            let summary = summarize_movement(&previous, current);
            tracing::info!(
                climbed = summary.climbed,
                dropped = summary.dropped,
                held = summary.held,
                entered = summary.entered,
                unranked = summary.unranked,
                "rank movement since previous snapshot"
            );
            Some(summary)
        }
        Ok(None) => {
            tracing::info!("no previous snapshot to compare with");
            None
        }
        Err(error) => {
            tracing::warn!(%error, "could not read previous snapshot");
            None
        }
    }
}
