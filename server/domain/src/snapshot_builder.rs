use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{FetchOutcome, FetchOutcomes, PlayerRecord, Snapshot};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no usable player profile among {requested} lookups ({failed} failed, {without_profile} without a rating profile)")]
pub struct EmptyResultError {
    pub requested: usize,
    pub failed: usize,
    pub without_profile: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub failed: usize,
    pub without_profile: usize,
    pub included: usize,
}

/// Turns one batch of lookups into a ranked snapshot.
///
/// Players with at least one game come first, ordered by rating with ties
/// kept in request order; players without games follow in request order.
pub fn build_snapshot(
    outcomes: FetchOutcomes,
    utc_timestamp: DateTime<Utc>,
) -> Result<(Snapshot, BuildReport), EmptyResultError> {
    let requested = outcomes.len();
    let mut report = BuildReport::default();

    let envelopes = outcomes
        .into_iter()
        .filter_map(|(_, outcome)| match outcome {
            FetchOutcome::Success(envelope) => Some(envelope),
            FetchOutcome::Failure(_) => {
                report.failed += 1;
                None
            }
        })
        .collect::<Vec<_>>();

    let empty_result = |report: &BuildReport| EmptyResultError {
        requested,
        failed: report.failed,
        without_profile: report.without_profile,
    };

    if envelopes.is_empty() {
        return Err(empty_result(&report));
    }

    let records = envelopes
        .into_iter()
        .filter_map(|envelope| {
            let record = envelope.into_player_record();
            if record.is_none() {
                report.without_profile += 1;
            }
            record
        })
        .collect::<Vec<_>>();

    if records.is_empty() {
        return Err(empty_result(&report));
    }

    let (mut played, unplayed): (Vec<PlayerRecord>, Vec<PlayerRecord>) =
        records.into_iter().partition(PlayerRecord::has_played);

    // sort_by is stable, equal ratings stay in request order
    played.sort_by(|a, b| b.rating().total_cmp(&a.rating()));
    played.extend(unplayed);

    report.included = played.len();

    Ok((Snapshot::from((utc_timestamp, played)), report))
}
