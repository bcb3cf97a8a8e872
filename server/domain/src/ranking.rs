//! Rank numbers and rank movement between two stored snapshots.
//!
//! Stored snapshots are already in ranked order, so nothing here sorts by
//! rating. Ranks are positions among players with at least one game; players
//! without games are listed last and have no rank.

use std::collections::HashMap;

use crate::models::PlayerRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing<'a> {
    pub player: &'a PlayerRecord,
    pub rank: Option<u32>,
}

pub fn standings(players: &[PlayerRecord]) -> Vec<Standing<'_>> {
    let (played, unplayed): (Vec<_>, Vec<_>) = players.iter().partition(|p| p.has_played());

    let ranked = played.into_iter().zip(1..).map(|(player, rank)| Standing {
        player,
        rank: Some(rank),
    });
    let unranked = unplayed
        .into_iter()
        .map(|player| Standing { player, rank: None });

    ranked.chain(unranked).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMovement {
    Climbed(u32),
    Dropped(u32),
    Held,
    /// Ranked now, but unranked or absent in the previous snapshot.
    Entered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderboardRow<'a> {
    pub current: Standing<'a>,
    pub previous: Option<Standing<'a>>,
}

impl LeaderboardRow<'_> {
    pub fn movement(&self) -> Option<RankMovement> {
        let current = self.current.rank?;

        let movement = match self.previous.and_then(|previous| previous.rank) {
            None => RankMovement::Entered,
            Some(previous) if previous > current => RankMovement::Climbed(previous - current),
            Some(previous) if previous < current => RankMovement::Dropped(current - previous),
            Some(_) => RankMovement::Held,
        };
        Some(movement)
    }

    pub fn rating_change(&self) -> Option<f64> {
        self.previous
            .map(|previous| self.current.player.rating() - previous.player.rating())
    }
}

/// One row per player of `current`, each paired with the same player's
/// standing in `previous` when there is one.
pub fn compare_snapshots<'a>(
    previous: &'a [PlayerRecord],
    current: &'a [PlayerRecord],
) -> Vec<LeaderboardRow<'a>> {
    let previous_by_code = standings(previous)
        .into_iter()
        .map(|standing| (standing.player.code().as_str(), standing))
        .collect::<HashMap<_, _>>();

    standings(current)
        .into_iter()
        .map(|standing| LeaderboardRow {
            current: standing,
            previous: previous_by_code
                .get(standing.player.code().as_str())
                .copied(),
        })
        .collect()
}
