mod leaderboard_snapshot_repository;
mod player_profile_repository;

pub use leaderboard_snapshot_repository::{
    HistoryRotation, LeaderboardSnapshotRepository, RotationError, RotationReport, SnapshotSlot,
};
pub use player_profile_repository::PlayerProfileRepository;
