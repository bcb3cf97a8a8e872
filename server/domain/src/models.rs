mod connect_code;
mod fetch_outcome;
mod player;
mod snapshot;

pub use connect_code::{ConnectCode, InvalidConnectCode};
pub use fetch_outcome::{FetchError, FetchOutcome, FetchOutcomes, ProfileEnvelope, ProfiledUser};
pub use player::{CharacterUsage, ConnectCodeField, PlayerRecord, RankedNetplayProfile};
pub use snapshot::Snapshot;

#[cfg(test)]
pub(crate) use player::test_fixtures;
