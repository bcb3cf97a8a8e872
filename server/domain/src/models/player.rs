use serde::{Deserialize, Serialize};

use super::ConnectCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectCodeField {
    pub code: ConnectCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterUsage {
    pub character: String,
    pub game_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedNetplayProfile {
    pub rating_ordinal: f64,
    #[serde(default)]
    pub rating_update_count: Option<u32>,
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
    #[serde(default)]
    pub daily_global_placement: Option<u32>,
    #[serde(default)]
    pub daily_regional_placement: Option<u32>,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub characters: Vec<CharacterUsage>,
}

impl RankedNetplayProfile {
    pub fn games_played(&self) -> u32 {
        self.wins
            .unwrap_or(0)
            .saturating_add(self.losses.unwrap_or(0))
    }

    /// Whether the rating can be ordered against other ratings.
    pub fn is_well_formed(&self) -> bool {
        self.rating_ordinal.is_finite()
    }
}

/// One player's entry in a leaderboard snapshot.
///
/// The field layout is the one the leaderboard front-end reads, so records
/// serialize in camelCase and carry no rank; ranks are derived from position
/// (see [`crate::ranking`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub display_name: String,
    pub connect_code: ConnectCodeField,
    pub ranked_netplay_profile: RankedNetplayProfile,
}

impl PlayerRecord {
    pub fn code(&self) -> &ConnectCode {
        &self.connect_code.code
    }

    pub fn rating(&self) -> f64 {
        self.ranked_netplay_profile.rating_ordinal
    }

    pub fn games_played(&self) -> u32 {
        self.ranked_netplay_profile.games_played()
    }

    pub fn has_played(&self) -> bool {
        self.games_played() > 0
    }

    /// Characters ordered by how often they were played, most played first.
    pub fn characters_by_game_count(&self) -> Vec<&CharacterUsage> {
        let mut characters = self
            .ranked_netplay_profile
            .characters
            .iter()
            .collect::<Vec<_>>();
        characters.sort_by(|a, b| b.game_count.cmp(&a.game_count));
        characters
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub fn player(code: &str, rating: f64, wins: u32, losses: u32) -> PlayerRecord {
        PlayerRecord {
            display_name: code.split('#').next().unwrap_or_default().to_lowercase(),
            connect_code: ConnectCodeField {
                code: ConnectCode::parse(code).unwrap(),
            },
            ranked_netplay_profile: RankedNetplayProfile {
                rating_ordinal: rating,
                rating_update_count: Some(wins + losses),
                wins: Some(wins),
                losses: Some(losses),
                daily_global_placement: None,
                daily_regional_placement: None,
                continent: Some("NORTH_AMERICA".to_owned()),
                characters: vec![
                    CharacterUsage {
                        character: "FOX".to_owned(),
                        game_count: wins,
                    },
                    CharacterUsage {
                        character: "FALCO".to_owned(),
                        game_count: losses,
                    },
                ],
            },
        }
    }
}
