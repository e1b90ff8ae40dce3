//! Game keys and the composite resource keys built from them.
//!
//! Every league, team and player key is prefixed with the numeric key of the
//! game (sport and season) it belongs to, e.g. `385.l.12345`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

/// Sports with a fantasy game on the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Nhl,
}

impl Sport {
    pub fn code(self) -> &'static str {
        match self {
            Sport::Nba => "nba",
            Sport::Nfl => "nfl",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Sport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nba" => Ok(Sport::Nba),
            "nfl" => Ok(Sport::Nfl),
            "mlb" => Ok(Sport::Mlb),
            "nhl" => Ok(Sport::Nhl),
            other => Err(AppError::config_error(format!("Unknown sport '{other}'"))),
        }
    }
}

/// Known (sport, season) -> game key pairs. A season is named by the year it
/// starts in, so the 2017-18 NBA season is 2017.
const GAME_KEYS: &[(Sport, u16, u32)] = &[
    (Sport::Nba, 2017, 375),
    (Sport::Nba, 2018, 385),
    (Sport::Nfl, 2018, 380),
];

/// Numeric key identifying one sport's game for one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameKey(u32);

impl GameKey {
    pub const fn new(key: u32) -> Self {
        GameKey(key)
    }

    /// Looks the game key up in the static table. Unknown pairs are an error,
    /// never a default.
    pub fn resolve(sport: Sport, season: u16) -> Result<Self, AppError> {
        let key = GAME_KEYS
            .iter()
            .find(|(s, year, _)| *s == sport && *year == season)
            .map(|(_, _, key)| GameKey(*key))
            .ok_or_else(|| AppError::unknown_game_key(sport.code(), season))?;
        debug!("Resolved game key {key} for {sport} {season}");
        Ok(key)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// `{game_key}.l.{league_id}`
    pub fn league_key(self, league_id: u32) -> String {
        format!("{}.l.{league_id}", self.0)
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Joins keys with commas. Duplicates are kept.
pub fn join_keys<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}
