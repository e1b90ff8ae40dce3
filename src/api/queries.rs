//! Structured options for the router operations that take more than a key
//! and a sub-resource.

use crate::api::filters::FilterSet;
use crate::constants::free_agents;
use crate::error::AppError;

/// Semicolon parameters of a league free agent listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeAgentQuery {
    /// Offset into the listing; the API pages 25 players at a time
    pub start: u32,
    /// `A` (all available), `FA` (free agents), `W` (waivers), `T` (taken)
    pub status: String,
    /// `AR` (actual rank), `OR` (overall rank), or a stat id
    pub sort: String,
    /// `season`, `lastweek`, `lastmonth`, ...
    pub sort_type: String,
}

impl Default for FreeAgentQuery {
    fn default() -> Self {
        Self {
            start: 0,
            status: free_agents::STATUS.to_string(),
            sort: free_agents::SORT.to_string(),
            sort_type: free_agents::SORT_TYPE.to_string(),
        }
    }
}

impl FreeAgentQuery {
    pub fn starting_at(start: u32) -> Self {
        Self {
            start,
            ..Self::default()
        }
    }

    /// The same query one page further on.
    pub fn next_page(&self) -> Self {
        Self {
            start: self.start.saturating_add(free_agents::PAGE_SIZE),
            ..self.clone()
        }
    }
}

/// How a players collection request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayersAddress<'a> {
    League(u32),
    Leagues(&'a [u32]),
    Team(&'a str),
    Teams(&'a [String]),
    Players(&'a [String]),
}

const PLAYERS_MODES: &str = "league_id, league_ids, team_key, team_keys, player_keys";

/// Options for the players collection. Exactly one addressing option must be
/// set; empty key lists count as unset.
#[derive(Debug, Clone, Default)]
pub struct PlayersQuery {
    pub league_id: Option<u32>,
    pub league_ids: Vec<u32>,
    pub team_key: Option<String>,
    pub team_keys: Vec<String>,
    pub player_keys: Vec<String>,
    /// Defaults to `metadata`
    pub subresource: Option<String>,
    pub filters: Option<FilterSet>,
}

impl PlayersQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn league(mut self, league_id: u32) -> Self {
        self.league_id = Some(league_id);
        self
    }

    pub fn leagues(mut self, league_ids: impl IntoIterator<Item = u32>) -> Self {
        self.league_ids = league_ids.into_iter().collect();
        self
    }

    pub fn team(mut self, team_key: impl Into<String>) -> Self {
        self.team_key = Some(team_key.into());
        self
    }

    pub fn teams<S: Into<String>>(mut self, team_keys: impl IntoIterator<Item = S>) -> Self {
        self.team_keys = team_keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn players<S: Into<String>>(mut self, player_keys: impl IntoIterator<Item = S>) -> Self {
        self.player_keys = player_keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Resolves the single addressing mode.
    pub fn address(&self) -> Result<PlayersAddress<'_>, AppError> {
        let mut modes = Vec::with_capacity(1);
        if let Some(id) = self.league_id {
            modes.push(PlayersAddress::League(id));
        }
        if !self.league_ids.is_empty() {
            modes.push(PlayersAddress::Leagues(&self.league_ids));
        }
        if let Some(key) = self.team_key.as_deref() {
            modes.push(PlayersAddress::Team(key));
        }
        if !self.team_keys.is_empty() {
            modes.push(PlayersAddress::Teams(&self.team_keys));
        }
        if !self.player_keys.is_empty() {
            modes.push(PlayersAddress::Players(&self.player_keys));
        }
        match modes.as_slice() {
            [single] => Ok(*single),
            _ => Err(AppError::ambiguous_addressing(
                "players",
                PLAYERS_MODES,
                modes.len(),
            )),
        }
    }
}

/// How a teams collection request is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamsAddress<'a> {
    League(u32),
    Teams(&'a [String]),
    MyTeams,
}

const TEAMS_MODES: &str = "league_id, team_keys, my_team";

/// Options for the teams collection. Exactly one addressing option must be set.
#[derive(Debug, Clone, Default)]
pub struct TeamsQuery {
    pub league_id: Option<u32>,
    pub team_keys: Vec<String>,
    /// Teams of the logged in user
    pub my_team: bool,
    /// Defaults to `metadata`
    pub subresource: Option<String>,
}

impl TeamsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn league(mut self, league_id: u32) -> Self {
        self.league_id = Some(league_id);
        self
    }

    pub fn teams<S: Into<String>>(mut self, team_keys: impl IntoIterator<Item = S>) -> Self {
        self.team_keys = team_keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn my_team(mut self) -> Self {
        self.my_team = true;
        self
    }

    pub fn subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    /// Resolves the single addressing mode.
    pub fn address(&self) -> Result<TeamsAddress<'_>, AppError> {
        let mut modes = Vec::with_capacity(1);
        if let Some(id) = self.league_id {
            modes.push(TeamsAddress::League(id));
        }
        if !self.team_keys.is_empty() {
            modes.push(TeamsAddress::Teams(&self.team_keys));
        }
        if self.my_team {
            modes.push(TeamsAddress::MyTeams);
        }
        match modes.as_slice() {
            [single] => Ok(*single),
            _ => Err(AppError::ambiguous_addressing(
                "teams",
                TEAMS_MODES,
                modes.len(),
            )),
        }
    }
}
