//! Capability table for every API resource and collection.
//!
//! Each [`ResourceKind`] maps to one static [`ResourceSpec`] holding the
//! sub-resources it accepts, the filters it accepts and its URL segment.
//! The router validates every request against this table before a URL is
//! composed.

use std::fmt;

use tracing::debug;

use crate::error::AppError;

/// Resources and collections exposed by the fantasy sports API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Game,
    Games,
    League,
    Leagues,
    Player,
    Players,
    Roster,
    Team,
    Teams,
    Transaction,
    Transactions,
    User,
    Users,
}

/// Static definition of one resource kind.
#[derive(Debug)]
pub struct ResourceSpec {
    /// Name used in error messages and logs
    pub name: &'static str,
    /// Path segment, e.g. `league` or `leagues`
    pub segment: &'static str,
    /// Valid sub-resources in documentation order, each with its meaning
    pub subresources: &'static [(&'static str, &'static str)],
    /// Valid filter keys
    pub filters: &'static [&'static str],
}

const GAME_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic game information"),
    ("leagues", "leagues of this game, by league key"),
    ("players", "players of this game, by player key"),
    ("game_weeks", "start and end dates of each week"),
    ("stat_categories", "stats tracked for this game"),
    ("position_types", "position types, e.g. batters and pitchers"),
    ("roster_positions", "roster positions used by this game"),
];

const GAMES_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic game information"),
    ("leagues", "leagues of these games, by league key"),
    ("players", "players of these games, by player key"),
    ("game_weeks", "start and end dates of each week"),
    ("stat_categories", "stats tracked for these games"),
    ("position_types", "position types, e.g. batters and pitchers"),
    ("roster_positions", "roster positions used by these games"),
    ("teams", "teams of the logged in user"),
];

const LEAGUE_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic league information"),
    ("settings", "draft, scoring and roster settings"),
    ("standings", "ranks, points and stats of each team"),
    ("scoreboard", "matchups for the current week"),
    ("teams", "all teams in the league"),
    ("players", "players in the league, filterable"),
    ("draftresults", "draft picks"),
    ("transactions", "adds, drops and trades"),
];

const PLAYER_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic player information"),
    ("stats", "player stats"),
    ("ownership", "ownership status within a league"),
    ("percent_owned", "percentage of leagues owning the player"),
    ("draft_analysis", "average draft pick and cost"),
];

const ROSTER_SUBRESOURCES: &[(&str, &str)] = &[("players", "players on the roster")];

const TEAM_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic team information"),
    ("stats", "team stats"),
    ("standings", "team rank and points"),
    ("roster", "players on the team roster"),
    ("draftresults", "draft picks of the team"),
    ("matchups", "head to head matchups"),
];

const TRANSACTION_SUBRESOURCES: &[(&str, &str)] = &[
    ("metadata", "basic transaction information"),
    ("players", "players involved in the transaction"),
];

// "" is the bare users resource
const USER_SUBRESOURCES: &[(&str, &str)] = &[
    ("", "the logged in user"),
    ("games", "games the user has played"),
    ("leagues", "leagues the user belongs to"),
    ("teams", "teams the user manages"),
];

const GAMES_FILTERS: &[&str] = &["is_available", "game_types", "game_codes", "seasons"];

// For football, sort_week replaces sort_date
const PLAYERS_FILTERS: &[&str] = &[
    "position",
    "status",
    "search",
    "sort",
    "sort_type",
    "sort_season",
    "sort_date",
    "sort_week",
    "start",
    "count",
];

const TRANSACTIONS_FILTERS: &[&str] = &["type", "types", "team_key", "count"];

const NO_FILTERS: &[&str] = &[];

static GAME: ResourceSpec = ResourceSpec {
    name: "game",
    segment: "game",
    subresources: GAME_SUBRESOURCES,
    filters: NO_FILTERS,
};

static GAMES: ResourceSpec = ResourceSpec {
    name: "games",
    segment: "games",
    subresources: GAMES_SUBRESOURCES,
    filters: GAMES_FILTERS,
};

static LEAGUE: ResourceSpec = ResourceSpec {
    name: "league",
    segment: "league",
    subresources: LEAGUE_SUBRESOURCES,
    filters: NO_FILTERS,
};

static LEAGUES: ResourceSpec = ResourceSpec {
    name: "leagues",
    segment: "leagues",
    subresources: LEAGUE_SUBRESOURCES,
    filters: NO_FILTERS,
};

static PLAYER: ResourceSpec = ResourceSpec {
    name: "player",
    segment: "player",
    subresources: PLAYER_SUBRESOURCES,
    filters: NO_FILTERS,
};

static PLAYERS: ResourceSpec = ResourceSpec {
    name: "players",
    segment: "players",
    subresources: PLAYER_SUBRESOURCES,
    filters: PLAYERS_FILTERS,
};

static ROSTER: ResourceSpec = ResourceSpec {
    name: "roster",
    segment: "roster",
    subresources: ROSTER_SUBRESOURCES,
    filters: NO_FILTERS,
};

static TEAM: ResourceSpec = ResourceSpec {
    name: "team",
    segment: "team",
    subresources: TEAM_SUBRESOURCES,
    filters: NO_FILTERS,
};

static TEAMS: ResourceSpec = ResourceSpec {
    name: "teams",
    segment: "teams",
    subresources: TEAM_SUBRESOURCES,
    filters: NO_FILTERS,
};

static TRANSACTION: ResourceSpec = ResourceSpec {
    name: "transaction",
    segment: "transaction",
    subresources: TRANSACTION_SUBRESOURCES,
    filters: TRANSACTIONS_FILTERS,
};

static TRANSACTIONS: ResourceSpec = ResourceSpec {
    name: "transactions",
    segment: "transactions",
    subresources: TRANSACTION_SUBRESOURCES,
    filters: TRANSACTIONS_FILTERS,
};

// The API has no singular user path; both address the users collection.
static USER: ResourceSpec = ResourceSpec {
    name: "user",
    segment: "users",
    subresources: USER_SUBRESOURCES,
    filters: NO_FILTERS,
};

static USERS: ResourceSpec = ResourceSpec {
    name: "users",
    segment: "users",
    subresources: USER_SUBRESOURCES,
    filters: NO_FILTERS,
};

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Game,
        ResourceKind::Games,
        ResourceKind::League,
        ResourceKind::Leagues,
        ResourceKind::Player,
        ResourceKind::Players,
        ResourceKind::Roster,
        ResourceKind::Team,
        ResourceKind::Teams,
        ResourceKind::Transaction,
        ResourceKind::Transactions,
        ResourceKind::User,
        ResourceKind::Users,
    ];

    /// Static capability entry for this kind.
    pub fn spec(self) -> &'static ResourceSpec {
        match self {
            ResourceKind::Game => &GAME,
            ResourceKind::Games => &GAMES,
            ResourceKind::League => &LEAGUE,
            ResourceKind::Leagues => &LEAGUES,
            ResourceKind::Player => &PLAYER,
            ResourceKind::Players => &PLAYERS,
            ResourceKind::Roster => &ROSTER,
            ResourceKind::Team => &TEAM,
            ResourceKind::Teams => &TEAMS,
            ResourceKind::Transaction => &TRANSACTION,
            ResourceKind::Transactions => &TRANSACTIONS,
            ResourceKind::User => &USER,
            ResourceKind::Users => &USERS,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn segment(self) -> &'static str {
        self.spec().segment
    }

    /// `{segment}/{key}`, a single resource addressed by its key.
    pub fn keyed(self, key: impl fmt::Display) -> String {
        format!("{}/{key}", self.segment())
    }

    /// `{segment};{selector}`, or the bare segment when `selector` is empty.
    pub fn selected(self, selector: &str) -> String {
        if selector.is_empty() {
            self.segment().to_string()
        } else {
            format!("{};{selector}", self.segment())
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AppError::config_error(format!("Unknown resource '{s}'")))
    }
}

impl ResourceSpec {
    pub fn supports_filter(&self, filter: &str) -> bool {
        self.filters.contains(&filter)
    }

    /// Meaning of a sub-resource, if this resource has it.
    pub fn describe(&self, subresource: &str) -> Option<&'static str> {
        self.subresources
            .iter()
            .find(|(name, _)| *name == subresource)
            .map(|(_, meaning)| *meaning)
    }

    pub fn subresource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.subresources.iter().map(|(name, _)| *name)
    }

    /// Fails with `InvalidSubresource` unless the sub-resource is in the table.
    pub fn validate_subresource(&self, subresource: &str) -> Result<(), AppError> {
        match self.describe(subresource) {
            Some(meaning) => {
                debug!("{} sub-resource '{subresource}': {meaning}", self.name);
                Ok(())
            }
            None => Err(AppError::invalid_subresource(self.name, subresource)),
        }
    }

    /// Fails with `InvalidFilter` on the first key outside the whitelist.
    pub fn validate_filters<'a, I>(&self, keys: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            if !self.supports_filter(key) {
                return Err(AppError::invalid_filter(self.name, key));
            }
        }
        Ok(())
    }
}
