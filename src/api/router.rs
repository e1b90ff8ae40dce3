//! URL composition for every resource and collection.
//!
//! All operations validate their input against the capability table in
//! [`crate::api::resources`] and return the full request URL. Nothing here
//! performs I/O; the URL is handed to a [`crate::api::Transport`].

use chrono::NaiveDate;
use tracing::debug;

use crate::api::filters::FilterSet;
use crate::api::keys::{GameKey, join_keys};
use crate::api::queries::{FreeAgentQuery, PlayersAddress, PlayersQuery, TeamsAddress, TeamsQuery};
use crate::api::resources::ResourceKind;
use crate::constants::FANTASY_API_BASE_URL;
use crate::error::AppError;

/// Default sub-resource of every resource except users and rosters
pub const DEFAULT_SUBRESOURCE: &str = "metadata";

/// Selector of the logged in user on the users collection
const USE_LOGIN: &str = "use_login=1";

/// Builds request URLs for one game (sport and season).
#[derive(Debug, Clone)]
pub struct ResourceRouter {
    base_url: String,
    game_key: GameKey,
}

impl ResourceRouter {
    pub fn new(game_key: GameKey) -> Self {
        Self::with_base_url(FANTASY_API_BASE_URL, game_key)
    }

    /// Router against a different API root, e.g. a mock server in tests.
    pub fn with_base_url(base_url: impl Into<String>, game_key: GameKey) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, game_key }
    }

    pub fn game_key(&self) -> GameKey {
        self.game_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{game_key}.l.{league_id}`
    pub fn league_key(&self, league_id: u32) -> String {
        self.game_key.league_key(league_id)
    }

    /// `league/{game_key}.l.{league_id}`
    fn league_path(&self, league_id: u32) -> String {
        ResourceKind::League.keyed(self.league_key(league_id))
    }

    fn url(&self, path: &str) -> String {
        let url = format!("{}/{path}", self.base_url);
        debug!("Built URL: {url}");
        url
    }

    /// Game resource. `leagues` and `players` need the keys to fetch.
    pub fn game<S: AsRef<str>>(&self, subresource: &str, keys: &[S]) -> Result<String, AppError> {
        let kind = ResourceKind::Game;
        kind.spec().validate_subresource(subresource)?;
        let tail = keyed_subresource(kind, subresource, keys)?;
        Ok(self.url(&format!("{}/{tail}", kind.keyed(self.game_key))))
    }

    /// Games collection. With filters the games are selected by the filters,
    /// otherwise by the session's game key.
    pub fn games<S: AsRef<str>>(
        &self,
        subresource: &str,
        filters: Option<&FilterSet>,
        keys: &[S],
    ) -> Result<String, AppError> {
        let kind = ResourceKind::Games;
        let spec = kind.spec();
        spec.validate_subresource(subresource)?;
        let selector = match filters.filter(|f| !f.is_empty()) {
            Some(filters) => {
                spec.validate_filters(filters.keys())?;
                filters.to_string()
            }
            None => format!("game_keys={}", self.game_key),
        };
        let tail = keyed_subresource(kind, subresource, keys)?;
        Ok(self.url(&format!("{}/{tail}", kind.selected(&selector))))
    }

    /// League resource.
    pub fn league(&self, league_id: u32, subresource: &str) -> Result<String, AppError> {
        ResourceKind::League.spec().validate_subresource(subresource)?;
        Ok(self.url(&format!("{}/{subresource}", self.league_path(league_id))))
    }

    /// Available players of a league, one page per call.
    pub fn league_free_agents(
        &self,
        league_id: u32,
        query: &FreeAgentQuery,
    ) -> Result<String, AppError> {
        let selector = format!(
            "status={};sort={};sort_type={};start={}",
            query.status, query.sort, query.sort_type, query.start
        );
        Ok(self.url(&format!(
            "{}/{}",
            self.league_path(league_id),
            ResourceKind::Players.selected(&selector)
        )))
    }

    /// Leagues collection, by full league key (e.g. `385.l.10000`).
    pub fn leagues<S: AsRef<str>>(
        &self,
        league_keys: &[S],
        subresource: &str,
    ) -> Result<String, AppError> {
        let kind = ResourceKind::Leagues;
        kind.spec().validate_subresource(subresource)?;
        require_keys(kind, subresource, league_keys)?;
        let leagues = kind.selected(&format!("league_keys={}", join_keys(league_keys)));
        Ok(self.url(&format!("{leagues}/{subresource}")))
    }

    /// Player resource, by full player key (`{game_key}.p.{player_id}`).
    pub fn player(&self, player_key: &str, subresource: &str) -> Result<String, AppError> {
        let kind = ResourceKind::Player;
        kind.spec().validate_subresource(subresource)?;
        Ok(self.url(&format!("{}/{subresource}", kind.keyed(player_key))))
    }

    /// Stats of the given players within a league.
    pub fn player_stats<S: AsRef<str>>(
        &self,
        league_id: u32,
        player_keys: &[S],
    ) -> Result<String, AppError> {
        let kind = ResourceKind::Players;
        require_keys(kind, "stats", player_keys)?;
        let players = kind.selected(&format!("player_keys={}", join_keys(player_keys)));
        Ok(self.url(&format!(
            "{}/{players}/stats",
            self.league_path(league_id)
        )))
    }

    /// Players collection, addressed by exactly one of league, leagues, team,
    /// teams or explicit player keys.
    pub fn players(&self, query: &PlayersQuery) -> Result<String, AppError> {
        let kind = ResourceKind::Players;
        let spec = kind.spec();
        let subresource = query.subresource.as_deref().unwrap_or(DEFAULT_SUBRESOURCE);
        spec.validate_subresource(subresource)?;

        let filters = match query.filters.as_ref().filter(|f| !f.is_empty()) {
            Some(filters) => {
                spec.validate_filters(filters.keys())?;
                filters.to_string()
            }
            None => String::new(),
        };
        let players = kind.selected(&filters);

        let path = match query.address()? {
            PlayersAddress::League(league_id) => {
                format!("{}/{players}/{subresource}", self.league_path(league_id))
            }
            PlayersAddress::Leagues(league_ids) => {
                let league_keys: Vec<String> =
                    league_ids.iter().map(|id| self.league_key(*id)).collect();
                let leagues = ResourceKind::Leagues
                    .selected(&format!("league_keys={}", join_keys(&league_keys)));
                format!("{leagues}/{players}/{subresource}")
            }
            PlayersAddress::Team(team_key) => format!(
                "{}/{players}/{subresource}",
                ResourceKind::Team.keyed(team_key)
            ),
            PlayersAddress::Teams(team_keys) => {
                let teams =
                    ResourceKind::Teams.selected(&format!("team_keys={}", join_keys(team_keys)));
                format!("{teams}/{players}/{subresource}")
            }
            PlayersAddress::Players(player_keys) => {
                let mut selector = format!("player_keys={}", join_keys(player_keys));
                if !filters.is_empty() {
                    selector.push(';');
                    selector.push_str(&filters);
                }
                format!("{}/{subresource}", kind.selected(&selector))
            }
        };
        Ok(self.url(&path))
    }

    /// Team roster, optionally as of a date.
    pub fn roster(
        &self,
        team_key: &str,
        subresource: &str,
        date: Option<NaiveDate>,
    ) -> Result<String, AppError> {
        let kind = ResourceKind::Roster;
        kind.spec().validate_subresource(subresource)?;
        let date = date
            .map(|date| format!("date={}", date.format("%Y-%m-%d")))
            .unwrap_or_default();
        Ok(self.url(&format!(
            "{}/{}/{subresource}",
            ResourceKind::Team.keyed(team_key),
            kind.selected(&date)
        )))
    }

    /// Team resource, by full team key.
    pub fn team(&self, team_key: &str, subresource: &str) -> Result<String, AppError> {
        let kind = ResourceKind::Team;
        kind.spec().validate_subresource(subresource)?;
        Ok(self.url(&format!("{}/{subresource}", kind.keyed(team_key))))
    }

    /// Teams collection, addressed by exactly one of league, team keys or the
    /// logged in user.
    pub fn teams(&self, query: &TeamsQuery) -> Result<String, AppError> {
        let kind = ResourceKind::Teams;
        let subresource = query.subresource.as_deref().unwrap_or(DEFAULT_SUBRESOURCE);
        kind.spec().validate_subresource(subresource)?;

        let path = match query.address()? {
            TeamsAddress::League(league_id) => format!(
                "{}/{}/{subresource}",
                self.league_path(league_id),
                kind.segment()
            ),
            TeamsAddress::Teams(team_keys) => format!(
                "{}/{subresource}",
                kind.selected(&format!("team_keys={}", join_keys(team_keys)))
            ),
            TeamsAddress::MyTeams => format!(
                "{}/{}/{subresource}",
                ResourceKind::Users.selected(USE_LOGIN),
                kind.segment()
            ),
        };
        Ok(self.url(&path))
    }

    /// Transaction resource, by full transaction key.
    pub fn transaction(&self, transaction_key: &str, subresource: &str) -> Result<String, AppError> {
        let kind = ResourceKind::Transaction;
        kind.spec().validate_subresource(subresource)?;
        Ok(self.url(&format!("{}/{subresource}", kind.keyed(transaction_key))))
    }

    /// Transactions collection of a league.
    pub fn transactions(
        &self,
        league_id: u32,
        subresource: &str,
        filters: Option<&FilterSet>,
    ) -> Result<String, AppError> {
        let kind = ResourceKind::Transactions;
        let spec = kind.spec();
        spec.validate_subresource(subresource)?;
        let selector = match filters.filter(|f| !f.is_empty()) {
            Some(filters) => {
                spec.validate_filters(filters.keys())?;
                filters.to_string()
            }
            None => String::new(),
        };
        Ok(self.url(&format!(
            "{}/{}/{subresource}",
            self.league_path(league_id),
            kind.selected(&selector)
        )))
    }

    /// The logged in user within the session's game. An empty sub-resource
    /// addresses the bare resource.
    pub fn user(&self, subresource: &str) -> Result<String, AppError> {
        let kind = ResourceKind::User;
        kind.spec().validate_subresource(subresource)?;
        let base = format!(
            "{}/{}",
            kind.selected(USE_LOGIN),
            ResourceKind::Games.selected(&format!("game_keys={}", self.game_key))
        );
        Ok(self.url(&append_subresource(base, subresource)))
    }

    /// Users collection of the logged in user. An empty sub-resource addresses
    /// the bare collection.
    pub fn users(&self, subresource: &str) -> Result<String, AppError> {
        let kind = ResourceKind::Users;
        kind.spec().validate_subresource(subresource)?;
        Ok(self.url(&append_subresource(kind.selected(USE_LOGIN), subresource)))
    }
}

fn append_subresource(mut path: String, subresource: &str) -> String {
    if !subresource.is_empty() {
        path.push('/');
        path.push_str(subresource);
    }
    path
}

fn require_keys<S: AsRef<str>>(
    kind: ResourceKind,
    subresource: &str,
    keys: &[S],
) -> Result<(), AppError> {
    if keys.is_empty() {
        Err(AppError::missing_keys(kind.name(), subresource))
    } else {
        Ok(())
    }
}

/// Final segment under a game: `leagues` and `players` are selected by key.
fn keyed_subresource<S: AsRef<str>>(
    kind: ResourceKind,
    subresource: &str,
    keys: &[S],
) -> Result<String, AppError> {
    let key_param = match subresource {
        "leagues" => "league_keys",
        "players" => "player_keys",
        _ => return Ok(subresource.to_string()),
    };
    require_keys(kind, subresource, keys)?;
    Ok(format!("{subresource};{key_param}={}", join_keys(keys)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

    fn router() -> ResourceRouter {
        ResourceRouter::new(GameKey::new(385))
    }

    const NO_KEYS: &[&str] = &[];

    #[test]
    fn test_game_metadata() {
        assert_eq!(
            router().game("metadata", NO_KEYS).unwrap(),
            format!("{BASE}/game/385/metadata")
        );
    }

    #[test]
    fn test_game_leagues_needs_keys() {
        let err = router().game("leagues", NO_KEYS).unwrap_err();
        assert!(matches!(err, AppError::MissingKeys { resource: "game", .. }));

        assert_eq!(
            router()
                .game("leagues", &["385.l.1", "385.l.2"])
                .unwrap(),
            format!("{BASE}/game/385/leagues;league_keys=385.l.1,385.l.2")
        );
    }

    #[test]
    fn test_game_rejects_games_only_subresource() {
        let err = router().game("teams", NO_KEYS).unwrap_err();
        assert!(matches!(err, AppError::InvalidSubresource { resource: "game", .. }));
    }

    #[test]
    fn test_games_by_game_key_and_by_filters() {
        assert_eq!(
            router().games("teams", None, NO_KEYS).unwrap(),
            format!("{BASE}/games;game_keys=385/teams")
        );

        let filters =
            FilterSet::new(ResourceKind::Games, [("seasons", "2018"), ("game_codes", "nba")])
                .unwrap();
        assert_eq!(
            router().games("metadata", Some(&filters), NO_KEYS).unwrap(),
            format!("{BASE}/games;game_codes=nba,seasons=2018/metadata")
        );
    }

    #[test]
    fn test_games_players_by_key() {
        assert_eq!(
            router().games("players", None, &["385.p.1"]).unwrap(),
            format!("{BASE}/games;game_keys=385/players;player_keys=385.p.1")
        );
    }

    #[test]
    fn test_games_rejects_filter_set_of_other_collection() {
        let filters = FilterSet::new(ResourceKind::Players, [("status", "A")]).unwrap();
        let err = router()
            .games("metadata", Some(&filters), NO_KEYS)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter { resource: "games", .. }));
    }

    #[test]
    fn test_league_and_subresources() {
        assert_eq!(
            router().league(49127, "standings").unwrap(),
            format!("{BASE}/league/385.l.49127/standings")
        );
        assert!(router().league(49127, "roster").is_err());
    }

    #[test]
    fn test_league_free_agents_default_query() {
        assert_eq!(
            router()
                .league_free_agents(49127, &FreeAgentQuery::default())
                .unwrap(),
            format!("{BASE}/league/385.l.49127/players;status=A;sort=AR;sort_type=lastmonth;start=0")
        );
    }

    #[test]
    fn test_leagues_collection() {
        assert_eq!(
            router()
                .leagues(&["385.l.1", "385.l.1"], "settings")
                .unwrap(),
            format!("{BASE}/leagues;league_keys=385.l.1,385.l.1/settings")
        );
        assert!(router().leagues(NO_KEYS, "settings").is_err());
    }

    #[test]
    fn test_player_stats() {
        assert_eq!(
            router().player_stats(49127, &["385.p.3704", "385.p.5007"]).unwrap(),
            format!("{BASE}/league/385.l.49127/players;player_keys=385.p.3704,385.p.5007/stats")
        );
    }

    #[test]
    fn test_players_by_each_mode() {
        let r = router();
        assert_eq!(
            r.players(&PlayersQuery::new().league(1)).unwrap(),
            format!("{BASE}/league/385.l.1/players/metadata")
        );
        assert_eq!(
            r.players(&PlayersQuery::new().leagues([1, 2])).unwrap(),
            format!("{BASE}/leagues;league_keys=385.l.1,385.l.2/players/metadata")
        );
        assert_eq!(
            r.players(&PlayersQuery::new().team("385.l.1.t.4").subresource("stats"))
                .unwrap(),
            format!("{BASE}/team/385.l.1.t.4/players/stats")
        );
        assert_eq!(
            r.players(&PlayersQuery::new().teams(["385.l.1.t.4", "385.l.1.t.5"]))
                .unwrap(),
            format!("{BASE}/teams;team_keys=385.l.1.t.4,385.l.1.t.5/players/metadata")
        );
        assert_eq!(
            r.players(&PlayersQuery::new().players(["385.p.1"])).unwrap(),
            format!("{BASE}/players;player_keys=385.p.1/metadata")
        );
    }

    #[test]
    fn test_players_with_filters() {
        let filters =
            FilterSet::new(ResourceKind::Players, [("status", "FA"), ("position", "C")]).unwrap();
        let query = PlayersQuery::new()
            .league(1)
            .subresource("percent_owned")
            .filters(filters);
        assert_eq!(
            router().players(&query).unwrap(),
            format!("{BASE}/league/385.l.1/players;position=C,status=FA/percent_owned")
        );
    }

    #[test]
    fn test_players_validates_before_addressing() {
        let query = PlayersQuery::new().subresource("roster");
        assert!(matches!(
            router().players(&query).unwrap_err(),
            AppError::InvalidSubresource { .. }
        ));
    }

    #[test]
    fn test_roster_with_and_without_date() {
        let r = router();
        assert_eq!(
            r.roster("385.l.1.t.2", "players", None).unwrap(),
            format!("{BASE}/team/385.l.1.t.2/roster/players")
        );
        let date = NaiveDate::from_ymd_opt(2018, 11, 3).unwrap();
        assert_eq!(
            r.roster("385.l.1.t.2", "players", Some(date)).unwrap(),
            format!("{BASE}/team/385.l.1.t.2/roster;date=2018-11-03/players")
        );
        assert!(r.roster("385.l.1.t.2", "metadata", None).is_err());
    }

    #[test]
    fn test_team_and_teams() {
        let r = router();
        assert_eq!(
            r.team("385.l.1.t.2", "matchups").unwrap(),
            format!("{BASE}/team/385.l.1.t.2/matchups")
        );
        assert_eq!(
            r.teams(&TeamsQuery::new().league(1).subresource("standings"))
                .unwrap(),
            format!("{BASE}/league/385.l.1/teams/standings")
        );
        assert_eq!(
            r.teams(&TeamsQuery::new().teams(["385.l.1.t.2"])).unwrap(),
            format!("{BASE}/teams;team_keys=385.l.1.t.2/metadata")
        );
        assert_eq!(
            r.teams(&TeamsQuery::new().my_team()).unwrap(),
            format!("{BASE}/users;use_login=1/teams/metadata")
        );
    }

    #[test]
    fn test_transactions_with_filters() {
        let filters =
            FilterSet::new(ResourceKind::Transactions, [("type", "add"), ("count", "5")]).unwrap();
        assert_eq!(
            router()
                .transactions(49127, "players", Some(&filters))
                .unwrap(),
            format!("{BASE}/league/385.l.49127/transactions;count=5,type=add/players")
        );
        assert_eq!(
            router().transactions(49127, "metadata", None).unwrap(),
            format!("{BASE}/league/385.l.49127/transactions/metadata")
        );
        assert_eq!(
            router().transaction("385.l.49127.tr.26", "players").unwrap(),
            format!("{BASE}/transaction/385.l.49127.tr.26/players")
        );
    }

    #[test]
    fn test_user_and_users_bare_resource() {
        let r = router();
        assert_eq!(
            r.user("leagues").unwrap(),
            format!("{BASE}/users;use_login=1/games;game_keys=385/leagues")
        );
        assert_eq!(
            r.user("").unwrap(),
            format!("{BASE}/users;use_login=1/games;game_keys=385")
        );
        assert_eq!(r.users("").unwrap(), format!("{BASE}/users;use_login=1"));
        assert_eq!(
            r.users("games").unwrap(),
            format!("{BASE}/users;use_login=1/games")
        );
        assert!(r.users("metadata").is_err());
    }

    #[test]
    fn test_custom_base_url_is_trimmed() {
        let r = ResourceRouter::with_base_url("http://localhost:8080/", GameKey::new(375));
        assert_eq!(
            r.league(5, "metadata").unwrap(),
            "http://localhost:8080/league/375.l.5/metadata"
        );
    }
}
