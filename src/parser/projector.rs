//! Projection of API XML documents into flat records.
//!
//! Every operation takes the raw response text, strips the default
//! namespace, parses it and walks the tree. Results are ordered by document
//! position. A required element missing anywhere fails the whole call; no
//! partial record list is ever returned.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use tracing::{debug, instrument, warn};

use crate::error::AppError;
use crate::parser::ParsedRecord;
use crate::parser::stats::StatCatalog;
use crate::parser::xml::{Element, XmlNode, strip_default_namespace};

/// Entity kinds the projector knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Game,
    Leagues,
    StatCategories,
    LeagueStandings,
    LeagueFreeAgents,
    PlayerStats,
    UserLeagues,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Game,
        EntityKind::Leagues,
        EntityKind::StatCategories,
        EntityKind::LeagueStandings,
        EntityKind::LeagueFreeAgents,
        EntityKind::PlayerStats,
        EntityKind::UserLeagues,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Game => "game",
            EntityKind::Leagues => "leagues",
            EntityKind::StatCategories => "stat_categories",
            EntityKind::LeagueStandings => "league_standings",
            EntityKind::LeagueFreeAgents => "league_free_agents",
            EntityKind::PlayerStats => "player_stats",
            EntityKind::UserLeagues => "user_leagues",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = EntityKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown entity kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Projects API documents into [`ParsedRecord`]s.
///
/// The last result of each entity kind is kept for inspection; it is never
/// consulted when parsing.
#[derive(Debug)]
pub struct Projector {
    catalog: StatCatalog,
    last: RwLock<HashMap<EntityKind, Vec<ParsedRecord>>>,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

impl Projector {
    /// A projector using the built-in stat catalog.
    pub fn new() -> Self {
        Self::with_catalog(StatCatalog::standard().clone())
    }

    pub fn with_catalog(catalog: StatCatalog) -> Self {
        Self {
            catalog,
            last: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &StatCatalog {
        &self.catalog
    }

    /// Replaces the stat catalog, e.g. with one built from a parsed
    /// `stat_categories` response.
    pub fn set_catalog(&mut self, catalog: StatCatalog) {
        self.catalog = catalog;
    }

    /// The most recent successful result for `kind`.
    pub fn last_parsed(&self, kind: EntityKind) -> Option<Vec<ParsedRecord>> {
        let cache = self.last.read().unwrap_or_else(|e| e.into_inner());
        cache.get(&kind).cloned()
    }

    /// Parses by kind name. `game_key` is only used for `UserLeagues`.
    pub fn project(
        &self,
        kind: EntityKind,
        content: &str,
        game_key: Option<&str>,
    ) -> Result<Vec<ParsedRecord>, AppError> {
        match kind {
            EntityKind::Game => self.game(content),
            EntityKind::Leagues => self.leagues(content),
            EntityKind::StatCategories => self.stat_categories(content),
            EntityKind::LeagueStandings => self.league_standings(content),
            EntityKind::LeagueFreeAgents => self.league_free_agents(content),
            EntityKind::PlayerStats => self.player_stats(content),
            EntityKind::UserLeagues => {
                let game_key = game_key.ok_or_else(|| {
                    AppError::config_error("user_leagues projection needs a game key")
                })?;
                self.user_leagues(content, game_key)
            }
        }
    }

    /// One record per `game` element.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn game(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let records = flat_records_of(&parse_document(content)?, "game");
        Ok(self.remember(EntityKind::Game, records))
    }

    /// One record per `league` element.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn leagues(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let records = flat_records_of(&parse_document(content)?, "league");
        Ok(self.remember(EntityKind::Leagues, records))
    }

    /// One record per element named `tag`, anywhere in the document.
    pub fn flat_records(&self, content: &str, tag: &str) -> Result<Vec<ParsedRecord>, AppError> {
        Ok(flat_records_of(&parse_document(content)?, tag))
    }

    /// One record per stat definition under `stat_categories/stats`.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn stat_categories(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let root = parse_document(content)?;
        let records = root
            .descendants_at("stat_categories/stats/stat")
            .into_iter()
            .map(flat_record)
            .collect();
        Ok(self.remember(EntityKind::StatCategories, records))
    }

    /// One record per team in `standings/teams`.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn league_standings(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let root = parse_document(content)?;
        let records = root
            .descendants_at("standings/teams/team")
            .into_iter()
            .map(|team| self.standings_record(team))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.remember(EntityKind::LeagueStandings, records))
    }

    /// One record per `player` element.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn league_free_agents(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let records = self.player_records(content)?;
        Ok(self.remember(EntityKind::LeagueFreeAgents, records))
    }

    /// Same shape as free agents; stat fields are usually present.
    #[instrument(skip(self, content), fields(len = content.len()))]
    pub fn player_stats(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let records = self.player_records(content)?;
        Ok(self.remember(EntityKind::PlayerStats, records))
    }

    /// Leagues nested under the `game` whose `game_key` equals `game_key`.
    #[instrument(skip(self, content, game_key), fields(len = content.len(), game_key = %game_key))]
    pub fn user_leagues(
        &self,
        content: &str,
        game_key: impl fmt::Display,
    ) -> Result<Vec<ParsedRecord>, AppError> {
        let wanted = game_key.to_string();
        let root = parse_document(content)?;

        let mut records = Vec::new();
        for game in root.descendants("game") {
            if required(game, "game", "game_key")? != wanted {
                continue;
            }
            records.extend(game.descendants("league").into_iter().map(flat_record));
        }
        if records.is_empty() {
            debug!("No leagues found for game key {wanted}");
        }
        Ok(self.remember(EntityKind::UserLeagues, records))
    }

    fn player_records(&self, content: &str) -> Result<Vec<ParsedRecord>, AppError> {
        let root = parse_document(content)?;
        root.descendants("player")
            .into_iter()
            .map(|player| self.player_record(player))
            .collect()
    }

    fn player_record<N: XmlNode>(&self, player: &N) -> Result<ParsedRecord, AppError> {
        let mut record = ParsedRecord::new();
        record.insert("player_key".into(), required(player, "player", "player_key")?);
        record.insert("player_name".into(), required(player, "player", "name/full")?);

        let positions = player
            .find("eligible_positions")
            .ok_or_else(|| AppError::missing_required_field("player/eligible_positions"))?;
        let joined = positions
            .children_named("position")
            .map(|p| p.text().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(", ");
        record.insert("eligible_positions".into(), joined);
        record.insert(
            "team".into(),
            required(player, "player", "editorial_team_abbr")?.to_uppercase(),
        );

        for stats in player.descendants("stats") {
            self.catalog.expand_into(stats, "", &mut record)?;
        }
        Ok(record)
    }

    fn standings_record<N: XmlNode>(&self, team: &N) -> Result<ParsedRecord, AppError> {
        let mut record = ParsedRecord::new();
        record.insert("team_key".into(), required(team, "team", "team_key")?);
        record.insert("team_name".into(), required(team, "team", "name")?);
        record.insert("rank".into(), required(team, "team", "team_standings/rank")?);
        record.insert(
            "points_for".into(),
            required(team, "team", "team_standings/points_for")?,
        );

        for stats in team.descendants_at("team_stats/stats") {
            self.catalog.expand_into(stats, "", &mut record)?;
        }
        for stats in team.descendants_at("team_points/stats") {
            self.catalog.expand_into(stats, "_pts", &mut record)?;
        }
        Ok(record)
    }

    fn remember(&self, kind: EntityKind, records: Vec<ParsedRecord>) -> Vec<ParsedRecord> {
        debug!("Projected {} {kind} records", records.len());
        match self.last.write() {
            Ok(mut cache) => {
                cache.insert(kind, records.clone());
            }
            Err(poisoned) => {
                warn!("Projector cache lock poisoned, resetting");
                let mut cache = poisoned.into_inner();
                cache.clear();
                cache.insert(kind, records.clone());
            }
        }
        records
    }
}

fn parse_document(content: &str) -> Result<Element, AppError> {
    Element::parse(&strip_default_namespace(content))
}

fn required<N: XmlNode>(node: &N, owner: &str, path: &str) -> Result<String, AppError> {
    node.find_text(path)
        .map(str::to_string)
        .ok_or_else(|| AppError::missing_required_field(format!("{owner}/{path}")))
}

fn flat_record<N: XmlNode>(node: &N) -> ParsedRecord {
    node.children()
        .map(|child| (child.tag().to_string(), child.text().unwrap_or("").to_string()))
        .collect()
}

fn flat_records_of(root: &Element, tag: &str) -> Vec<ParsedRecord> {
    let mut nodes = Vec::new();
    if root.tag() == tag {
        nodes.push(root);
    }
    nodes.extend(root.descendants(tag));
    nodes.into_iter().map(flat_record).collect()
}
