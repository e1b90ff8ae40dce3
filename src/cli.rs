use crate::api::{ResponseFormat, Sport};
use crate::parser::EntityKind;
use chrono::NaiveDate;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Parses a `key=value` filter argument.
fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// Yahoo! Fantasy Sports API client
///
/// Composes resource URLs, fetches them with OAuth2 credentials, and projects
/// the XML responses into flat JSON records.
#[derive(Parser, Debug)]
#[command(name = "yahoo_fantasy", version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Sport of the game (nba, nfl, mlb, nhl). Overrides the config file.
    #[arg(long, global = true, help_heading = "Game")]
    pub sport: Option<Sport>,

    /// Season, named by the year it starts in. Overrides the config file.
    #[arg(long, global = true, help_heading = "Game")]
    pub season: Option<u16>,

    /// Explicit numeric game key; takes precedence over sport and season.
    #[arg(long = "game", global = true, help_heading = "Game")]
    pub game_key: Option<u32>,

    /// Name stats in `standings` and `free-agents` after the game's own stat
    /// categories instead of the built-in table.
    #[arg(long = "game-stats", global = true, help_heading = "Game")]
    pub game_stats: bool,

    /// Response format for `fetch` (xml or json).
    #[arg(long, global = true, help_heading = "Request")]
    pub format: Option<ResponseFormat>,

    /// Path to the OAuth credentials JSON file.
    #[arg(long, global = true, help_heading = "Request")]
    pub credentials: Option<String>,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also write logs to stdout, at debug level.
    #[arg(long = "debug", global = true, help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", global = true, help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the URL of a resource without sending any request.
    Url {
        #[command(subcommand)]
        resource: UrlCommand,
    },
    /// Fetch a URL and print the raw body.
    Fetch { url: String },
    /// Project a saved XML response and print the records as JSON.
    Parse {
        /// game, leagues, stat-categories, league-standings,
        /// league-free-agents, player-stats or user-leagues
        kind: EntityKind,
        file: PathBuf,
        /// Game key to select leagues by (user-leagues only). Defaults to the
        /// session's game key.
        #[arg(long = "game-key")]
        for_game: Option<String>,
    },
    /// Fetch and print the standings of a league.
    Standings { league_id: u32 },
    /// Fetch and print one page of a league's free agents.
    FreeAgents {
        league_id: u32,
        /// Offset into the listing
        #[arg(long, default_value_t = 0)]
        start: u32,
        /// Number of consecutive pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Fetch and print the logged-in user's leagues in the current game.
    UserLeagues,
    /// Fetch and print the stat definitions of the current game.
    StatCategories,
    /// Run the first-time OAuth authorization and save the tokens.
    Authorize,
}

/// Resources addressable by the `url` command.
#[derive(Subcommand, Debug)]
pub enum UrlCommand {
    Game {
        #[arg(default_value = "metadata")]
        subresource: String,
        /// League or player keys, for the leagues and players sub-resources
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    Games {
        #[arg(default_value = "metadata")]
        subresource: String,
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        #[arg(long = "key")]
        keys: Vec<String>,
    },
    League {
        league_id: u32,
        #[arg(default_value = "metadata")]
        subresource: String,
    },
    Leagues {
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
        #[arg(default_value = "metadata")]
        subresource: String,
    },
    FreeAgents {
        league_id: u32,
        #[arg(long, default_value_t = 0)]
        start: u32,
    },
    Player {
        player_key: String,
        #[arg(default_value = "metadata")]
        subresource: String,
    },
    PlayerStats {
        league_id: u32,
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
    },
    Players {
        #[arg(long)]
        league: Option<u32>,
        #[arg(long = "leagues")]
        leagues: Vec<u32>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long = "teams")]
        teams: Vec<String>,
        #[arg(long = "key")]
        keys: Vec<String>,
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        subresource: Option<String>,
    },
    Roster {
        team_key: String,
        #[arg(default_value = "players")]
        subresource: String,
        /// Roster as of a date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Team {
        team_key: String,
        #[arg(default_value = "metadata")]
        subresource: String,
    },
    Teams {
        #[arg(long)]
        league: Option<u32>,
        #[arg(long = "key")]
        keys: Vec<String>,
        /// Teams of the logged-in user
        #[arg(long)]
        mine: bool,
        subresource: Option<String>,
    },
    Transaction {
        transaction_key: String,
        #[arg(default_value = "metadata")]
        subresource: String,
    },
    Transactions {
        league_id: u32,
        #[arg(default_value = "metadata")]
        subresource: String,
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    User {
        #[arg(default_value = "")]
        subresource: String,
    },
    Users {
        #[arg(default_value = "")]
        subresource: String,
    },
}

/// Commands that never touch the network or credentials.
pub fn is_offline_command(args: &Args) -> bool {
    matches!(
        args.command,
        None | Some(Command::Url { .. }) | Some(Command::Parse { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("sort=AR").unwrap(),
            ("sort".to_string(), "AR".to_string())
        );
        assert_eq!(
            parse_filter("date=2018-10-20").unwrap(),
            ("date".to_string(), "2018-10-20".to_string())
        );
        assert!(parse_filter("sort").is_err());
        assert!(parse_filter("=AR").is_err());
    }

    #[test]
    fn test_parse_url_command() {
        let args = Args::try_parse_from([
            "yahoo_fantasy",
            "--game",
            "385",
            "url",
            "players",
            "--league",
            "1",
            "--filter",
            "status=FA",
            "stats",
        ])
        .unwrap();
        assert_eq!(args.game_key, Some(385));
        assert!(is_offline_command(&args));
        match args.command {
            Some(Command::Url {
                resource:
                    UrlCommand::Players {
                        league,
                        filters,
                        subresource,
                        ..
                    },
            }) => {
                assert_eq!(league, Some(1));
                assert_eq!(filters, vec![("status".to_string(), "FA".to_string())]);
                assert_eq!(subresource.as_deref(), Some("stats"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_kind_and_format() {
        let args = Args::try_parse_from([
            "yahoo_fantasy",
            "--format",
            "json",
            "parse",
            "league-standings",
            "standings.xml",
        ])
        .unwrap();
        assert_eq!(args.format, Some(ResponseFormat::Json));
        assert!(matches!(
            args.command,
            Some(Command::Parse {
                kind: EntityKind::LeagueStandings,
                ..
            })
        ));

        assert!(Args::try_parse_from(["yahoo_fantasy", "--format", "yaml"]).is_err());
        assert!(Args::try_parse_from(["yahoo_fantasy", "parse", "teams", "x.xml"]).is_err());
    }

    #[test]
    fn test_network_commands_are_not_offline() {
        let args = Args::try_parse_from(["yahoo_fantasy", "standings", "12"]).unwrap();
        assert!(!is_offline_command(&args));
        assert!(!args.game_stats);

        let args =
            Args::try_parse_from(["yahoo_fantasy", "free-agents", "12", "--game-stats"]).unwrap();
        assert!(args.game_stats);
    }
}
