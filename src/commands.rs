use crate::api::http_client::create_http_client_with_timeout;
use crate::api::{
    FantasyClient, FilterSet, FreeAgentQuery, PlayersQuery, ReqwestTransport, ResourceKind,
    ResourceRouter, TeamsQuery,
};
use crate::auth::FileCredentials;
use crate::cli::{Args, UrlCommand};
use crate::config::Config;
use crate::config::user_prompts::prompt_for_verifier_code;
use crate::error::AppError;
use crate::parser::{EntityKind, ParsedRecord, Projector};
use std::path::Path;
use tracing::{debug, info};

pub type LiveClient = FantasyClient<ReqwestTransport, FileCredentials>;

/// Effective configuration: config file and environment, then command-line
/// overrides.
pub async fn load_config(args: &Args) -> Result<Config, AppError> {
    let mut config = Config::load().await?;
    if let Some(sport) = args.sport {
        config.sport = sport;
    }
    if let Some(season) = args.season {
        config.season = season;
    }
    if let Some(game_key) = args.game_key {
        config.game_key = Some(game_key);
    }
    if let Some(format) = args.format {
        config.response_format = format;
    }
    if let Some(credentials) = &args.credentials {
        config.credentials_path = Some(credentials.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Handles the --list-config command.
pub async fn handle_list_config() -> Result<(), AppError> {
    Config::display().await
}

pub fn router_for(config: &Config) -> Result<ResourceRouter, AppError> {
    Ok(ResourceRouter::with_base_url(
        config.api_base_url.clone(),
        config.resolve_game_key()?,
    ))
}

/// Composes the URL for a `url` subcommand. No I/O.
pub fn build_url(router: &ResourceRouter, command: &UrlCommand) -> Result<String, AppError> {
    match command {
        UrlCommand::Game { subresource, keys } => router.game(subresource, keys),
        UrlCommand::Games {
            subresource,
            filters,
            keys,
        } => {
            let filters = FilterSet::new(ResourceKind::Games, filters.iter().cloned())?;
            router.games(subresource, Some(&filters), keys)
        }
        UrlCommand::League {
            league_id,
            subresource,
        } => router.league(*league_id, subresource),
        UrlCommand::Leagues { keys, subresource } => router.leagues(keys, subresource),
        UrlCommand::FreeAgents { league_id, start } => {
            router.league_free_agents(*league_id, &FreeAgentQuery::starting_at(*start))
        }
        UrlCommand::Player {
            player_key,
            subresource,
        } => router.player(player_key, subresource),
        UrlCommand::PlayerStats { league_id, keys } => router.player_stats(*league_id, keys),
        UrlCommand::Players {
            league,
            leagues,
            team,
            teams,
            keys,
            filters,
            subresource,
        } => {
            let mut query = PlayersQuery::new()
                .leagues(leagues.iter().copied())
                .teams(teams.iter().cloned())
                .players(keys.iter().cloned());
            if let Some(league) = league {
                query = query.league(*league);
            }
            if let Some(team) = team {
                query = query.team(team.clone());
            }
            if let Some(subresource) = subresource {
                query = query.subresource(subresource.clone());
            }
            if !filters.is_empty() {
                query = query.filters(FilterSet::new(
                    ResourceKind::Players,
                    filters.iter().cloned(),
                )?);
            }
            router.players(&query)
        }
        UrlCommand::Roster {
            team_key,
            subresource,
            date,
        } => router.roster(team_key, subresource, *date),
        UrlCommand::Team {
            team_key,
            subresource,
        } => router.team(team_key, subresource),
        UrlCommand::Teams {
            league,
            keys,
            mine,
            subresource,
        } => {
            let mut query = TeamsQuery::new().teams(keys.iter().cloned());
            if let Some(league) = league {
                query = query.league(*league);
            }
            if *mine {
                query = query.my_team();
            }
            if let Some(subresource) = subresource {
                query = query.subresource(subresource.clone());
            }
            router.teams(&query)
        }
        UrlCommand::Transaction {
            transaction_key,
            subresource,
        } => router.transaction(transaction_key, subresource),
        UrlCommand::Transactions {
            league_id,
            subresource,
            filters,
        } => {
            let filters = FilterSet::new(ResourceKind::Transactions, filters.iter().cloned())?;
            router.transactions(*league_id, subresource, Some(&filters))
        }
        UrlCommand::User { subresource } => router.user(subresource),
        UrlCommand::Users { subresource } => router.users(subresource),
    }
}

/// Projects a saved XML document. `for_game` selects leagues for
/// `user-leagues`; the session's game key is used when it is absent.
pub async fn handle_parse(
    config: &Config,
    kind: EntityKind,
    file: &Path,
    for_game: Option<&str>,
) -> Result<(), AppError> {
    let content = tokio::fs::read_to_string(file).await?;
    let session_key;
    let game_key = match for_game {
        Some(key) => Some(key),
        None if kind == EntityKind::UserLeagues => {
            session_key = config.resolve_game_key()?.to_string();
            Some(session_key.as_str())
        }
        None => None,
    };
    let records = Projector::new().project(kind, &content, game_key)?;
    print_records(&records)
}

/// Builds an authenticated client from the configured credentials file,
/// refreshing the access token first if it has expired.
pub async fn build_client(config: &Config) -> Result<LiveClient, AppError> {
    let http = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let mut credentials = FileCredentials::load(config.credentials_file(), http.clone()).await?;
    credentials.ensure_fresh().await?;

    let router = router_for(config)?;
    info!(
        "Using game key {} ({} {})",
        router.game_key(),
        config.sport,
        config.season
    );
    Ok(FantasyClient::new(ReqwestTransport::new(http), credentials, router)
        .with_format(config.response_format))
}

pub async fn handle_fetch(client: &mut LiveClient, url: &str) -> Result<(), AppError> {
    let response = client.query(url).await?;
    println!("{response}");
    Ok(())
}

pub async fn handle_standings(client: &mut LiveClient, league_id: u32) -> Result<(), AppError> {
    let records = client.league_standings(league_id).await?;
    print_records(&records)
}

/// Fetches `pages` consecutive free agent pages. Stops early at a short page.
pub async fn handle_free_agents(
    client: &mut LiveClient,
    league_id: u32,
    start: u32,
    pages: u32,
) -> Result<(), AppError> {
    let mut query = FreeAgentQuery::starting_at(start);
    let mut records = Vec::new();
    for page in 0..pages.max(1) {
        let batch = client.league_free_agents(league_id, &query).await?;
        let count = batch.len();
        records.extend(batch);
        debug!("Free agent page {page}: {count} players");
        if count < crate::constants::free_agents::PAGE_SIZE as usize {
            break;
        }
        query = query.next_page();
    }
    print_records(&records)
}

pub async fn handle_user_leagues(client: &mut LiveClient) -> Result<(), AppError> {
    let records = client.user_leagues().await?;
    print_records(&records)
}

pub async fn handle_stat_categories(client: &mut LiveClient) -> Result<(), AppError> {
    let records = client.stat_categories().await?;
    print_records(&records)
}

/// Runs the authorization-code flow. The credentials file must already hold
/// `client_id` and `client_secret`.
pub async fn handle_authorize(config: &Config) -> Result<(), AppError> {
    let http = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let mut credentials = FileCredentials::load(config.credentials_file(), http).await?;
    let url = credentials.authorization_url()?;
    let code = prompt_for_verifier_code(&url).await?;
    credentials.exchange_code(&code).await?;
    println!(
        "Authorization complete. Tokens saved to {}",
        credentials.path().display()
    );
    Ok(())
}

fn print_records(records: &[ParsedRecord]) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}
