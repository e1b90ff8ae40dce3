// src/main.rs
use clap::Parser;
use tracing::{error, info};
use yahoo_fantasy::cli::{Args, Command, is_offline_command};
use yahoo_fantasy::commands;
use yahoo_fantasy::error::AppError;
use yahoo_fantasy::logging::setup_logging;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.list_config {
        return commands::handle_list_config().await;
    }

    let config = commands::load_config(&args).await?;
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    info!("Logs are written to {log_file_path}");
    if !is_offline_command(&args) {
        info!("Using credentials from {}", config.credentials_file());
    }

    let result = run(&args, &config).await;
    if let Err(e) = &result {
        error!("Command failed: {e}");
    }
    result
}

async fn run(args: &Args, config: &yahoo_fantasy::Config) -> Result<(), AppError> {
    let Some(command) = &args.command else {
        return Err(AppError::config_error(
            "No command given; run with --help to see the available commands",
        ));
    };

    match command {
        Command::Url { resource } => {
            let router = commands::router_for(config)?;
            println!("{}", commands::build_url(&router, resource)?);
            Ok(())
        }
        Command::Parse {
            kind,
            file,
            for_game,
        } => commands::handle_parse(config, *kind, file, for_game.as_deref()).await,
        Command::Authorize => commands::handle_authorize(config).await,
        Command::Fetch { url } => {
            let mut client = commands::build_client(config).await?;
            commands::handle_fetch(&mut client, url).await
        }
        Command::Standings { league_id } => {
            let mut client = commands::build_client(config).await?;
            if args.game_stats {
                client.use_game_stat_catalog().await?;
            }
            commands::handle_standings(&mut client, *league_id).await
        }
        Command::FreeAgents {
            league_id,
            start,
            pages,
        } => {
            let mut client = commands::build_client(config).await?;
            if args.game_stats {
                client.use_game_stat_catalog().await?;
            }
            commands::handle_free_agents(&mut client, *league_id, *start, *pages).await
        }
        Command::UserLeagues => {
            let mut client = commands::build_client(config).await?;
            commands::handle_user_leagues(&mut client).await
        }
        Command::StatCategories => {
            let mut client = commands::build_client(config).await?;
            commands::handle_stat_categories(&mut client).await
        }
    }
}
