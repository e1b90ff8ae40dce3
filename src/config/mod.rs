use crate::api::{GameKey, ResponseFormat, Sport};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod user_prompts;
pub mod validation;

use paths::{get_config_path, get_credentials_path, get_log_dir_path};
use validation::validate_config;

/// Environment variables that override config file values
pub mod env {
    pub const SPORT: &str = "YAHOO_FANTASY_SPORT";
    pub const SEASON: &str = "YAHOO_FANTASY_SEASON";
    pub const GAME_KEY: &str = "YAHOO_FANTASY_GAME_KEY";
    pub const FORMAT: &str = "YAHOO_FANTASY_FORMAT";
    pub const CREDENTIALS: &str = "YAHOO_FANTASY_CREDENTIALS";
    pub const LOG_FILE: &str = "YAHOO_FANTASY_LOG_FILE";
    pub const HTTP_TIMEOUT: &str = "YAHOO_FANTASY_HTTP_TIMEOUT";
    pub const API_BASE_URL: &str = "YAHOO_FANTASY_API_BASE_URL";
}

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Sport of the fantasy game
    #[serde(default = "default_sport")]
    pub sport: Sport,
    /// Season, named by the year it starts in
    #[serde(default = "default_season")]
    pub season: u16,
    /// Explicit game key; takes precedence over sport and season.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_key: Option<u32>,
    /// Body format for raw queries (`xml` or `json`)
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Path to the OAuth credentials JSON. Defaults to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_sport() -> Sport {
    Sport::Nba
}

fn default_season() -> u16 {
    2018
}

/// Default HTTP timeout in seconds
fn default_http_timeout() -> u64 {
    crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_api_base_url() -> String {
    crate::constants::FANTASY_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sport: default_sport(),
            season: default_season(),
            game_key: None,
            response_format: ResponseFormat::default(),
            credentials_path: None,
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location, falling
    /// back to defaults when no file exists. Environment variables override
    /// file values.
    ///
    /// # Environment Variables
    /// - `YAHOO_FANTASY_SPORT` - Override sport (nba, nfl, mlb, nhl)
    /// - `YAHOO_FANTASY_SEASON` - Override season year
    /// - `YAHOO_FANTASY_GAME_KEY` - Explicit numeric game key
    /// - `YAHOO_FANTASY_FORMAT` - Override response format (xml, json)
    /// - `YAHOO_FANTASY_CREDENTIALS` - Override credentials file path
    /// - `YAHOO_FANTASY_LOG_FILE` - Override log file path
    /// - `YAHOO_FANTASY_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `YAHOO_FANTASY_API_BASE_URL` - Override the API base URL
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a custom file path, without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies `YAHOO_FANTASY_*` variables on top of the current values.
    /// Unparseable values are errors rather than silently ignored.
    pub fn apply_env_overrides(&mut self) -> Result<(), AppError> {
        if let Some(sport) = env_var(env::SPORT) {
            self.sport = sport.parse()?;
        }
        if let Some(season) = env_var(env::SEASON) {
            self.season = parse_number(env::SEASON, &season)?;
        }
        if let Some(game_key) = env_var(env::GAME_KEY) {
            self.game_key = Some(parse_number(env::GAME_KEY, &game_key)?);
        }
        if let Some(format) = env_var(env::FORMAT) {
            self.response_format = format.parse()?;
        }
        if let Some(path) = env_var(env::CREDENTIALS) {
            self.credentials_path = Some(path);
        }
        if let Some(path) = env_var(env::LOG_FILE) {
            self.log_file_path = Some(path);
        }
        if let Some(timeout) = env_var(env::HTTP_TIMEOUT) {
            self.http_timeout_seconds = parse_number(env::HTTP_TIMEOUT, &timeout)?;
        }
        if let Some(url) = env_var(env::API_BASE_URL) {
            self.api_base_url = url;
        }
        Ok(())
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// The game key for this session: the explicit override, or the known key
    /// for the configured sport and season.
    pub fn resolve_game_key(&self) -> Result<GameKey, AppError> {
        match self.game_key {
            Some(key) => Ok(GameKey::new(key)),
            None => GameKey::resolve(self.sport, self.season),
        }
    }

    /// Credentials file location, configured or default.
    pub fn credentials_file(&self) -> String {
        self.credentials_path
            .clone()
            .unwrap_or_else(get_credentials_path)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();
        let config = Config::load().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if Path::new(&config_path).exists() {
            println!("{config_path}");
        } else {
            println!("{config_path}");
            println!("(Not created, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("Game:");
        match config.resolve_game_key() {
            Ok(key) => println!("{} {} (game key {key})", config.sport, config.season),
            Err(e) => println!("{} {} ({e})", config.sport, config.season),
        }
        println!("────────────────────────────────────");
        println!("Response Format:");
        println!("{}", config.response_format);
        println!("────────────────────────────────────");
        println!("API Base URL:");
        println!("{}", config.api_base_url);
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Credentials File:");
        println!("{}", config.credentials_file());
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/yahoo_fantasy.log");
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path, creating the parent
    /// directory if it doesn't exist.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number<N: std::str::FromStr>(name: &str, value: &str) -> Result<N, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config_error(format!("{name} must be a number, got '{value}'")))
}
