//! Yahoo! Fantasy Sports API client library
//!
//! Two independent halves:
//!
//! - [`api::ResourceRouter`] composes request URLs for every resource and
//!   collection, validating sub-resources, filters and addressing before any
//!   request is made.
//! - [`parser::Projector`] turns XML responses into flat, ordered string
//!   records, remapping numeric stat ids to stat names.
//!
//! [`api::FantasyClient`] joins them with an HTTP transport and OAuth2
//! credentials.
//!
//! # Examples
//!
//! ```rust
//! use yahoo_fantasy::api::{GameKey, ResourceRouter, Sport};
//! use yahoo_fantasy::parser::Projector;
//!
//! let router = ResourceRouter::new(GameKey::resolve(Sport::Nba, 2018).unwrap());
//! assert_eq!(
//!     router.league(12345, "standings").unwrap(),
//!     "https://fantasysports.yahooapis.com/fantasy/v2/league/385.l.12345/standings"
//! );
//!
//! let xml = "<fantasy_content><leagues>\
//!            <league><league_key>385.l.12345</league_key><name>Hoops</name></league>\
//!            </leagues></fantasy_content>";
//! let leagues = Projector::new().leagues(xml).unwrap();
//! assert_eq!(leagues[0]["name"], "Hoops");
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod parser;

// Re-export commonly used types for convenience
pub use api::{
    ApiResponse, FantasyClient, FilterSet, GameKey, ResourceKind, ResourceRouter, ResponseFormat,
    Sport, Transport,
};
pub use auth::{CredentialsProvider, FileCredentials, StaticToken};
pub use config::Config;
pub use error::AppError;
pub use parser::{EntityKind, ParsedRecord, Projector, StatCatalog};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
