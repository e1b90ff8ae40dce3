//! Authenticated API client.
//!
//! [`FantasyClient`] ties the router, a [`Transport`], a
//! [`CredentialsProvider`] and the [`Projector`] together. Rejected
//! credentials are refreshed once and the request re-issued once; a second
//! rejection is fatal.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crate::api::format::{ApiResponse, ResponseFormat};
use crate::api::queries::FreeAgentQuery;
use crate::api::router::{DEFAULT_SUBRESOURCE, ResourceRouter};
use crate::api::transport::Transport;
use crate::auth::CredentialsProvider;
use crate::constants::oauth::INVALID_CREDENTIALS_MARKER;
use crate::error::AppError;
use crate::parser::{ParsedRecord, Projector, StatCatalog};

const NO_KEYS: &[&str] = &[];

pub struct FantasyClient<T: Transport, C: CredentialsProvider> {
    transport: T,
    credentials: C,
    router: ResourceRouter,
    projector: Projector,
    format: ResponseFormat,
}

impl<T: Transport, C: CredentialsProvider> FantasyClient<T, C> {
    pub fn new(transport: T, credentials: C, router: ResourceRouter) -> Self {
        Self {
            transport,
            credentials,
            router,
            projector: Projector::new(),
            format: ResponseFormat::default(),
        }
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn router(&self) -> &ResourceRouter {
        &self.router
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Fetches `url` in the client's configured format.
    pub async fn query(&mut self, url: &str) -> Result<ApiResponse, AppError> {
        self.query_as(url, self.format).await
    }

    /// Fetches `url` in `format`, refreshing credentials once if the API
    /// rejects them.
    #[instrument(skip(self))]
    pub async fn query_as(
        &mut self,
        url: &str,
        format: ResponseFormat,
    ) -> Result<ApiResponse, AppError> {
        match self.send(url, format).await {
            Err(e) if e.is_auth_failure() => {
                warn!("Credentials rejected for {url}: {e}. Refreshing and retrying once");
                self.credentials.refresh().await?;
                match self.send(url, format).await {
                    Err(e) if e.is_auth_failure() => {
                        warn!("Credentials rejected again after refresh: {e}");
                        Err(AppError::authentication_failed(url))
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn send(&self, url: &str, format: ResponseFormat) -> Result<ApiResponse, AppError> {
        let token = self.credentials.access_token()?;
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            AppError::credentials_error("Access token is not a valid header value")
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let body = self
            .transport
            .fetch(url, &[("format", format.as_str())], &headers)
            .await?;

        match format {
            ResponseFormat::Xml => Ok(ApiResponse::Xml(body)),
            ResponseFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(&body)?;
                if let Some(description) = value
                    .get("error")
                    .and_then(|error| error.get("description"))
                    .and_then(|d| d.as_str())
                    && description.contains(INVALID_CREDENTIALS_MARKER)
                {
                    return Err(AppError::unauthorized(description, url));
                }
                Ok(ApiResponse::Json(value))
            }
        }
    }

    // Projection always reads XML, whatever the configured format.
    async fn fetch_xml(&mut self, url: &str) -> Result<String, AppError> {
        let response = self.query_as(url, ResponseFormat::Xml).await?;
        response
            .into_xml()
            .ok_or_else(|| AppError::malformed_response("expected an XML body"))
    }

    /// Metadata of the session's game.
    pub async fn game_metadata(&mut self) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.game(DEFAULT_SUBRESOURCE, NO_KEYS)?;
        let body = self.fetch_xml(&url).await?;
        self.projector.game(&body)
    }

    /// Stat definitions of the session's game.
    pub async fn stat_categories(&mut self) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.game("stat_categories", NO_KEYS)?;
        let body = self.fetch_xml(&url).await?;
        self.projector.stat_categories(&body)
    }

    /// Switches stat naming to the game's own stat categories, each named by
    /// its lower-cased display name. Returns the number of named stats; the
    /// catalog is left alone when the game reports none.
    pub async fn use_game_stat_catalog(&mut self) -> Result<usize, AppError> {
        let records = self.stat_categories().await?;
        let catalog = StatCatalog::from_records(&records, "display_name");
        if catalog.is_empty() {
            warn!("Game {} reported no usable stat categories", self.router.game_key());
            return Ok(0);
        }
        let count = catalog.len();
        info!("Naming stats from {count} game stat categories");
        self.projector.set_catalog(catalog);
        Ok(count)
    }

    pub async fn leagues<S: AsRef<str>>(
        &mut self,
        league_keys: &[S],
    ) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.leagues(league_keys, DEFAULT_SUBRESOURCE)?;
        let body = self.fetch_xml(&url).await?;
        self.projector.leagues(&body)
    }

    pub async fn league_standings(&mut self, league_id: u32) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.league(league_id, "standings")?;
        let body = self.fetch_xml(&url).await?;
        let records = self.projector.league_standings(&body)?;
        info!("League {league_id}: {} teams in standings", records.len());
        Ok(records)
    }

    /// One page of free agents; use [`FreeAgentQuery::next_page`] to continue.
    pub async fn league_free_agents(
        &mut self,
        league_id: u32,
        query: &FreeAgentQuery,
    ) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.league_free_agents(league_id, query)?;
        let body = self.fetch_xml(&url).await?;
        let records = self.projector.league_free_agents(&body)?;
        debug!(
            "League {league_id}: {} free agents from offset {}",
            records.len(),
            query.start
        );
        Ok(records)
    }

    pub async fn player_stats<S: AsRef<str>>(
        &mut self,
        league_id: u32,
        player_keys: &[S],
    ) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.player_stats(league_id, player_keys)?;
        let body = self.fetch_xml(&url).await?;
        self.projector.player_stats(&body)
    }

    /// Leagues of the logged-in user in the session's game.
    pub async fn user_leagues(&mut self) -> Result<Vec<ParsedRecord>, AppError> {
        let url = self.router.user("leagues")?;
        let body = self.fetch_xml(&url).await?;
        self.projector.user_leagues(&body, self.router.game_key())
    }
}
