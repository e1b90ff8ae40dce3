//! Credentials kept in a JSON file next to the configuration.
//!
//! # File format
//!
//! ```json
//! {
//!   "client_id": "...",
//!   "client_secret": "...",
//!   "access_token": "...",
//!   "refresh_token": "...",
//!   "expires_in": 3600,
//!   "token_type": "bearer",
//!   "xoauth_yahoo_guid": "..."
//! }
//! ```
//!
//! Only `client_id` and `client_secret` are required. Every token response is
//! merged into the blob and the file is rewritten, so fields this crate does
//! not know about survive a refresh.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use super::CredentialsProvider;
use crate::constants::oauth;
use crate::error::AppError;

/// Contents of the credentials file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Token lifetime in seconds, as returned by the token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Computed when a token response is merged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Anything else found in the file or in token responses
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            refresh_token: None,
            token_type: None,
            expires_in: None,
            expires_at: None,
            extra: Map::new(),
        }
    }

    /// True when the token is past its expiry, with a one minute margin.
    /// A token without a known expiry is assumed valid.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now() + chrono::Duration::minutes(1))
    }

    /// Merges a token endpoint response into these credentials.
    pub fn merge_token_response(&mut self, response: Map<String, Value>) -> Result<(), AppError> {
        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(response);
        let mut updated: OAuthCredentials = serde_json::from_value(Value::Object(merged))?;
        updated.expires_at = match updated.expires_in {
            Some(seconds) => Some(
                chrono::Duration::try_seconds(seconds)
                    .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                    .ok_or_else(|| {
                        AppError::credentials_error(format!(
                            "Token lifetime of {seconds} seconds is out of range"
                        ))
                    })?,
            ),
            None => None,
        };
        *self = updated;
        Ok(())
    }
}

/// [`CredentialsProvider`] backed by a credentials file.
#[derive(Debug)]
pub struct FileCredentials {
    path: PathBuf,
    credentials: OAuthCredentials,
    http: Client,
    token_url: String,
    auth_url: String,
}

impl FileCredentials {
    /// Reads the credentials file.
    #[instrument(skip(http))]
    pub async fn load(path: impl AsRef<Path> + std::fmt::Debug, http: Client) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).await.map_err(|e| {
            AppError::credentials_error(format!(
                "Cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        let credentials: OAuthCredentials = serde_json::from_str(&content)?;
        debug!(
            has_access_token = credentials.access_token.is_some(),
            has_refresh_token = credentials.refresh_token.is_some(),
            "Loaded credentials"
        );
        Ok(Self::new(path, credentials, http))
    }

    pub fn new(path: impl Into<PathBuf>, credentials: OAuthCredentials, http: Client) -> Self {
        Self {
            path: path.into(),
            credentials,
            http,
            token_url: oauth::TOKEN_URL.to_string(),
            auth_url: oauth::AUTH_URL.to_string(),
        }
    }

    /// Uses other OAuth endpoints, e.g. a mock server in tests.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.auth_url = auth_url.into();
        self
    }

    pub fn credentials(&self) -> &OAuthCredentials {
        &self.credentials
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refreshes when there is no usable access token but a refresh token is
    /// available. Without a refresh token the user must authorize first.
    pub async fn ensure_fresh(&mut self) -> Result<(), AppError> {
        let usable = self.credentials.access_token.is_some() && !self.credentials.is_expired();
        if usable {
            return Ok(());
        }
        if self.credentials.refresh_token.is_none() {
            return Err(AppError::credentials_error(
                "No usable access token and no refresh token; run the authorize command",
            ));
        }
        self.refresh_token().await
    }

    /// URL the user opens to grant access and receive a verifier code.
    pub fn authorization_url(&self) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", oauth::REDIRECT_URI),
                ("response_type", "code"),
                ("language", oauth::LANGUAGE),
            ],
        )
        .map_err(|e| AppError::config_error(format!("Invalid authorization URL: {e}")))?;
        Ok(url.to_string())
    }

    /// Exchanges the verifier code shown to the user for tokens and saves them.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&mut self, code: &str) -> Result<(), AppError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("redirect_uri", oauth::REDIRECT_URI),
            ("code", code.trim()),
        ];
        let response = self.request_token(&form).await?;
        self.credentials.merge_token_response(response)?;
        self.save().await?;
        info!("Stored new access token from authorization code");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn refresh_token(&mut self) -> Result<(), AppError> {
        let refresh_token = self
            .credentials
            .refresh_token
            .clone()
            .ok_or_else(|| AppError::credentials_error("No refresh token available"))?;
        let form = [
            ("grant_type", "refresh_token"),
            ("redirect_uri", oauth::REDIRECT_URI),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response = self.request_token(&form).await?;
        self.credentials.merge_token_response(response)?;
        self.save().await?;
        info!("Refreshed access token");
        Ok(())
    }

    /// POSTs a form to the token endpoint with HTTP Basic client authentication.
    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Map<String, Value>, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Token endpoint returned {status}");
            return Err(AppError::credentials_error(format!(
                "Token endpoint returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        match serde_json::from_str::<Value>(&body)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::credentials_error(format!(
                "Unexpected token response: {other}"
            ))),
        }
    }

    /// Writes the credentials back to their file.
    pub async fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(&self.credentials)?;
        fs::write(&self.path, content).await?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

impl CredentialsProvider for FileCredentials {
    fn access_token(&self) -> Result<String, AppError> {
        self.credentials
            .access_token
            .clone()
            .ok_or_else(|| AppError::credentials_error("No access token; run the authorize command"))
    }

    async fn refresh(&mut self) -> Result<(), AppError> {
        self.refresh_token().await
    }
}
