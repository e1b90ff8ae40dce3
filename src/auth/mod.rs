//! OAuth2 credentials for the fantasy sports API.
//!
//! The client only needs two things from a credentials source: the current
//! bearer token, and a way to refresh it after the API rejects it. Both are
//! expressed by [`CredentialsProvider`].

use std::future::Future;

use crate::error::AppError;

pub mod file_store;

pub use file_store::{FileCredentials, OAuthCredentials};

/// Source of bearer tokens.
pub trait CredentialsProvider: Send + Sync {
    /// Current access token.
    fn access_token(&self) -> Result<String, AppError>;

    /// Obtains a new access token, e.g. by exchanging a refresh token.
    fn refresh(&mut self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A fixed token managed outside this crate. It cannot be refreshed.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialsProvider for StaticToken {
    fn access_token(&self) -> Result<String, AppError> {
        Ok(self.0.clone())
    }

    async fn refresh(&mut self) -> Result<(), AppError> {
        Err(AppError::credentials_error("static token cannot be refreshed"))
    }
}
