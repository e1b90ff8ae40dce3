use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data from API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    // Request validation errors, raised before any network call
    #[error("Invalid {resource} subresource: '{subresource}'")]
    InvalidSubresource {
        resource: &'static str,
        subresource: String,
    },

    #[error("Invalid {resource} filter: '{filter}'")]
    InvalidFilter {
        resource: &'static str,
        filter: String,
    },

    #[error("Cannot get {resource} subresource '{subresource}' without keys")]
    MissingKeys {
        resource: &'static str,
        subresource: String,
    },

    #[error("{resource} request needs exactly one of [{modes}], got {supplied}")]
    AmbiguousOrMissingAddressing {
        resource: &'static str,
        modes: &'static str,
        supplied: usize,
    },

    #[error("No game key known for sport '{sport}' season {season}")]
    UnknownGameKey { sport: String, season: u16 },

    #[error("Invalid response format '{0}', expected 'xml' or 'json'")]
    InvalidResponseFormat(String),

    // Response projection errors
    #[error("API returned malformed XML: {message}")]
    MalformedResponse { message: String },

    #[error("Response is missing required element: {path}")]
    MissingRequiredField { path: String },

    // Authentication errors
    #[error("API rejected credentials: {message} (URL: {url})")]
    Unauthorized { message: String, url: String },

    #[error("Authentication failed after credential refresh (URL: {url})")]
    AuthenticationFailed { url: String },

    #[error("Credentials error: {0}")]
    Credentials(String),

    // Specific HTTP status code errors
    #[error("API request not found (404): {url}")]
    ApiNotFound { url: String },

    #[error("API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API rate limit exceeded (429): {message} (URL: {url})")]
    ApiRateLimit { message: String, url: String },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create a credentials error with context
    pub fn credentials_error(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    pub fn invalid_subresource(resource: &'static str, subresource: impl Into<String>) -> Self {
        Self::InvalidSubresource {
            resource,
            subresource: subresource.into(),
        }
    }

    pub fn invalid_filter(resource: &'static str, filter: impl Into<String>) -> Self {
        Self::InvalidFilter {
            resource,
            filter: filter.into(),
        }
    }

    pub fn missing_keys(resource: &'static str, subresource: impl Into<String>) -> Self {
        Self::MissingKeys {
            resource,
            subresource: subresource.into(),
        }
    }

    pub fn ambiguous_addressing(
        resource: &'static str,
        modes: &'static str,
        supplied: usize,
    ) -> Self {
        Self::AmbiguousOrMissingAddressing {
            resource,
            modes,
            supplied,
        }
    }

    pub fn unknown_game_key(sport: impl Into<String>, season: u16) -> Self {
        Self::UnknownGameKey {
            sport: sport.into(),
            season,
        }
    }

    /// Create a malformed XML error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a missing element error; `path` is the XPath-like location
    pub fn missing_required_field(path: impl Into<String>) -> Self {
        Self::MissingRequiredField { path: path.into() }
    }

    pub fn unauthorized(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            url: url.into(),
        }
    }

    pub fn authentication_failed(url: impl Into<String>) -> Self {
        Self::AuthenticationFailed { url: url.into() }
    }

    /// Create an API not found error
    pub fn api_not_found(url: impl Into<String>) -> Self {
        Self::ApiNotFound { url: url.into() }
    }

    /// Create an API server error (5xx status codes)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 401, 404 and 429)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API rate limit error
    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Input validation errors: the request was never sent and retrying cannot help.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidSubresource { .. }
                | AppError::InvalidFilter { .. }
                | AppError::MissingKeys { .. }
                | AppError::AmbiguousOrMissingAddressing { .. }
                | AppError::UnknownGameKey { .. }
                | AppError::InvalidResponseFormat(_)
        )
    }

    /// The API rejected the bearer token. Worth one retry after a refresh.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Unauthorized { .. })
    }

    /// Check if error is a transient transport failure (network issues, server errors, rate limits)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::NetworkTimeout { .. }
                | AppError::NetworkConnection { .. }
                | AppError::ApiServerError { .. }
                | AppError::ApiRateLimit { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_invalid_subresource_message_names_resource() {
        let error = AppError::invalid_subresource("league", "roster");
        assert_eq!(error.to_string(), "Invalid league subresource: 'roster'");
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_invalid_filter_message_names_filter() {
        let error = AppError::invalid_filter("players", "colour");
        assert_eq!(error.to_string(), "Invalid players filter: 'colour'");
    }

    #[test]
    fn test_missing_keys_message() {
        let error = AppError::missing_keys("game", "leagues");
        assert_eq!(
            error.to_string(),
            "Cannot get game subresource 'leagues' without keys"
        );
    }

    #[test]
    fn test_ambiguous_addressing_message() {
        let error = AppError::ambiguous_addressing("teams", "league_id, team_keys, my_team", 2);
        assert_eq!(
            error.to_string(),
            "teams request needs exactly one of [league_id, team_keys, my_team], got 2"
        );
    }

    #[test]
    fn test_unknown_game_key_message() {
        let error = AppError::unknown_game_key("nhl", 2018);
        assert_eq!(
            error.to_string(),
            "No game key known for sport 'nhl' season 2018"
        );
        assert!(error.is_validation_error());
    }

    #[test]
    fn test_missing_required_field_carries_path() {
        let error = AppError::missing_required_field("player[0]/name/full");
        assert_eq!(
            error.to_string(),
            "Response is missing required element: player[0]/name/full"
        );
        assert!(!error.is_validation_error());
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(AppError::unauthorized("token expired", "url").is_auth_failure());
        assert!(!AppError::authentication_failed("url").is_auth_failure());
        assert!(!AppError::api_client_error(403, "Forbidden", "url").is_auth_failure());
    }

    #[test]
    fn test_is_retryable() {
        // Retryable errors
        assert!(AppError::network_timeout("url").is_retryable());
        assert!(AppError::network_connection("url", "message").is_retryable());
        assert!(AppError::api_server_error(500, "message", "url").is_retryable());
        assert!(AppError::api_rate_limit("message", "url").is_retryable());

        // Non-retryable errors
        assert!(!AppError::api_not_found("url").is_retryable());
        assert!(!AppError::api_client_error(400, "message", "url").is_retryable());
        assert!(!AppError::config_error("message").is_retryable());
        assert!(!AppError::invalid_subresource("game", "x").is_retryable());
        assert!(!AppError::malformed_response("message").is_retryable());
        assert!(!AppError::unauthorized("message", "url").is_retryable());
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::Json(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
    }

    #[test]
    fn test_error_from_toml_deserialize() {
        let invalid_toml = "invalid = [toml";
        let toml_error = toml::from_str::<serde_json::Value>(invalid_toml).unwrap_err();
        let app_error: AppError = toml_error.into();
        assert!(matches!(app_error, AppError::TomlDeserialize(_)));
    }

    #[test]
    fn test_error_display_formats() {
        let errors = vec![
            AppError::config_error("test config error"),
            AppError::log_setup_error("test log error"),
            AppError::credentials_error("no refresh token"),
            AppError::InvalidResponseFormat("yaml".to_string()),
            AppError::malformed_response("unexpected end"),
            AppError::authentication_failed("https://example.com"),
            AppError::api_not_found("https://example.com"),
            AppError::api_server_error(500, "server error", "https://example.com"),
            AppError::api_rate_limit("rate limit", "https://example.com"),
            AppError::network_timeout("https://example.com"),
        ];

        for error in errors {
            let display_string = error.to_string();
            assert!(
                display_string.len() > 5,
                "Error display should be descriptive: {error:?}"
            );
        }
    }
}
