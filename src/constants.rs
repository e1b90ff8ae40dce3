//! Application-wide constants and configuration values
//!
//! Endpoints, HTTP tuning and defaults shared by the router, the transport
//! and the credentials store.

/// Base URL of the fantasy sports v2 REST API
pub const FANTASY_API_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// OAuth2 endpoints and fixed request values
pub mod oauth {
    /// Endpoint the user visits to grant access and obtain a verifier code
    pub const AUTH_URL: &str = "https://api.login.yahoo.com/oauth2/request_auth";

    /// Token endpoint for both code exchange and refresh
    pub const TOKEN_URL: &str = "https://api.login.yahoo.com/oauth2/get_token";

    /// Out-of-band redirect; the verifier code is shown to the user instead
    pub const REDIRECT_URI: &str = "oob";

    pub const LANGUAGE: &str = "en-us";

    /// Substring of the API error description for an invalid or expired token
    pub const INVALID_CREDENTIALS_MARKER: &str = "Please provide valid credentials";
}

/// Retry behaviour of the HTTP transport for transient failures
pub mod retry {
    /// Maximum retries after the first attempt
    pub const MAX_RETRIES: u32 = 3;

    /// First backoff delay; doubled after every retry
    pub const INITIAL_BACKOFF_MS: u64 = 250;
}

/// Free agent query defaults
pub mod free_agents {
    /// Available players (free agents and waivers)
    pub const STATUS: &str = "A";

    /// Sort by actual rank
    pub const SORT: &str = "AR";

    pub const SORT_TYPE: &str = "lastmonth";

    /// The API returns 25 players per page
    pub const PAGE_SIZE: u32 = 25;
}
