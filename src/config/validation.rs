use crate::config::Config;
use crate::error::AppError;
use std::path::Path;

/// Upper bound for the HTTP timeout setting
const MAX_HTTP_TIMEOUT_SECONDS: u64 = 300;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API base URL must be an http(s) URL
/// - HTTP timeout must be between 1 and 300 seconds
/// - Credentials path, if provided, cannot be empty
/// - If log file path is provided, it cannot be empty and its parent
///   directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let base_url = config.api_base_url.trim();
    if base_url.is_empty() {
        return Err(AppError::config_error("API base URL cannot be empty"));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "API base URL must start with http:// or https://, got '{base_url}'"
        )));
    }

    if config.http_timeout_seconds == 0 || config.http_timeout_seconds > MAX_HTTP_TIMEOUT_SECONDS {
        return Err(AppError::config_error(format!(
            "HTTP timeout must be between 1 and {MAX_HTTP_TIMEOUT_SECONDS} seconds, got {}",
            config.http_timeout_seconds
        )));
    }

    if let Some(credentials_path) = &config.credentials_path
        && credentials_path.trim().is_empty()
    {
        return Err(AppError::config_error("Credentials path cannot be empty"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        for url in ["", "   ", "fantasysports.yahooapis.com", "ftp://example.com"] {
            let config = Config {
                api_base_url: url.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(validate_config(&config), Err(AppError::Config(_))),
                "{url:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_timeout_out_of_range() {
        for timeout in [0, MAX_HTTP_TIMEOUT_SECONDS + 1] {
            let config = Config {
                http_timeout_seconds: timeout,
                ..Config::default()
            };
            assert!(validate_config(&config).is_err());
        }
    }

    #[test]
    fn test_rejects_empty_paths() {
        let config = Config {
            credentials_path: Some(" ".to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            log_file_path: Some(String::new()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_creates_missing_log_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("app.log");
        let config = Config {
            log_file_path: Some(log_path.to_string_lossy().to_string()),
            ..Config::default()
        };
        validate_config(&config).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }
}
