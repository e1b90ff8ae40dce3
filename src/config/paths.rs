use std::path::{Path, PathBuf};

/// Directory name under the platform config directory
const APP_DIR: &str = "yahoo_fantasy";

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(APP_DIR)
}

/// Returns the platform-specific path for the config file.
///
/// Uses the platform config directory (e.g. `~/.config` on Linux) and falls
/// back to the current directory if it is unavailable.
pub fn get_config_path() -> String {
    app_dir().join("config.toml").to_string_lossy().to_string()
}

/// Returns the platform-specific path for the log directory.
pub fn get_log_dir_path() -> String {
    app_dir().join("logs").to_string_lossy().to_string()
}

/// Default location of the OAuth credentials blob.
pub fn get_credentials_path() -> String {
    app_dir()
        .join("credentials.json")
        .to_string_lossy()
        .to_string()
}
