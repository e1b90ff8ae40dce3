use crate::cli::Args;
use crate::config::Config;
use crate::error::AppError;
use std::io::stdout;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILE_NAME: &str = "yahoo_fantasy.log";

/// Sets up logging for the application.
///
/// - Always logs to a daily rolling file, through a non-blocking writer
/// - `--debug` adds a stdout layer at debug level
/// - `RUST_LOG` directives are honoured on top of `yahoo_fantasy=info`
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(
    args: &Args,
    config: &Config,
) -> Result<(String, WorkerGuard), AppError> {
    let custom_log_path = args.log_file.as_ref().or(config.log_file_path.as_ref());
    let (log_dir, log_file_name) = split_log_path(custom_log_path.map(String::as_str));

    if !Path::new(&log_dir).exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter("yahoo_fantasy=info")?);

    let stdout_layer = if args.debug {
        Some(
            fmt::Layer::new()
                .with_writer(stdout)
                .with_ansi(true)
                .with_filter(env_filter("yahoo_fantasy=debug")?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| AppError::log_setup_error(format!("Failed to install subscriber: {e}")))?;

    let log_file_path = format!("{log_dir}/{log_file_name}");
    Ok((log_file_path, guard))
}

fn env_filter(directive: &str) -> Result<EnvFilter, AppError> {
    let directive = directive
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Splits a custom log path into directory and file name, defaulting to the
/// config directory.
fn split_log_path(custom_path: Option<&str>) -> (String, String) {
    match custom_path {
        Some(custom_path) => {
            let path = Path::new(custom_path);
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE_NAME);
            (parent.to_string_lossy().to_string(), file_name.to_string())
        }
        None => (Config::get_log_dir_path(), DEFAULT_LOG_FILE_NAME.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_custom_log_path() {
        assert_eq!(
            split_log_path(Some("/var/log/fantasy/app.log")),
            ("/var/log/fantasy".to_string(), "app.log".to_string())
        );
        assert_eq!(
            split_log_path(Some("app.log")),
            (".".to_string(), "app.log".to_string())
        );
    }

    #[test]
    fn test_default_log_path() {
        let (dir, file) = split_log_path(None);
        assert_eq!(dir, Config::get_log_dir_path());
        assert_eq!(file, DEFAULT_LOG_FILE_NAME);
    }

    #[test]
    fn test_env_filter_rejects_bad_directive() {
        assert!(env_filter("yahoo_fantasy=info").is_ok());
        assert!(matches!(
            env_filter("yahoo_fantasy=loud"),
            Err(AppError::LogSetup(_))
        ));
    }
}
