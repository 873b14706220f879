//! Tracing setup: a daily-rolling log file, or stderr when no directory is configured

use std::{path::PathBuf, str::FromStr};

use directories::ProjectDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR_ENV: &str = "REPO_PULSE_LOG_DIR";
const LOG_LEVEL_ENV: &str = "REPO_PULSE_LOG_LEVEL";
const LOG_JSON_ENV: &str = "REPO_PULSE_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub file_level: Level,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: ProjectDirs::from("", "", "repo-pulse")
                .map(|dirs| dirs.data_local_dir().join("logs")),
            file_level: Level::INFO,
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        if let Some(level) = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|level| Level::from_str(&level).ok())
        {
            config.file_level = level;
        }

        config.json = std::env::var(LOG_JSON_ENV)
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        config
    }

    /// `RUST_LOG` wins; otherwise the configured level with noisy HTTP crates quietened
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{},hyper=warn,reqwest=warn",
                self.file_level.as_str().to_lowercase()
            ))
        })
    }
}

/// Install the global subscriber; keep the guard alive for as long as logs should flush
pub fn init_logging(
    config: LoggingConfig,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.filter();

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "repo-pulse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            if config.json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .try_init()?;
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()?;
            }

            Ok(Some(guard))
        },
        None => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            if config.json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .try_init()?;
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()?;
            }

            Ok(None)
        },
    }
}
