use std::sync::Arc;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{ClientConfig, GithubApi, Poller},
    config::PulseConfig,
    logging::{LoggingConfig, init_logging},
    result::{PulseError, Result},
};

pub struct AppComponents {
    pub client_config: ClientConfig,
    pub poller: Arc<Poller<GithubApi>>,
    pub _log_guard: Option<WorkerGuard>,
}

pub fn initialize_app(config: PulseConfig, debug: bool) -> Result<AppComponents> {
    let log_guard = initialize_logging(&config, debug)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "repo-pulse starting up");

    let client_config = ClientConfig::from(config);
    client_config.validate()?;

    tracing::debug!(
        username = %client_config.username,
        api_url = %client_config.api_url,
        user_agent = %client_config.request.user_agent,
        interval = ?client_config.polling.interval,
        "Client configured"
    );

    let poller = create_poller(&client_config)?;

    Ok(AppComponents {
        client_config,
        poller,
        _log_guard: log_guard,
    })
}

fn initialize_logging(config: &PulseConfig, debug: bool) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_env();

    if let Some(log_level) = &config.log_level {
        if log_level == "Off" {
            return Ok(None);
        }

        if let Ok(level) = log_level.parse() {
            logging_config.file_level = level;
        }
    }

    if debug {
        logging_config.file_level = Level::DEBUG;
    }

    init_logging(logging_config).map_err(PulseError::Logging)
}

fn create_poller(client_config: &ClientConfig) -> Result<Arc<Poller<GithubApi>>> {
    let api = GithubApi::new(client_config)?;
    Ok(Arc::new(Poller::new(api, client_config)))
}
