use std::{path::PathBuf, sync::mpsc, thread};

use clap::Parser;
use color_eyre::eyre::Report;
use repo_pulse::{
    app_init::initialize_app,
    client::{log_cycle, spawn_poller},
    config::{default_config_path, load_or_create_config},
    event::PulseEvent,
    notice_service::NoticeService,
};
use tracing::info;

/// Report watcher, issue and fork changes on a GitHub user's repositories
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub user to watch, overriding the configuration file
    #[arg(short, long)]
    username: Option<String>,

    /// Seconds between polls, overriding the configuration file
    #[arg(short, long)]
    interval: Option<u64>,

    /// Poll once and exit
    #[arg(long)]
    once: bool,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = load_or_create_config(&config_path)?;
    if let Some(username) = cli.username {
        config.username = username.into();
    }
    if let Some(interval) = cli.interval {
        config.poll_interval_secs = interval;
    }

    let app = initialize_app(config, cli.debug).map_err(|e| {
        if e.is_invalid_config() {
            Report::new(e).wrap_err(format!("Check settings in {}", config_path.display()))
        } else {
            Report::new(e)
        }
    })?;

    let (sender, receiver) = mpsc::channel();
    let printer = thread::spawn(move || print_notices(receiver));

    if cli.once {
        let result = app.poller.initiate(&sender).await;
        log_cycle(&result);
        if let Err(e) = &result {
            eprintln!("error: {e}");
        }
        drop(sender);
    } else {
        let (shutdown, handle) =
            spawn_poller(app.poller.clone(), sender, app.client_config.polling.interval);

        tokio::signal::ctrl_c().await?;
        info!("Received interrupt, shutting down");
        let _ = shutdown.send(());
        handle.await?;
    }

    let _ = printer.join();
    Ok(())
}

fn print_notices(receiver: mpsc::Receiver<PulseEvent>) {
    let mut notices = NoticeService::new();

    for event in receiver {
        notices.apply(&event);
        while let Some(notice) = notices.pop_notice() {
            println!("{notice}");
        }
    }
}
