mod action;
mod app;
mod cli;
mod components;
mod config;
mod errors;
mod logging;
mod messages;
mod pages;
mod services;
mod state;
mod tui;
mod validate;

use std::sync::Arc;

use api::HttpTrackerApi;
use clap::Parser;
use color_eyre::Result;

use crate::{app::App, cli::Cli, config::Config};

#[tokio::main]
pub async fn run() -> Result<()> {
    crate::errors::init()?;
    config::ensure_data_and_config_dirs_exist()?;

    let args = Cli::parse();
    let mut config = Config::new()?;
    if let Some(tick_rate) = args.tick_rate {
        config.config.tick_rate = tick_rate;
    }
    if let Some(frame_rate) = args.frame_rate {
        config.config.frame_rate = frame_rate;
    }
    if let Some(server) = args.server {
        config.config.server_url = server;
    }

    // Held for the lifetime of the app; dropping it closes the log writer.
    let _guard = crate::logging::init(&config.config.log_level)?;

    let tracker = Arc::new(HttpTrackerApi::new(config.config.server_url.clone())?);
    let mut app = App::new(config, tracker)?;
    app.run().await?;
    Ok(())
}
