//! campfire CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use campfire_client::cli::{Cli, Command, ConfigAction};
use campfire_client::commands;
use campfire_client::config::ClientConfig;
use campfire_client::error::{ClientError, ClientResult};
use campfire_core::{OutputFormatter, TracingConfig, init_tracing};
use campfire_providers::{CampfireClient, EventService};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let mut config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };
    cli.apply_overrides(&mut config);

    init_tracing(TracingConfig::for_cli(config.debug))?;

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Command::Event { link, output } => {
            let (service, formatter) = build_service(&config)?;
            commands::event::run(&service, &link, &output, &formatter).await
        }
        Command::Club { club_id, json } => {
            let (service, formatter) = build_service(&config)?;
            commands::club::run(&service, &club_id, json, &formatter).await
        }
        Command::Scrape { url, output } => {
            let (service, formatter) = build_service(&config)?;
            commands::scrape::run(&service, &url, &output, &formatter).await
        }
    }
}

/// Builds the HTTP-backed service and the formatter from the configuration.
fn build_service(config: &ClientConfig) -> ClientResult<(EventService, OutputFormatter)> {
    let api = config.api.to_api_config().map_err(ClientError::Config)?;
    let normalizer = config
        .display
        .to_normalizer_config()
        .map_err(ClientError::Config)?;

    let client =
        CampfireClient::new(api.clone()).map_err(|e| ClientError::Config(e.to_string()))?;
    let service = EventService::from_config(Box::new(client), &api, normalizer);
    debug!(source = service.source_name(), "event service ready");

    Ok((service, OutputFormatter::new(config.display.format_options())))
}
