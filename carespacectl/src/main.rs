//! Carespace CLI
//!
//! Command-line interface for the Carespace API.

use anyhow::Result;
use carespace_sdk::{CarespaceClient, ClientConfig};
use carespacectl::cli::{
    generate_completion, handle_clients, handle_config, handle_health, handle_login,
    handle_programs, handle_users, Cli, Commands, OutputFormat,
};
use carespacectl::config::{CliConfig, ConfigBuilder};
use clap::Parser;
use std::time::Duration;
use tracing::debug;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Merge CLI flags, environment and config file, highest priority first
fn build_config(cli: &Cli, config_path: &std::path::Path) -> Result<CliConfig> {
    let mut builder = ConfigBuilder::new();

    if let Some(ref base_url) = cli.base_url {
        builder = builder.with_base_url(base_url)?;
    }
    if let Some(ref api_key) = cli.api_key {
        builder = builder.with_api_key(api_key);
    }
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.with_timeout(timeout)?;
    }

    builder = builder.with_env_overrides();

    if !cli.no_config {
        builder = builder.with_config_file(Some(config_path))?;
    }

    builder.build()
}

fn sdk_client(config: &CliConfig) -> Result<CarespaceClient> {
    let mut builder = ClientConfig::builder()
        .with_base_url(&config.base_url)?
        .with_timeout(Duration::from_secs(config.timeout))?;
    if let Some(ref api_key) = config.api_key {
        builder = builder.with_api_key(api_key);
    }
    Ok(CarespaceClient::new(builder.build()?)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => CliConfig::config_path()?,
    };

    let config = match build_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            if cli.verbose {
                eprintln!("Error details: {:?}", e);
            }
            std::process::exit(1);
        }
    };

    let verbose = config.verbose;
    init_tracing(verbose);

    let output_format = match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    debug!(
        base_url = %config.base_url,
        format = ?output_format,
        timeout = config.timeout,
        authenticated = config.api_key.is_some(),
        "configuration resolved"
    );

    let result = match cli.command {
        Commands::Config { command } => {
            handle_config(command, &config, &config_path, &output_format).await
        }
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
        command => {
            let client = match sdk_client(&config) {
                Ok(client) => client,
                Err(e) => {
                    eprintln!("Error: Cannot create client for {}", config.base_url);
                    eprintln!("Client error: {}", e);
                    std::process::exit(1);
                }
            };

            let result = match command {
                Commands::Login {
                    email,
                    password,
                    save,
                } => {
                    let save_to = save.then_some(config_path.as_path());
                    handle_login(&client, &email, &password, save_to, &output_format).await
                }
                Commands::Health => handle_health(&client, &output_format).await,
                Commands::Users { command } => handle_users(&client, command, &output_format).await,
                Commands::Clients { command } => {
                    handle_clients(&client, command, &output_format).await
                }
                Commands::Programs { command } => {
                    handle_programs(&client, command, &output_format).await
                }
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            };

            client.close();
            result
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
