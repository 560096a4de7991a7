//! Command execution handlers

use anyhow::{Context, Result};
use carespace_core::api::{PaginationParams, ProgramFilter};
use carespace_sdk::CarespaceClient;
use std::path::Path;
use tracing::debug;

use crate::config::{CliConfig, ConfigBuilder};
use crate::format::{self, format_success};

use super::commands::*;

impl From<&PageArgs> for PaginationParams {
    fn from(args: &PageArgs) -> Self {
        PaginationParams {
            page: args.page,
            limit: args.limit,
            search: args.search.clone(),
            ..PaginationParams::default()
        }
    }
}

/// Handle login command
pub async fn handle_login(
    client: &CarespaceClient,
    email: &str,
    password: &str,
    save_to: Option<&Path>,
    output: &OutputFormat,
) -> Result<()> {
    let response = client
        .login_and_set_token(email, password)
        .await
        .context("Login failed")?;

    println!("{}", format::format_login(&response, &output.into())?);

    if let Some(path) = save_to {
        let mut config = CliConfig::load_from(path)?;
        config.api_key = Some(response.access_token.clone());
        config.save_to(path)?;
        println!(
            "{}",
            format_success(&format!("Access token saved to {}", path.display()))
        );
    }

    Ok(())
}

/// Handle health command
pub async fn handle_health(client: &CarespaceClient, output: &OutputFormat) -> Result<()> {
    let healthy = client.health_check().await;
    println!(
        "{}",
        format::format_health(client.base_url(), healthy, &output.into())?
    );

    if !healthy {
        return Err(anyhow::anyhow!("API health check failed"));
    }
    Ok(())
}

/// Handle users commands
pub async fn handle_users(
    client: &CarespaceClient,
    command: UsersCommands,
    output: &OutputFormat,
) -> Result<()> {
    let formatted = match command {
        UsersCommands::List { page } => {
            let users = client.users().get_users(&(&page).into()).await?;
            format::format_users(&users, &output.into())?
        }
        UsersCommands::Get { id } => {
            let user = client.users().get_user(&id).await?;
            format::format_user(&user, &output.into())?
        }
        UsersCommands::Profile => {
            let user = client.users().get_user_profile().await?;
            format::format_user(&user, &output.into())?
        }
    };

    println!("{}", formatted);
    Ok(())
}

/// Handle clients commands
pub async fn handle_clients(
    client: &CarespaceClient,
    command: ClientsCommands,
    output: &OutputFormat,
) -> Result<()> {
    let formatted = match command {
        ClientsCommands::List { page } => {
            let clients = client.clients().get_clients(&(&page).into()).await?;
            format::format_clients(&clients, &output.into())?
        }
        ClientsCommands::Get { id } => {
            let record = client.clients().get_client(&id).await?;
            format::format_client(&record, &output.into())?
        }
        ClientsCommands::Stats { id } => {
            let stats = client.clients().get_client_stats(&id).await?;
            format::format_client_stats(&stats, &output.into())?
        }
        ClientsCommands::Programs { id, page } => {
            let programs = client
                .clients()
                .get_client_programs(&id, &(&page).into())
                .await?;
            format::format_programs(&programs, &output.into())?
        }
    };

    println!("{}", formatted);
    Ok(())
}

/// Handle programs commands
pub async fn handle_programs(
    client: &CarespaceClient,
    command: ProgramsCommands,
    output: &OutputFormat,
) -> Result<()> {
    let formatted = match command {
        ProgramsCommands::List {
            page,
            category,
            difficulty,
        } => {
            let filter = ProgramFilter {
                pagination: (&page).into(),
                category,
                difficulty,
                is_template: None,
            };
            let programs = client.programs().get_programs(&filter).await?;
            format::format_programs(&programs, &output.into())?
        }
        ProgramsCommands::Get { id } => {
            let program = client.programs().get_program(&id).await?;
            format::format_program(&program, &output.into())?
        }
        ProgramsCommands::Exercises { id, page, limit } => {
            let params = PaginationParams::page(page, limit);
            let exercises = client
                .programs()
                .get_program_exercises(&id, Some(&params))
                .await?;
            format::format_exercises(&exercises, &output.into())?
        }
        ProgramsCommands::Templates { page, category } => {
            let filter = ProgramFilter {
                pagination: (&page).into(),
                category,
                ..ProgramFilter::default()
            };
            let templates = client.programs().get_program_templates(&filter).await?;
            format::format_programs(&templates, &output.into())?
        }
    };

    println!("{}", formatted);
    Ok(())
}

/// Handle config commands
///
/// `current_config` is the fully merged configuration; `set` and `reset`
/// only touch the file at `config_path`.
pub async fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    config_path: &Path,
    output: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let shown = current_config.redacted();
            match output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&shown)?);
                }
                OutputFormat::Table => {
                    println!("CLI Configuration ({}):", config_path.display());
                    println!("{:<20} Value", "Setting");
                    println!("{}", "-".repeat(40));
                    println!("{:<20} {}", "Base URL", shown.base_url);
                    println!(
                        "{:<20} {}",
                        "API Key",
                        shown.api_key.as_deref().unwrap_or("(not set)")
                    );
                    println!("{:<20} {}", "Output Format", shown.output_format);
                    println!("{:<20} {}", "Verbose", shown.verbose);
                    println!("{:<20} {}s", "Timeout", shown.timeout);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load_from(config_path)?;
            apply_setting(&mut config, &key, &value)?;
            config.save_to(config_path)?;
            debug!(key = %key, path = %config_path.display(), "config value saved");

            let shown = if key == "api_key" {
                config.redacted().api_key.unwrap_or_default()
            } else {
                value
            };
            println!("{}", format_success(&format!("Set {} = {}", key, shown)));
        }
        ConfigCommands::Reset => {
            CliConfig::default().save_to(config_path)?;
            println!("{}", format_success("Configuration reset to defaults"));
        }
    }

    Ok(())
}

/// Validate and apply one `config set` assignment
fn apply_setting(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "base_url" => {
            ConfigBuilder::new().with_base_url(value)?;
            config.base_url = value.to_string();
        }
        "api_key" => {
            config.api_key = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        "output_format" => {
            ConfigBuilder::new().with_output_format(value)?;
            config.output_format = value.to_string();
        }
        "verbose" => {
            config.verbose = value.to_lowercase() == "true" || value == "1";
        }
        "timeout" => {
            let timeout = value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid timeout value. Must be a number"))?;
            ConfigBuilder::new().with_timeout(timeout)?;
            config.timeout = timeout;
        }
        _ => return Err(anyhow::anyhow!("Unknown config key: {}", key)),
    }
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
