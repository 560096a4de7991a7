//! CLI command and subcommand definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Carespace API CLI
#[derive(Parser, Debug)]
#[command(name = "carespacectl")]
#[command(version, about = "Carespace API command-line client", long_about = None)]
pub struct Cli {
    /// API base URL (overrides config file)
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// API key or access token (overrides config file)
    #[arg(short = 'k', long, global = true)]
    pub api_key: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in seconds (overrides config file)
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: <config dir>/carespace/cli.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login {
        /// Account email
        email: String,

        /// Account password
        password: String,

        /// Store the access token in the config file
        #[arg(long)]
        save: bool,
    },

    /// Check API connectivity and credentials
    Health,

    /// User management commands
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },

    /// Client management commands
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },

    /// Program management commands
    Programs {
        #[command(subcommand)]
        command: ProgramsCommands,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Paging options shared by list commands
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page (1-100)
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List users
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a single user
    Get {
        /// User ID
        id: String,
    },

    /// Show the profile of the authenticated user
    Profile,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommands {
    /// List clients
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a single client
    Get {
        /// Client ID
        id: String,
    },

    /// Show session statistics for a client
    Stats {
        /// Client ID
        id: String,
    },

    /// List programs assigned to a client
    Programs {
        /// Client ID
        id: String,

        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProgramsCommands {
    /// List programs
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by difficulty
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Show a program and its exercises
    Get {
        /// Program ID
        id: String,
    },

    /// List the exercises of a program
    Exercises {
        /// Program ID
        id: String,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (1-100)
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// List program templates
    Templates {
        #[command(flatten)]
        page: PageArgs,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (base_url, api_key, output_format, verbose, timeout)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}
