//! CLI command definitions and dispatch.

pub mod config;
pub mod login;
pub mod logout;
pub mod notifications;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use coursehub_api::HttpApiClient;
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_session::SessionStore;
use coursehub_session::storage::FileStorage;

use crate::output::OutputFormat;

/// CourseHub client for the stored session and the notification inbox
#[derive(Debug, Parser)]
#[command(name = "coursehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login(login::LoginArgs),
    /// Sign out and clear the stored session
    Logout,
    /// Show the stored session and whether its token is still usable
    Status,
    /// Notification inbox
    Notifications(notifications::NotificationArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Login(args) => login::execute(args, &self.config, self.format).await,
            Commands::Logout => logout::execute(&self.config).await,
            Commands::Status => status::execute(&self.config, self.format).await,
            Commands::Notifications(args) => {
                notifications::execute(args, &self.config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: open the file-backed session store named in the config
pub fn open_store(config: &AppConfig) -> Result<Arc<SessionStore>, AppError> {
    let storage = FileStorage::new(&config.session.storage_path);
    Ok(Arc::new(SessionStore::open(Arc::new(storage))?))
}

/// Helper: build the backend client
pub fn api_client(config: &AppConfig) -> Result<Arc<HttpApiClient>, AppError> {
    Ok(Arc::new(HttpApiClient::new(&config.api)?))
}
