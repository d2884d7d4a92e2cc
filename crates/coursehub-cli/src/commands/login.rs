//! Sign-in command.

use clap::Args;

use coursehub_api::AuthApi;
use coursehub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Execute login
pub async fn execute(
    args: &LoginArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let api = super::api_client(&config)?;

    let email = match &args.email {
        Some(email) => email.clone(),
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?,
    };

    let password = match &args.password {
        Some(password) => password.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {}", e)))?,
    };

    let login = api.login(&email, &password).await?;
    let user = login.user.clone();
    store.set_session(login.token, Some(login.user))?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Logged in as {} ({})", user.name, user.role));
            output::print_kv("Dashboard", user.role.dashboard_route());
        }
        OutputFormat::Json => output::print_json(&user),
    }

    Ok(())
}
