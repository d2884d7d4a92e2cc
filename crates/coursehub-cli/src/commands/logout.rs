//! Sign-out command.

use coursehub_api::AuthApi;
use coursehub_core::error::AppError;

use crate::output;

/// Execute logout. The server call is best effort; the local session is
/// always cleared.
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;

    let Some(token) = store.token() else {
        println!("Not logged in.");
        return Ok(());
    };

    let api = super::api_client(&config)?;
    if let Err(e) = api.logout(&token).await {
        tracing::debug!("Server logout failed: {}", e);
        output::print_warning("Server did not confirm the logout; local session cleared anyway");
    }

    store.clear_session()?;
    output::print_success("Logged out");
    Ok(())
}
