//! Local session status. Never touches the network.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coursehub_core::error::AppError;
use coursehub_core::traits::{Clock, SystemClock};
use coursehub_entity::session::token_fingerprint;
use coursehub_session::inspect_token;

use crate::output::{self, OutputFormat};

/// What `status` reports
#[derive(Debug, Serialize)]
struct StatusView {
    logged_in: bool,
    user: Option<String>,
    role: Option<String>,
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    verdict: String,
}

/// Execute status
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    let session = store.session();

    let view = match session.token() {
        None => StatusView {
            logged_in: false,
            user: None,
            role: None,
            token: None,
            expires_at: None,
            verdict: "no session".to_string(),
        },
        Some(token) => {
            let now = SystemClock.now();
            let (expires_at, verdict) = match inspect_token(token, now) {
                Ok(claims) => {
                    let left = claims.remaining(now);
                    (
                        Some(claims.expires_at),
                        format!("valid for {}m {}s", left.num_minutes(), left.num_seconds() % 60),
                    )
                }
                Err(reason) => (None, format!("invalid: {}", reason)),
            };
            StatusView {
                logged_in: true,
                user: session.user().map(|u| u.name.clone()),
                role: session.user().map(|u| u.role.to_string()),
                token: Some(token_fingerprint(token)),
                expires_at,
                verdict,
            }
        }
    };

    match format {
        OutputFormat::Json => output::print_json(&view),
        OutputFormat::Table => {
            if !view.logged_in {
                println!("Not logged in.");
                return Ok(());
            }
            output::print_kv("User", view.user.as_deref().unwrap_or("(not loaded)"));
            output::print_kv("Role", view.role.as_deref().unwrap_or("-"));
            output::print_kv("Token", view.token.as_deref().unwrap_or("-"));
            output::print_kv(
                "Expires",
                &view
                    .expires_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            output::print_kv("Liveness", &view.verdict);
            if view.verdict.starts_with("invalid") {
                output::print_warning(&config.session.expired_message);
            }
        }
    }

    Ok(())
}
