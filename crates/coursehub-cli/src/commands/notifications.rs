//! Notification inbox commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use coursehub_core::error::AppError;
use coursehub_entity::notification::NotificationRecord;
use coursehub_notify::{NotificationPoller, PollerConfig};

use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List unread notifications
    List {
        /// Include notifications already read
        #[arg(long)]
        all: bool,
    },
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification read
    ReadAll,
    /// Delete one notification
    Delete {
        /// Notification ID
        id: String,
    },
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// ID
    id: String,
    /// Title
    title: String,
    /// Course
    course: String,
    /// Created
    created: String,
    /// Read
    read: String,
}

impl From<&NotificationRecord> for NotificationRow {
    fn from(n: &NotificationRecord) -> Self {
        Self {
            id: n.id.clone(),
            title: n.title.clone(),
            course: n
                .related_course
                .as_ref()
                .and_then(|c| c.name.clone())
                .unwrap_or_default(),
            created: n
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            read: if n.read { "✓" } else { "" }.to_string(),
        }
    }
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(&config)?;
    if !store.is_authenticated() {
        return Err(AppError::session("Not logged in. Run `coursehub login` first"));
    }

    let api = super::api_client(&config)?;
    let poller = NotificationPoller::new(
        api,
        Arc::clone(&store),
        PollerConfig::from(&config.notifications),
    );

    match &args.command {
        NotificationCommand::List { all } => {
            poller.fetch().await?;
            let cache = poller.snapshot().await;
            let records = if *all {
                cache.records().to_vec()
            } else {
                cache.unread()
            };
            let rows: Vec<NotificationRow> = records.iter().map(NotificationRow::from).collect();

            output::print_list(&rows, format, "No notifications.");
            if format == OutputFormat::Table {
                println!("Unread: {}", cache.unread_count());
            }
        }
        NotificationCommand::Read { id } => {
            poller.mark_read(id).await?;
            output::print_success(&format!("Notification {} marked read", id));
        }
        NotificationCommand::ReadAll => {
            poller.mark_all_read().await?;
            output::print_success("All notifications marked read");
        }
        NotificationCommand::Delete { id } => {
            poller.delete(id).await?;
            output::print_success(&format!("Notification {} deleted", id));
        }
    }

    Ok(())
}
