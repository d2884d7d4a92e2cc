//! CourseHub Agent
//!
//! Long-running client process: restores the persisted session, watches
//! its token for expiry, and keeps the notification inbox fresh.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use coursehub_api::HttpApiClient;
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::poll;
use coursehub_core::traits::SystemClock;
use coursehub_notify::{NotificationPoller, PollerConfig};
use coursehub_session::liveness::LoggingLogoutHandler;
use coursehub_session::storage::FileStorage;
use coursehub_session::{LivenessConfig, SessionLivenessMonitor, SessionStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("COURSEHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CourseHub agent v{}", env!("CARGO_PKG_VERSION"));

    let storage = FileStorage::new(&config.session.storage_path);
    tracing::info!("Session file: {}", storage.path().display());
    let store = Arc::new(SessionStore::open(Arc::new(storage))?);

    let monitor = Arc::new(SessionLivenessMonitor::new(
        Arc::clone(&store),
        Arc::new(SystemClock),
        Arc::new(LoggingLogoutHandler),
        LivenessConfig::from(&config.session),
    ));
    let monitor_handle = monitor.start();

    let poller_handle = if config.notifications.enabled {
        let api = Arc::new(HttpApiClient::new(&config.api)?);
        tracing::info!("Polling notifications from {}", api.base_url());
        let poller = NotificationPoller::new(
            api,
            Arc::clone(&store),
            PollerConfig::from(&config.notifications),
        );
        Some((poller.start(), poller))
    } else {
        tracing::info!("Notification polling disabled");
        None
    };

    if !store.is_authenticated() {
        tracing::warn!("No stored session; run `coursehub login` to sign in");
    }

    match &poller_handle {
        Some((_, poller)) => report_unread(poller, &config).await,
        None => shutdown_signal().await,
    }
    tracing::info!("Shutdown signal received");

    monitor_handle.stop().await;
    if let Some((handle, _)) = poller_handle {
        handle.stop().await;
    }

    tracing::info!("CourseHub agent stopped");
    Ok(())
}

/// Log the unread counter whenever it changes, until shutdown.
async fn report_unread(poller: &NotificationPoller, config: &AppConfig) {
    let mut ticker = poll::ticker(config.notifications.poll_interval());
    let mut last: Option<u64> = None;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let count = poller.unread_count().await;
                if last != Some(count) {
                    tracing::info!(unread = count, "Unread notifications");
                    last = Some(count);
                }
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
