//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the FareBuddy application.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// The returned guard must stay alive for the whole process, or buffered
/// file output is lost.
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "farebuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log an executed flight search
pub fn log_search_executed(user_id: i64, flow: &str, origin: Option<&str>, offers: usize) {
    info!(
        user_id = user_id,
        flow = flow,
        origin = origin,
        offers = offers,
        "Flight search executed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str) {
    warn!(
        admin_id = admin_id,
        action = action,
        "Admin action performed"
    );
}
