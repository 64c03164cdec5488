//! # Structured Logging Module
//!
//! Console logging through `tracing-subscriber`, plus helpers that emit the
//! structured operation records used across the orchestration core.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::env_vars;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize logging; `RUST_LOG` wins over the verbosity-derived level
pub fn init_logging(verbosity: u8, json: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment, verbosity);
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::debug!(
            environment = %environment,
            log_level = %log_level,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env_vars::ENVIRONMENT).unwrap_or_else(|_| "production".to_string())
}

/// Get log level based on environment and `-v` count
fn get_log_level(environment: &str, verbosity: u8) -> String {
    let base = match environment {
        "test" | "development" => 2,
        _ => 1,
    };
    match base.max(verbosity) {
        0 => "warn".to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Log structured data for processor operations
pub fn log_processor_operation(
    operation: &str,
    processor_id: &str,
    processor_name: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        processor_id = %processor_id,
        processor_name = processor_name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "PROCESSOR_OPERATION"
    );
}

/// Log structured data for process group operations
pub fn log_group_operation(
    operation: &str,
    group_id: &str,
    branch: Option<&[String]>,
    status: &str,
    details: Option<&str>,
) {
    let branch = branch.map(|segments| segments.join(">"));
    tracing::info!(
        operation = %operation,
        group_id = %group_id,
        branch = branch.as_deref(),
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "GROUP_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
