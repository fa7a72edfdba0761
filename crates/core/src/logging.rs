//! Logging infrastructure for the company chat service.
//!
//! This module initializes the tracing subscriber for structured logging.
//! All logs are emitted to stderr so `company-chat ask` can keep stdout
//! clean for its JSON payload.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the tracing subscriber with stderr output.
///
/// This sets up structured logging with:
/// - Output to stderr
/// - Environment-based filtering (RUST_LOG or provided level)
/// - Human-readable format by default, JSON lines when `json` is set
/// - Optional ANSI color control
///
/// # Arguments
/// * `log_level` - Optional log level override (e.g., "debug", "info")
/// * `no_color` - Disable colored output
/// * `json` - Emit one JSON object per event (for hosted log collectors)
///
/// # Example
/// ```no_run
/// use company_chat_core::logging::init_logging;
///
/// init_logging(None, false, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool, json: bool) -> AppResult<()> {
    let filter_str = resolve_filter(log_level);

    let env_filter = EnvFilter::try_new(&filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(!no_color && supports_color()),
            )
            .try_init()
    };

    result.map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))
}

/// Pick the filter directive: explicit level, then `RUST_LOG`, then `info`.
fn resolve_filter(log_level: Option<&str>) -> String {
    match log_level {
        Some(level) if !level.trim().is_empty() => level.to_string(),
        _ => std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
    }
}

/// Check if the terminal supports color output.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filter_prefers_explicit_level() {
        assert_eq!(resolve_filter(Some("debug")), "debug");
        assert_eq!(
            resolve_filter(Some("company_chat_answer=trace")),
            "company_chat_answer=trace"
        );
    }

    #[test]
    fn test_init_logging() {
        // Only the first subscriber per process wins
        let result = init_logging(Some("warn"), true, false);
        assert!(result.is_ok() || result.is_err());
    }
}
