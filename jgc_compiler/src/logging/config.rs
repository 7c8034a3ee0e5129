//! Configuration access for the logging layer
//!
//! Resource bounds come from compile-time constants and cannot be
//! modified at runtime; user preferences control formatting and levels.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install the session's logging preferences. May be called at most once,
/// before `init_global_logging`; later reads fall back to defaults if it
/// never ran.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    // Structured JSON and the cargo-style summary share stdout; one stream
    // cannot carry both formats
    if preferences.use_structured_logging && preferences.enable_cargo_style_output {
        return Err(
            "Structured logging and cargo-style output cannot both be enabled".to_string(),
        );
    }
    Ok(())
}

/// Minimum level events must reach to be emitted.
pub fn get_min_log_level() -> crate::logging::events::LogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Whether events render as JSON lines instead of human-readable text.
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Whether the closing cargo-style diagnostic summary is printed.
pub fn use_cargo_style_output() -> bool {
    get_runtime_preferences().enable_cargo_style_output
}

/// Capacity of the in-memory event buffer.
pub fn get_error_buffer_size() -> usize {
    MAX_ERROR_COLLECTION
}

/// Sanity-check the compile-time bounds and any installed preferences.
/// Runs once during `init_global_logging`.
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&MAX_ERROR_COLLECTION) {
        return Err(format!(
            "Error collection buffer out of range: {}",
            MAX_ERROR_COLLECTION
        ));
    }

    if MAX_LOG_EVENTS_PER_SCRIPT > MAX_ERROR_COLLECTION {
        return Err("Max log events per script exceeds total buffer size".to_string());
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Render the effective configuration for the diagnostics report.
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    [
        "Logging Configuration:".to_string(),
        format!("- Error collection buffer: {}", MAX_ERROR_COLLECTION),
        format!("- Max events per script: {}", MAX_LOG_EVENTS_PER_SCRIPT),
        format!("- Max message length: {}", MAX_LOG_MESSAGE_LENGTH),
        format!("- Min log level: {}", preferences.min_log_level.as_str()),
        format!("- Structured logging: {}", preferences.use_structured_logging),
        format!(
            "- Cargo-style output: {}",
            preferences.enable_cargo_style_output
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_passes() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn conflicting_output_formats_rejected() {
        let invalid_prefs = LoggingPreferences {
            use_structured_logging: true,
            enable_cargo_style_output: true,
            ..Default::default()
        };

        assert!(validate_preferences(&invalid_prefs).is_err());
    }

    #[test]
    fn compile_time_bounds_are_consistent() {
        assert!(MAX_ERROR_COLLECTION > 0);
        assert!(MAX_LOG_EVENTS_PER_SCRIPT > 0);
        assert!(MAX_LOG_EVENTS_PER_SCRIPT <= MAX_ERROR_COLLECTION);
    }

    #[test]
    fn summary_reports_the_bounds_and_preferences() {
        let summary = get_config_summary();
        assert!(summary.contains("Error collection buffer"));
        assert!(summary.contains("Min log level"));
    }
}
