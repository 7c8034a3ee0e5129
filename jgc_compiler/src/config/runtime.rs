//! Session preferences read from the environment
//!
//! Each preference group maps to one consumer stage; everything here has
//! a default, so an empty environment is a fully configured session.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable names for every runtime preference.
pub mod env_vars {
    // file staging
    pub const REQUIRE_SCRIPT_EXTENSION: &str = "JGC_REQUIRE_SCRIPT_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "JGC_ENABLE_PERFORMANCE_LOGGING";

    // scanners
    pub const LEXICAL_DETAILED_METRICS: &str = "JGC_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_RESCUED: &str = "JGC_LEXICAL_LOG_RESCUED";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "JGC_LEXICAL_INCLUDE_POSITIONS";

    // parsers
    pub const PARSER_TRACE_TRANSITIONS: &str = "JGC_PARSER_TRACE_TRANSITIONS";
    pub const PARSER_ANCHOR_MODEL_TOKEN: &str = "JGC_PARSER_ANCHOR_MODEL_TOKEN";

    // pipeline
    pub const PIPELINE_WARN_UNKNOWN: &str = "JGC_PIPELINE_WARN_UNKNOWN";
    pub const PIPELINE_INCLUDE_STATS: &str = "JGC_PIPELINE_INCLUDE_STATS";

    // logging
    pub const LOGGING_USE_STRUCTURED: &str = "JGC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "JGC_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "JGC_LOGGING_CARGO_STYLE";
}

/// Boolean preference from the environment, or `default` when the variable
/// is unset or not a bool.
fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Whether to require a .jgs/.jgrass extension before compiling a file
    pub require_script_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_script_extension: env_flag(env_vars::REQUIRE_SCRIPT_EXTENSION, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect per-scan token metrics
    pub collect_detailed_metrics: bool,

    /// Whether unmatched lexemes are logged as warnings when rescued
    pub log_rescued_lexemes: bool,

    /// Whether scanner errors carry line and column positions
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_rescued_lexemes: env_flag(env_vars::LEXICAL_LOG_RESCUED, true),
            include_position_in_errors: env_flag(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Whether parsers log every state transition at debug level
    pub trace_transitions: bool,

    /// Whether diagnostics include the model token alongside the offender
    pub anchor_model_token: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            trace_transitions: env_flag(env_vars::PARSER_TRACE_TRANSITIONS, false),
            anchor_model_token: env_flag(env_vars::PARSER_ANCHOR_MODEL_TOKEN, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePreferences {
    /// Whether rescued UNKNOWN tokens surface as warnings in the report
    pub warn_on_unknown_tokens: bool,

    /// Whether compile stats are attached to successful reports
    pub include_compile_stats: bool,
}

impl Default for PipelinePreferences {
    fn default() -> Self {
        Self {
            warn_on_unknown_tokens: env_flag(env_vars::PIPELINE_WARN_UNKNOWN, true),
            include_compile_stats: env_flag(env_vars::PIPELINE_INCLUDE_STATS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to print the cargo-style diagnostic summary after a run
    pub enable_cargo_style_output: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|value| parse_log_level(&value))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// The equivalent level in the event system.
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse a `JGC_LOGGING_MIN_LEVEL` value: level names or their digits.
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parsing_accepts_names_and_digits() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn unset_variables_yield_the_documented_defaults() {
        assert!(env_flag("JGC_TEST_SURELY_UNSET_FLAG", true));
        assert!(!env_flag("JGC_TEST_SURELY_UNSET_FLAG", false));
    }

    #[test]
    fn extension_check_defaults_off() {
        // The console accepts extensionless paths unless the user opts in.
        let preferences = FileProcessorPreferences::default();
        assert!(!preferences.require_script_extension);
        assert!(preferences.enable_performance_logging);
    }
}
