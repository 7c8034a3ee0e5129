//! Session-global diagnostics: one logging service and one error collector
//! shared by every compile unit
//!
//! Scanners and parsers report through the `log_*` macros; the pipeline
//! brackets each unit with a script context so errors land in the right
//! per-script bucket of the collector.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{DiagnosticCollector, ProcessingSummary, ScriptContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_COLLECTOR: OnceLock<Arc<DiagnosticCollector>> = OnceLock::new();

thread_local! {
    static SCRIPT_CONTEXT: RefCell<Option<ScriptContext>> = RefCell::new(None);
}

/// Diagnostic codes spot-checked at startup, one per taxonomy family.
/// A miss means the metadata registry lost a family.
const STARTUP_CODE_CHECK: [&str; 7] = ["ERR001", "E005", "E024", "E040", "E050", "E060", "E090"];

/// Stand up the global logging service and diagnostic collector.
///
/// Must run once per process before any compile work; until it does, the
/// `log_*` macros are silent no-ops.
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in STARTUP_CODE_CHECK {
        if codes::get_description(code) == "Unknown diagnostic" {
            return Err(format!("Missing metadata for diagnostic code: {}", code));
        }
    }

    let service = Arc::new(LoggingService::with_config());
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized")?;
    GLOBAL_COLLECTOR
        .set(Arc::new(DiagnosticCollector::new()))
        .map_err(|_| "Global diagnostic collector already initialized")?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Whether both global halves are in place.
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_collector() -> Option<&'static DiagnosticCollector> {
    GLOBAL_COLLECTOR.get().map(|collector| collector.as_ref())
}

/// Point this thread's subsequent log events at the given script.
pub fn set_script_context(script_path: PathBuf, script_id: usize) {
    let context = ScriptContext::new(script_path, script_id);

    if let Some(collector) = try_get_global_collector() {
        collector.record_script_context(context.clone());
    }

    SCRIPT_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(context));
}

/// Detach this thread from any script context.
pub fn clear_script_context() {
    SCRIPT_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` under the given script context, clearing it afterwards.
pub fn with_script_context<F, R>(script_path: PathBuf, script_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_script_context(script_path, script_id);
    let result = f();
    clear_script_context();
    result
}

fn current_script_context() -> Option<ScriptContext> {
    SCRIPT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Context pairs assembled by the logging macros. Values arrive already
/// rendered so the macros can accept any `Display` type.
pub type MacroContext = Vec<(&'static str, String)>;

fn attach_context(mut event: LogEvent, context: MacroContext) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, &value);
    }
    event
}

fn stamp_script(mut event: LogEvent) -> LogEvent {
    if let Some(ctx) = current_script_context() {
        event = event.with_context("script", &ctx.script_path.display().to_string());
    }
    event
}

fn forward(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Support for `log_error!`. Errors raised inside a script context also
/// join the per-script diagnostic collection.
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: MacroContext,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    event = attach_context(event, context);

    let script = current_script_context();
    if let Some(ctx) = &script {
        event = event
            .with_context("script", &ctx.script_path.display().to_string())
            .with_context("script_id", &ctx.script_id.to_string());
    }

    if let Some(ctx) = &script {
        if let Some(collector) = try_get_global_collector() {
            collector.record_event(&ctx.script_path, event.clone());
        }
    }

    forward(event);
}

/// Support for `log_success!`.
pub fn log_success_with_context(code: Code, message: &str, context: MacroContext) {
    let mut event = attach_context(LogEvent::success(code, message), context);
    if let Some(ctx) = current_script_context() {
        event = event
            .with_context("script", &ctx.script_path.display().to_string())
            .with_context("script_id", &ctx.script_id.to_string());
    }
    forward(event);
}

/// Support for `log_info!`.
pub fn log_info_with_context(message: &str, context: MacroContext) {
    forward(stamp_script(attach_context(LogEvent::info(message), context)));
}

/// Support for `log_warning!`.
pub fn log_warning_with_context(message: &str, context: MacroContext) {
    forward(stamp_script(attach_context(LogEvent::warning(message), context)));
}

/// Support for `log_debug!`; the macro performs the level check so context
/// strings are never rendered for suppressed events.
pub fn log_debug_with_context(message: &str, context: MacroContext) {
    forward(stamp_script(attach_context(LogEvent::debug(message), context)));
}

/// Print the collector's cargo-style closing summary, unless the session
/// preferences suppress it.
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    match try_get_global_collector() {
        Some(collector) => println!("{}", collector::format_cargo_style_diagnostics(collector)),
        None => println!("No diagnostic collector available for summary"),
    }
}

/// One-stop report of logging state, collector occupancy and effective
/// configuration.
pub fn get_system_diagnostics() -> String {
    use std::fmt::Write;

    let mut report = String::from("=== Logging System Diagnostics ===\n");
    let _ = writeln!(report, "Initialized: {}", is_initialized());

    if let Some(collector) = try_get_global_collector() {
        let (used, capacity, fill) = collector.get_capacity_info();
        let _ = writeln!(report, "Capacity: {}/{} ({:.1}%)", used, capacity, fill * 100.0);

        let summary = collector.get_summary();
        let _ = writeln!(report, "Scripts processed: {}", summary.total_scripts);
        let _ = writeln!(report, "Total errors: {}", summary.total_errors);
        let _ = writeln!(report, "Total warnings: {}", summary.total_warnings);
    }

    report.push('\n');
    report.push_str(&config::get_config_summary());
    report
}

/// Last-resort error reporting for failures before or during logging
/// startup; always reaches stderr.
pub fn safe_log_critical(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    }
    eprintln!("CRITICAL ERROR [{}]: {}", code.as_str(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_context_management() {
        let script_path = PathBuf::from("basin.jgs");

        assert!(current_script_context().is_none());

        set_script_context(script_path.clone(), 1);
        let context = current_script_context();
        assert!(context.is_some());
        assert_eq!(context.unwrap().script_path, script_path);

        clear_script_context();
        assert!(current_script_context().is_none());
    }

    #[test]
    fn with_script_context_restores_state() {
        let script_path = PathBuf::from("drainage.jgrass");

        let result = with_script_context(script_path.clone(), 2, || {
            let context = current_script_context();
            assert!(context.is_some());
            assert_eq!(context.unwrap().script_path, script_path);
            42
        });

        assert_eq!(result, 42);
        assert!(current_script_context().is_none());
    }

    #[test]
    fn critical_logging_never_panics() {
        safe_log_critical(codes::system::INTERNAL_ERROR, "test critical error");
    }

    #[test]
    fn diagnostics_always_render() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
