//! Logging service and output sinks
//!
//! A [`LoggingService`] owns one sink and applies the level filter in a
//! single place; sinks only format and write. The memory sink exists so
//! tests can assert on emitted events without capturing stdout.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex};

/// Output sink for log events. The service has already filtered by level
/// when a sink sees an event.
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front door for all event emission.
pub struct LoggingService {
    sink: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    /// Build the sink the runtime preferences ask for.
    pub fn with_config() -> Self {
        let sink: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };
        Self::new(sink, config::get_min_log_level())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.sink.log(&event);
        }
    }
}

/// Human-readable sink. Errors go to stderr so compile output stays
/// pipeable; everything else goes to stdout.
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.is_error() {
            eprintln!("{}", event.format());
        } else {
            println!("{}", event.format());
        }
    }
}

/// One JSON object per line, for tooling that consumes the event stream.
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        // Serialization failure falls back to the plain rendering rather
        // than dropping the event
        let rendered = event
            .format_json()
            .unwrap_or_else(|_| event.format());
        if event.is_error() {
            eprintln!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }
}

/// Capturing sink for tests. Bounded by the error buffer size; once full,
/// the oldest events are discarded first.
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.filtered(LogEvent::is_error)
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.filtered(LogEvent::is_warning)
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|event| event.is_error() && event.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|event| event.is_info() && event.code == code)
    }

    fn filtered(&self, keep: fn(&LogEvent) -> bool) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| keep(event))
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events.lock().unwrap();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn service_filters_below_min_level() {
        let sink = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(sink.clone(), LogLevel::Error);

        service.log_event(LogEvent::debug("transition trace"));
        service.log_event(LogEvent::info("classifying line"));
        service.log_event(LogEvent::error(
            codes::system::INTERNAL_ERROR,
            "broken invariant",
        ));

        assert_eq!(sink.event_count(), 1);
        assert!(sink.has_error_with_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn service_passes_everything_at_debug_level() {
        let sink = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(sink.clone(), LogLevel::Debug);

        service.log_event(LogEvent::debug("catalog rule matched"));
        service.log_event(LogEvent::success(
            codes::success::TOKENIZATION_COMPLETE,
            "scan done",
        ));

        assert_eq!(sink.event_count(), 2);
        assert!(sink.has_success_with_code(codes::success::TOKENIZATION_COMPLETE));
    }

    #[test]
    fn memory_sink_queries_by_level() {
        let sink = MemoryLogger::new();

        sink.log(&LogEvent::error(
            codes::component::UNKNOWN_TYPE,
            "unknown type `h_pit`",
        ));
        sink.log(&LogEvent::warning("rescued `@@`"));
        sink.log(&LogEvent::info("statement routed"));

        assert_eq!(sink.get_errors().len(), 1);
        assert_eq!(sink.get_warnings().len(), 1);
        assert_eq!(sink.event_count(), 3);

        sink.clear();
        assert_eq!(sink.event_count(), 0);
    }

    #[test]
    fn memory_sink_drops_oldest_past_capacity() {
        let sink = MemoryLogger::new();
        let capacity = config::get_error_buffer_size();

        for n in 0..capacity + 3 {
            sink.log(&LogEvent::info(&format!("event {}", n)));
        }

        let events = sink.get_events();
        assert_eq!(events.len(), capacity);
        assert_eq!(events[0].message, "event 3");
        assert_eq!(events.last().unwrap().message, format!("event {}", capacity + 2));
    }

    #[test]
    fn console_and_structured_sinks_render_without_panicking() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "missing script")
            .with_context("path", "flood.jgs");

        ConsoleLogger.log(&event);
        StructuredLogger.log(&event);
    }

    #[test]
    fn with_config_defaults_filter_debug() {
        let service = LoggingService::with_config();
        assert!(service.should_log(LogLevel::Info));
        assert!(!service.should_log(LogLevel::Debug));
    }
}
