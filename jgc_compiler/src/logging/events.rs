//! Log events carrying diagnostic codes, spans and context
//!
//! Every emission in the front end goes through [`LogEvent`]. Behavioral
//! questions about an event (does it halt the script? is it recoverable?)
//! are answered by the code registry, never stored on the event itself.

use super::codes::Code;
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::utils::Span;
use std::collections::HashMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

/// One diagnostic or progress event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: clip_message(message).to_string(),
            span: None,
            context: HashMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Warning without a specific code; rescue warnings and advisory
    /// notices use this.
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info-level event carrying one of the I0xx completion codes.
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Whether this event abandons the current compile unit.
    pub fn halts_script(&self) -> bool {
        super::codes::halts_script(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// One-line rendering for console output.
    pub fn format(&self) -> String {
        let mut rendered = format!("{} {}: {}", self.level.as_str(), self.code, self.message);
        if let Some(span) = &self.span {
            rendered.push_str(&format!(" ({}:{})", span.start.line, span.start.column));
        }
        rendered
    }

    /// Multi-line rendering with the classification metadata attached.
    pub fn format_detailed(&self) -> String {
        use std::fmt::Write;

        let mut out = self.format();
        let _ = write!(out, "\n  Category: {}", self.category());
        let _ = write!(out, "\n  Severity: {}", self.severity());

        if self.is_error() {
            let _ = write!(out, "\n  Recoverable: {}", self.is_recoverable());
            let _ = write!(out, "\n  Halts script: {}", self.halts_script());
        }

        let description = self.description();
        if description != "Unknown diagnostic" {
            let _ = write!(out, "\n  Description: {}", description);
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            let _ = write!(out, "\n  Recommended action: {}", action);
        }

        if !self.context.is_empty() {
            out.push_str("\n  Context:");
            for (key, value) in &self.context {
                let _ = write!(out, "\n    {}: {}", key, value);
            }
        }

        out
    }

    /// One JSON object for structured logging.
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let unix_seconds = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut body = serde_json::Map::new();
        body.insert("timestamp".to_string(), unix_seconds.into());
        body.insert("level".to_string(), self.level.as_str().into());
        body.insert("code".to_string(), self.code.as_str().into());
        body.insert("message".to_string(), self.message.clone().into());
        body.insert("category".to_string(), self.category().into());
        body.insert("severity".to_string(), self.severity().into());

        if self.is_error() {
            body.insert(
                "error_metadata".to_string(),
                serde_json::json!({
                    "recoverable": self.is_recoverable(),
                    "halts_script": self.halts_script(),
                    "description": self.description(),
                    "recommended_action": self.recommended_action(),
                }),
            );
        }

        if let Some(span) = &self.span {
            body.insert(
                "span".to_string(),
                serde_json::json!({
                    "start_line": span.start.line,
                    "start_column": span.start.column,
                    "end_line": span.end.line,
                    "end_column": span.end.column,
                }),
            );
        }

        if !self.context.is_empty() {
            let context: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(key, value)| (key.clone(), value.clone().into()))
                .collect();
            body.insert("context".to_string(), context.into());
        }

        serde_json::to_string(&body)
    }
}

/// Cap stored messages at `MAX_LOG_MESSAGE_LENGTH` bytes without cutting
/// through a character.
fn clip_message(message: &str) -> &str {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message;
    }
    let mut end = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn error_event_creation() {
        let event = LogEvent::error(codes::component::UNKNOWN_TYPE, "unknown type `h_ab`");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E050");
        assert_eq!(event.category(), "ComponentModel");
        assert!(event.halts_script());
    }

    #[test]
    fn success_event_creation() {
        let event = LogEvent::success(codes::success::PARSE_TREE_COMPLETE, "tree built");

        assert!(event.is_info());
        assert_eq!(event.code.as_str(), "I040");
    }

    #[test]
    fn event_with_context_and_span() {
        let event = LogEvent::error(codes::syntax::UNEXPECTED_TOKEN, "unexpected token")
            .with_context("token", "--igrass-pit")
            .with_span(crate::utils::Span::from_offsets(3, 15));

        assert_eq!(
            event.context.get("token"),
            Some(&"--igrass-pit".to_string())
        );
        assert!(event.span.is_some());
    }

    #[test]
    fn event_formatting() {
        let event = LogEvent::error(codes::lexical::UNMATCHED_LEXEME, "rescued lexeme");
        let formatted = event.format();

        assert!(formatted.starts_with("ERROR E024:"));
        assert!(formatted.contains("rescued lexeme"));
    }

    #[test]
    fn warning_events() {
        let generic = LogEvent::warning("whitespace only input");
        assert!(generic.is_warning());
        assert_eq!(generic.code.as_str(), "W000");

        let specific =
            LogEvent::warning_with_code(codes::lexical::UNMATCHED_LEXEME, "rescued `@@`");
        assert!(specific.is_warning());
        assert!(specific.is_recoverable());
    }

    #[test]
    fn oversized_messages_are_clipped() {
        let long = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 50);
        let event = LogEvent::info(&long);
        assert_eq!(event.message.len(), MAX_LOG_MESSAGE_LENGTH);
    }

    #[test]
    fn detailed_formatting_includes_classification() {
        let event = LogEvent::error(codes::lexical::UNMATCHED_LEXEME, "rescued lexeme")
            .with_context("lexeme", "@@");

        let detailed = event.format_detailed();
        assert!(detailed.contains("Severity: Low"));
        assert!(detailed.contains("Recoverable: true"));
        assert!(detailed.contains("lexeme: @@"));
    }

    #[test]
    fn json_formatting() {
        let event = LogEvent::error(codes::component::NO_DEFAULT_KEY_DECLARED, "no default key")
            .with_context("model", "h_ab");

        let json = event.format_json().unwrap();
        assert!(json.contains("\"level\":\"ERROR\""));
        assert!(json.contains("\"code\":\"E053\""));
        assert!(json.contains("h_ab"));
    }
}
