//! Diagnostic logging macros
//!
//! Call sites attach context as `"key" => value` pairs where the value is
//! any `Display` type. Pairs are rendered eagerly into owned strings and
//! handed to the support functions in [`crate::logging`].

/// Emit an error diagnostic under the given code.
///
/// A source span may follow the message as `span = <expr>`; context pairs
/// come last.
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            Some($span),
            vec![$(($key, $value.to_string())),*],
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            None,
            vec![$(($key, $value.to_string())),*],
        )
    };
}

/// Emit a success diagnostic under the given code.
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::log_success_with_context(
            $code,
            $message,
            vec![$(($key, $value.to_string())),*],
        )
    };
}

/// Emit an uncoded informational event.
#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::log_info_with_context($message, vec![$(($key, $value.to_string())),*])
    };
}

/// Emit an uncoded warning.
#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::log_warning_with_context($message, vec![$(($key, $value.to_string())),*])
    };
}

/// Emit a debug event. Context rendering is skipped entirely unless the
/// configured level admits debug output.
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::log_debug_with_context(
                $message,
                vec![$(($key, $value.to_string())),*],
            );
        }
    };
}
