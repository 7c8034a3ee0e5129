//! Error types for symbol table and registry construction

use crate::config::constants::compile_time::symbols::{MAX_QUALIFIER_LENGTH, MAX_SYMBOLS};

/// Result type for symbol table operations
pub type SymbolResult<T> = Result<T, SymbolError>;

/// Errors raised while building the session symbol table.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolError {
    #[error("Duplicate symbol '{qualifier}': '{identifier}' collides with an existing registration")]
    DuplicateSymbol {
        qualifier: String,
        identifier: String,
    },

    #[error("Symbol table full: {count} symbols (max {MAX_SYMBOLS})")]
    SymbolLimitExceeded { count: usize },

    #[error("Qualifier too long: '{identifier}' is {length} characters (max {MAX_QUALIFIER_LENGTH})")]
    QualifierTooLong { identifier: String, length: usize },

    #[error("Empty identifier cannot be registered as a symbol")]
    EmptyIdentifier,

    #[error("Model '{identifier}' declares {count} exchange items (max {max})")]
    TooManyExchangeItems {
        identifier: String,
        count: usize,
        max: usize,
    },

    #[error("Registry construction failed: {message}")]
    RegistryConstruction { message: String },
}

impl SymbolError {
    pub fn duplicate_symbol(qualifier: &str, identifier: &str) -> Self {
        Self::DuplicateSymbol {
            qualifier: qualifier.to_string(),
            identifier: identifier.to_string(),
        }
    }

    pub fn qualifier_too_long(identifier: &str) -> Self {
        Self::QualifierTooLong {
            identifier: identifier.to_string(),
            length: identifier.len(),
        }
    }

    pub fn registry_construction(message: &str) -> Self {
        Self::RegistryConstruction {
            message: message.to_string(),
        }
    }

    /// Get error code for the global logging system
    pub fn error_code(&self) -> crate::logging::Code {
        use crate::logging::codes;
        match self {
            Self::DuplicateSymbol { .. } => codes::symbols::DUPLICATE_SYMBOL,
            Self::SymbolLimitExceeded { .. } => codes::symbols::SYMBOL_LIMIT_EXCEEDED,
            Self::QualifierTooLong { .. } => codes::symbols::QUALIFIER_TOO_LONG,
            Self::EmptyIdentifier => codes::symbols::REGISTRY_CONSTRUCTION_ERROR,
            Self::TooManyExchangeItems { .. } => codes::symbols::REGISTRY_CONSTRUCTION_ERROR,
            Self::RegistryConstruction { .. } => codes::symbols::REGISTRY_CONSTRUCTION_ERROR,
        }
    }
}
