//! Error types for the statement parsers with global logging integration
//!
//! Every variant carries the span of the offending lexeme; parsers inside
//! a model scope widen that span over the model token as well, so one
//! diagnostic can point at both ends of the problem.

use crate::config::constants::compile_time::pipeline::MAX_BLOCK_DEPTH;
use crate::config::constants::compile_time::syntax::MAX_STATEMENT_TOKENS;
use crate::logging::{codes, Code};
use crate::symbols::SymbolKind;
use crate::utils::Span;

pub type ParseResult<T> = Result<T, ParseError>;

/// Statement parsing errors, both grammatical and semantic.
///
/// One statement failing aborts the whole compile unit, so a parser
/// reports the first error it meets and stops.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found '{found}' at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Statement ended while expecting {expected}")]
    UnexpectedEndOfStatement { expected: String, span: Span },

    #[error("Expected {expected}, found '{found}' at {span}")]
    ExpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Extra token '{found}' after a complete production at {span}")]
    UnexpectedExtraToken { found: String, span: Span },

    #[error("Malformed exchange reference for quantity '{quantity}': found '{found}' at {span}")]
    MalformedExchangeReference {
        quantity: String,
        found: String,
        span: Span,
    },

    #[error("Expected '=' after '{target}', found '{found}' at {span}")]
    ExpectedAssignment {
        target: String,
        found: String,
        span: Span,
    },

    #[error("Expected a value for argument '{name}', found '{found}' at {span}")]
    ExpectedArgumentValue {
        name: String,
        found: String,
        span: Span,
    },

    #[error("Unmatched block delimiter '{delimiter}' at {span}")]
    UnmatchedBlockDelimiter { delimiter: String, span: Span },

    #[error("Statement too long: {count} tokens (max {MAX_STATEMENT_TOKENS})")]
    StatementTooLong { count: usize, span: Span },

    #[error("Block nesting too deep: {depth} levels (max {MAX_BLOCK_DEPTH})")]
    BlockNestingTooDeep { depth: usize, span: Span },

    #[error("Unknown type '{qualifier}' at {span}")]
    UnknownType { qualifier: String, span: Span },

    #[error("Native model '{qualifier}' cannot appear in a component-model statement at {span}")]
    NativeTokenInComponent { qualifier: String, span: Span },

    #[error("Statement already invokes a model, found second model '{qualifier}' at {span}")]
    DuplicateModelInStatement { qualifier: String, span: Span },

    #[error("Model '{qualifier}' declares no default key for bare value '{value}' at {span}")]
    NoDefaultKeyDeclared {
        qualifier: String,
        value: String,
        span: Span,
    },

    #[error(
        "Exchange quantity '{quantity}' of model '{qualifier}' has backing type \
         '{backing_type}' which does not resolve to a class at {span}"
    )]
    UnresolvedExchangeType {
        qualifier: String,
        quantity: String,
        backing_type: String,
        span: Span,
    },

    #[error("Model '{qualifier}' declares no exchange items at {span}")]
    ModelHasNoExchangeItems { qualifier: String, span: Span },

    #[error("Model '{qualifier}' does not exchange quantity '{quantity}' at {span}")]
    UnsupportedExchangeItem {
        qualifier: String,
        quantity: String,
        span: Span,
    },

    #[error("Exchange flag '{flag}' outside a component model scope at {span}")]
    ItemOutsideModel { flag: String, span: Span },

    #[error("Bare value '{value}' outside a component model scope at {span}")]
    DefaultKeyOutsideModel { value: String, span: Span },

    #[error("Type '{qualifier}' is a {kind} and cannot be invoked at {span}")]
    TypeNotInvocable {
        qualifier: String,
        kind: SymbolKind,
        span: Span,
    },

    #[error("Component model '{qualifier}' cannot appear in a native command at {span}")]
    ComponentTokenInNative { qualifier: String, span: Span },

    #[error("Parameter flag '{flag}' outside a native model scope at {span}")]
    AssignOutsideModel { flag: String, span: Span },

    #[error("Parameter value '{value}' outside a native model scope at {span}")]
    ParameterOutsideModel { value: String, span: Span },
}

impl ParseError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end_of_statement(expected: &str, span: Span) -> Self {
        Self::UnexpectedEndOfStatement {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn expected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::ExpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_extra_token(found: &str, span: Span) -> Self {
        Self::UnexpectedExtraToken {
            found: found.to_string(),
            span,
        }
    }

    pub fn malformed_exchange_reference(quantity: &str, found: &str, span: Span) -> Self {
        Self::MalformedExchangeReference {
            quantity: quantity.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn expected_assignment(target: &str, found: &str, span: Span) -> Self {
        Self::ExpectedAssignment {
            target: target.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn expected_argument_value(name: &str, found: &str, span: Span) -> Self {
        Self::ExpectedArgumentValue {
            name: name.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unmatched_delimiter(delimiter: &str, span: Span) -> Self {
        Self::UnmatchedBlockDelimiter {
            delimiter: delimiter.to_string(),
            span,
        }
    }

    pub fn unknown_type(qualifier: &str, span: Span) -> Self {
        Self::UnknownType {
            qualifier: qualifier.to_string(),
            span,
        }
    }

    pub fn native_token_in_component(qualifier: &str, span: Span) -> Self {
        Self::NativeTokenInComponent {
            qualifier: qualifier.to_string(),
            span,
        }
    }

    pub fn duplicate_model(qualifier: &str, span: Span) -> Self {
        Self::DuplicateModelInStatement {
            qualifier: qualifier.to_string(),
            span,
        }
    }

    pub fn no_default_key(qualifier: &str, value: &str, span: Span) -> Self {
        Self::NoDefaultKeyDeclared {
            qualifier: qualifier.to_string(),
            value: value.to_string(),
            span,
        }
    }

    pub fn type_not_invocable(qualifier: &str, kind: SymbolKind, span: Span) -> Self {
        Self::TypeNotInvocable {
            qualifier: qualifier.to_string(),
            kind,
            span,
        }
    }

    pub fn component_token_in_native(qualifier: &str, span: Span) -> Self {
        Self::ComponentTokenInNative {
            qualifier: qualifier.to_string(),
            span,
        }
    }

    /// Diagnostic code for the global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfStatement { .. } => codes::syntax::UNEXPECTED_END_OF_STATEMENT,
            Self::ExpectedToken { .. } => codes::syntax::EXPECTED_TOKEN,
            Self::UnexpectedExtraToken { .. } => codes::syntax::UNEXPECTED_EXTRA_TOKEN,
            Self::MalformedExchangeReference { .. } => codes::syntax::MALFORMED_EXCHANGE_REFERENCE,
            Self::ExpectedAssignment { .. } => codes::syntax::EXPECTED_ASSIGNMENT,
            Self::ExpectedArgumentValue { .. } => codes::syntax::EXPECTED_ARGUMENT_VALUE,
            Self::UnmatchedBlockDelimiter { .. } => codes::syntax::UNMATCHED_BLOCK_DELIMITER,
            Self::StatementTooLong { .. } => codes::syntax::STATEMENT_TOO_LONG,
            Self::BlockNestingTooDeep { .. } => codes::syntax::BLOCK_NESTING_TOO_DEEP,
            Self::UnknownType { .. } => codes::component::UNKNOWN_TYPE,
            Self::NativeTokenInComponent { .. } => codes::component::NATIVE_TOKEN_IN_COMPONENT,
            Self::DuplicateModelInStatement { .. } => {
                codes::component::DUPLICATE_MODEL_IN_STATEMENT
            }
            Self::NoDefaultKeyDeclared { .. } => codes::component::NO_DEFAULT_KEY_DECLARED,
            Self::UnresolvedExchangeType { .. } => codes::component::UNRESOLVED_EXCHANGE_TYPE,
            Self::ModelHasNoExchangeItems { .. } => codes::component::MODEL_HAS_NO_EXCHANGE_ITEMS,
            Self::UnsupportedExchangeItem { .. } => codes::component::UNSUPPORTED_EXCHANGE_ITEM,
            Self::ItemOutsideModel { .. } => codes::component::ITEM_OUTSIDE_MODEL,
            Self::DefaultKeyOutsideModel { .. } => codes::component::DEFAULT_KEY_OUTSIDE_MODEL,
            Self::TypeNotInvocable { .. } => codes::component::TYPE_NOT_INVOCABLE,
            Self::ComponentTokenInNative { .. } => codes::native::COMPONENT_TOKEN_IN_NATIVE,
            Self::AssignOutsideModel { .. } => codes::native::ASSIGN_OUTSIDE_MODEL,
            Self::ParameterOutsideModel { .. } => codes::native::PARAMETER_OUTSIDE_MODEL,
        }
    }

    /// Span of the offending source
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfStatement { span, .. }
            | Self::ExpectedToken { span, .. }
            | Self::UnexpectedExtraToken { span, .. }
            | Self::MalformedExchangeReference { span, .. }
            | Self::ExpectedAssignment { span, .. }
            | Self::ExpectedArgumentValue { span, .. }
            | Self::UnmatchedBlockDelimiter { span, .. }
            | Self::StatementTooLong { span, .. }
            | Self::BlockNestingTooDeep { span, .. }
            | Self::UnknownType { span, .. }
            | Self::NativeTokenInComponent { span, .. }
            | Self::DuplicateModelInStatement { span, .. }
            | Self::NoDefaultKeyDeclared { span, .. }
            | Self::UnresolvedExchangeType { span, .. }
            | Self::ModelHasNoExchangeItems { span, .. }
            | Self::UnsupportedExchangeItem { span, .. }
            | Self::ItemOutsideModel { span, .. }
            | Self::DefaultKeyOutsideModel { span, .. }
            | Self::TypeNotInvocable { span, .. }
            | Self::ComponentTokenInNative { span, .. }
            | Self::AssignOutsideModel { span, .. }
            | Self::ParameterOutsideModel { span, .. } => *span,
        }
    }

    /// Replace the carried span. Statement excerpts are scanned in
    /// isolation, so the pipeline translates their spans back onto the
    /// enclosing source before surfacing the diagnostic.
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfStatement { span, .. }
            | Self::ExpectedToken { span, .. }
            | Self::UnexpectedExtraToken { span, .. }
            | Self::MalformedExchangeReference { span, .. }
            | Self::ExpectedAssignment { span, .. }
            | Self::ExpectedArgumentValue { span, .. }
            | Self::UnmatchedBlockDelimiter { span, .. }
            | Self::StatementTooLong { span, .. }
            | Self::BlockNestingTooDeep { span, .. }
            | Self::UnknownType { span, .. }
            | Self::NativeTokenInComponent { span, .. }
            | Self::DuplicateModelInStatement { span, .. }
            | Self::NoDefaultKeyDeclared { span, .. }
            | Self::UnresolvedExchangeType { span, .. }
            | Self::ModelHasNoExchangeItems { span, .. }
            | Self::UnsupportedExchangeItem { span, .. }
            | Self::ItemOutsideModel { span, .. }
            | Self::DefaultKeyOutsideModel { span, .. }
            | Self::TypeNotInvocable { span, .. }
            | Self::ComponentTokenInNative { span, .. }
            | Self::AssignOutsideModel { span, .. }
            | Self::ParameterOutsideModel { span, .. } => *span = new_span,
        }
        self
    }

    /// Whether scanning may continue past this diagnostic. Statement
    /// parse errors abort the compile unit, so this is metadata-driven
    /// and stays false for every current variant.
    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn halts_script(&self) -> bool {
        codes::halts_script(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.error_code().as_str())
    }
}
