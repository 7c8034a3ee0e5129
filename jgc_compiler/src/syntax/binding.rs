//! Model-name binding against the registry snapshot

use crate::symbols::{ModelRegistry, Symbol, SymbolKind};
use crate::syntax::error::ParseError;
use crate::utils::Span;

/// Which statement sub-language is asking for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Language {
    Component,
    Native,
}

/// Resolve a model qualifier for one sub-language.
///
/// Cross-language hits are rejected here so both parsers share the same
/// wrong-language diagnostics, and non-invocable kinds never bind.
pub(crate) fn bind_model<'r>(
    registry: &'r ModelRegistry,
    language: Language,
    qualifier: &str,
    span: Span,
) -> Result<&'r Symbol, ParseError> {
    let symbol = registry
        .lookup(qualifier)
        .ok_or_else(|| ParseError::unknown_type(qualifier, span))?;

    match (language, symbol.kind) {
        (Language::Component, SymbolKind::ComponentModel) => Ok(symbol),
        (Language::Native, SymbolKind::NativeModel) => Ok(symbol),
        (Language::Component, SymbolKind::NativeModel) => {
            Err(ParseError::native_token_in_component(qualifier, span))
        }
        (Language::Native, SymbolKind::ComponentModel) => {
            Err(ParseError::component_token_in_native(qualifier, span))
        }
        (_, kind) => Err(ParseError::type_not_invocable(qualifier, kind, span)),
    }
}
