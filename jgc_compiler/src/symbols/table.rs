//! Session symbol table keyed by normalized qualifiers
//!
//! The table is populated once from the model manifest before any parsing
//! starts and is read-only for the rest of the pass. Lookups go through
//! `normalize_qualifier`, so `H.Flow`, `h.flow `, and `h.flow` all resolve
//! to the same descriptor.

use crate::config::constants::compile_time::symbols::*;
use crate::symbols::error::{SymbolError, SymbolResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// What a resolved type name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    NativeModel,
    ComponentModel,
    Class,
    Primitive,
}

impl SymbolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NativeModel => "native-model",
            Self::ComponentModel => "component-model",
            Self::Class => "class",
            Self::Primitive => "primitive",
        }
    }

    /// Whether a statement may invoke this kind as a model.
    pub const fn is_invocable(self) -> bool {
        matches!(self, Self::NativeModel | Self::ComponentModel)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized lookup key: trimmed and ASCII lower-cased.
pub fn normalize_qualifier(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Descriptor for one registered type name.
///
/// Exchange items map a quantity name to the backing type name; the map is
/// ordered so serialized registries and diagnostics stay deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub identifier: String,
    pub kind: SymbolKind,
    pub declares_default_key: bool,
    pub exchange_items: BTreeMap<String, String>,
}

impl Symbol {
    fn validated(
        identifier: String,
        kind: SymbolKind,
        declares_default_key: bool,
        exchange_items: BTreeMap<String, String>,
    ) -> SymbolResult<Self> {
        if identifier.trim().is_empty() {
            return Err(SymbolError::EmptyIdentifier);
        }
        if identifier.len() > MAX_QUALIFIER_LENGTH {
            return Err(SymbolError::qualifier_too_long(&identifier));
        }
        if exchange_items.len() > MAX_EXCHANGE_ITEMS_PER_MODEL {
            return Err(SymbolError::TooManyExchangeItems {
                identifier,
                count: exchange_items.len(),
                max: MAX_EXCHANGE_ITEMS_PER_MODEL,
            });
        }
        Ok(Self {
            identifier,
            kind,
            declares_default_key,
            exchange_items,
        })
    }

    pub fn native_model(identifier: impl Into<String>) -> SymbolResult<Self> {
        Self::validated(
            identifier.into(),
            SymbolKind::NativeModel,
            false,
            BTreeMap::new(),
        )
    }

    pub fn component_model(
        identifier: impl Into<String>,
        declares_default_key: bool,
        exchange_items: BTreeMap<String, String>,
    ) -> SymbolResult<Self> {
        Self::validated(
            identifier.into(),
            SymbolKind::ComponentModel,
            declares_default_key,
            exchange_items,
        )
    }

    pub fn class(identifier: impl Into<String>) -> SymbolResult<Self> {
        Self::validated(identifier.into(), SymbolKind::Class, false, BTreeMap::new())
    }

    pub fn primitive(identifier: impl Into<String>) -> SymbolResult<Self> {
        Self::validated(
            identifier.into(),
            SymbolKind::Primitive,
            false,
            BTreeMap::new(),
        )
    }

    /// Normalized lookup key for this symbol.
    pub fn qualifier(&self) -> String {
        normalize_qualifier(&self.identifier)
    }

    pub fn has_exchange_items(&self) -> bool {
        !self.exchange_items.is_empty()
    }

    pub fn supports_quantity(&self, quantity: &str) -> bool {
        self.exchange_items.contains_key(quantity)
    }

    /// Backing type name for an exchange quantity, if declared.
    pub fn backing_type(&self, quantity: &str) -> Option<&str> {
        self.exchange_items.get(quantity).map(String::as_str)
    }
}

/// Read-only (after construction) mapping from qualifier to descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Insert a symbol under its normalized qualifier.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolResult<()> {
        if self.symbols.len() >= MAX_SYMBOLS {
            return Err(SymbolError::SymbolLimitExceeded {
                count: self.symbols.len(),
            });
        }
        let qualifier = symbol.qualifier();
        if self.symbols.contains_key(&qualifier) {
            return Err(SymbolError::duplicate_symbol(&qualifier, &symbol.identifier));
        }
        self.symbols.insert(qualifier, symbol);
        Ok(())
    }

    /// Resolve a raw type name through qualifier normalization.
    pub fn lookup(&self, raw: &str) -> Option<&Symbol> {
        self.symbols.get(&normalize_qualifier(raw))
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.lookup(raw).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Raw identifiers of every symbol of `kind`, longest first so scanner
    /// keyword alternations prefer the most specific name.
    pub fn identifiers_of_kind(&self, kind: SymbolKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .symbols
            .values()
            .filter(|symbol| symbol.kind == kind)
            .map(|symbol| symbol.identifier.clone())
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names
    }
}
