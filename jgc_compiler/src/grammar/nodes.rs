//! Annotated parse tree node definitions
//!
//! Every production of the two sub-language grammars has a node kind here.
//! The tree itself is an index arena in `tree.rs`; nodes refer to each
//! other by `NodeId`, never by ownership, so statements can be appended
//! one at a time while earlier nodes stay addressable.
//!
//! Design principles:
//! - Grammar compliant: every production rule has a corresponding kind
//! - Span tracking: all nodes carry the source span they reduce
//! - Serde compatible: full serialization support for tooling output

use crate::grammar::keywords::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside its `ParseTree` arena.
///
/// Ids are minted by the arena and are only meaningful for the tree that
/// created them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

// === EXCHANGE REFERENCES ===

/// How an exchange slot is satisfied (grammar: exchange_reference)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExchangeReference {
    /// `*`: every available item of the quantity
    Wildcard,
    /// `[a b c]`: an explicit item list
    List(Vec<String>),
    /// A single literal, variable or word
    Value(String),
    /// `--usage`: print the model usage instead of exchanging data
    Usage,
}

impl ExchangeReference {
    pub fn value(v: impl Into<String>) -> Self {
        Self::Value(v.into())
    }

    /// Render the reference as it appears in source
    pub fn render(&self) -> String {
        match self {
            Self::Wildcard => "*".to_string(),
            Self::List(items) => format!("[{}]", items.join(" ")),
            Self::Value(v) => v.clone(),
            Self::Usage => "--usage".to_string(),
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage)
    }
}

impl fmt::Display for ExchangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

// === NODE KINDS ===

/// What a parse-tree node represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a compile unit
    Script,

    /// One dialect block (grammar: block ::= dialect "{" content "}")
    Block { dialect: Dialect },

    /// One statement, optionally assigning its result to a variable
    /// (grammar: statement ::= (variable "=")? invocation)
    Statement { target: Option<String> },

    /// Component model invocation heading an exchange scope
    ComponentModel { name: String },

    /// Native model invocation heading a parameter scope
    NativeModel { name: String },

    /// Input exchange (grammar: input ::= "--igrass-" quantity reference)
    Input {
        quantity: String,
        reference: ExchangeReference,
    },

    /// Output exchange (grammar: output ::= "--ograss-" quantity reference)
    Output {
        quantity: String,
        reference: ExchangeReference,
    },

    /// Argument pair (grammar: argument ::= "--" name value)
    Argument { name: String, value: String },

    /// Native parameter pair; flags are uniform in the native grammar
    Parameter { flag: String, value: String },

    /// Bare value consumed by a model that declares a default key
    DefaultKey { value: String },

    /// Verbatim text of an `r` block, passed through untouched
    RawCode { text: String },
}

impl NodeKind {
    /// Short tag used in logs and tree outlines
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Script => "script",
            NodeKind::Block { .. } => "block",
            NodeKind::Statement { .. } => "statement",
            NodeKind::ComponentModel { .. } => "component-model",
            NodeKind::NativeModel { .. } => "native-model",
            NodeKind::Input { .. } => "input",
            NodeKind::Output { .. } => "output",
            NodeKind::Argument { .. } => "argument",
            NodeKind::Parameter { .. } => "parameter",
            NodeKind::DefaultKey { .. } => "default-key",
            NodeKind::RawCode { .. } => "raw-code",
        }
    }

    /// Model invocations open a scope that exchanges and parameters
    /// attach to
    pub fn is_model(&self) -> bool {
        matches!(
            self,
            NodeKind::ComponentModel { .. } | NodeKind::NativeModel { .. }
        )
    }

    /// The invoked model name, for model kinds
    pub fn model_name(&self) -> Option<&str> {
        match self {
            NodeKind::ComponentModel { name } | NodeKind::NativeModel { name } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Script => write!(f, "script"),
            NodeKind::Block { dialect } => write!(f, "block({})", dialect),
            NodeKind::Statement { target: Some(t) } => write!(f, "statement({} =)", t),
            NodeKind::Statement { target: None } => write!(f, "statement"),
            NodeKind::ComponentModel { name } => write!(f, "component-model({})", name),
            NodeKind::NativeModel { name } => write!(f, "native-model({})", name),
            NodeKind::Input { quantity, reference } => {
                write!(f, "input({} <- {})", quantity, reference)
            }
            NodeKind::Output { quantity, reference } => {
                write!(f, "output({} -> {})", quantity, reference)
            }
            NodeKind::Argument { name, value } => write!(f, "argument({}={})", name, value),
            NodeKind::Parameter { flag, value } => write!(f, "parameter({}={})", flag, value),
            NodeKind::DefaultKey { value } => write!(f, "default-key({})", value),
            NodeKind::RawCode { .. } => write!(f, "raw-code"),
        }
    }
}
