//! Grammar definitions for the console language: dialects and the parse tree

pub mod keywords;
pub mod nodes;
pub mod tree;

// Re-export tree types
pub use nodes::{ExchangeReference, NodeId, NodeKind};
pub use tree::{Node, ParseTree};

// Re-export keywords
pub use keywords::Dialect;
