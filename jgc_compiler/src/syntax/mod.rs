//! Statement parsers: token streams to parse-tree productions
//!
//! Two explicit state machines cover the two statement sub-languages.
//! `ComponentModelParser` handles component invocations with exchange-item
//! wiring; `NativeModelParser` handles native command lines whose flags
//! reduce to parameter assignments. Both are fed one significant token at
//! a time, resolve model names against an immutable registry snapshot,
//! and grow an arena parse tree under a caller-supplied parent node.

mod binding;
mod component;
mod error;
mod native;

pub use component::ComponentModelParser;
pub use error::{ParseError, ParseResult};
pub use native::NativeModelParser;

use crate::grammar::{NodeId, ParseTree};
use crate::logging::codes;
use crate::symbols::ModelRegistry;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};
use std::sync::Arc;

/// Outcome of feeding one significant token to a statement parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The current production is incomplete; feed the next token.
    NeedMoreTokens,
    /// The token was consumed without contributing to the tree.
    Ignored,
    /// A production reduced into the tree, rooted at this node.
    Reduced(NodeId),
}

impl Step {
    pub fn reduced(self) -> Option<NodeId> {
        match self {
            Step::Reduced(node) => Some(node),
            _ => None,
        }
    }
}

/// Parse one component-model statement from the stream with global logging.
///
/// Returns the statement node on a reduction, `None` when the statement
/// held nothing but ignorable tokens.
pub fn parse_component_statement(
    stream: &mut TokenStream,
    registry: &Arc<ModelRegistry>,
    tree: &mut ParseTree,
    parent: NodeId,
) -> ParseResult<Option<NodeId>> {
    log_debug!("Starting component statement parse",
        "tokens" => stream.significant_len());

    let mut parser = ComponentModelParser::new(Arc::clone(registry), parent);
    let result = parser.parse_statement(stream, tree);

    match &result {
        Ok(Some(node)) => {
            log_success!(
                codes::success::PARSE_TREE_COMPLETE,
                "Component statement reduced",
                "node" => node.to_string()
            );
        }
        Ok(None) => {
            log_debug!("Component statement produced no tree nodes");
        }
        Err(error) => {
            log_error!(error.error_code(), "Component statement parse failed",
                "error" => error.to_string()
            );
        }
    }

    result
}

/// Parse one native command statement from the stream with global logging.
pub fn parse_native_statement(
    stream: &mut TokenStream,
    registry: &Arc<ModelRegistry>,
    tree: &mut ParseTree,
    parent: NodeId,
) -> ParseResult<Option<NodeId>> {
    log_debug!("Starting native statement parse",
        "tokens" => stream.significant_len());

    let mut parser = NativeModelParser::new(Arc::clone(registry), parent);
    let result = parser.parse_statement(stream, tree);

    match &result {
        Ok(Some(node)) => {
            log_success!(
                codes::success::PARSE_TREE_COMPLETE,
                "Native statement reduced",
                "node" => node.to_string()
            );
        }
        Ok(None) => {
            log_debug!("Native statement produced no tree nodes");
        }
        Err(error) => {
            log_error!(error.error_code(), "Native statement parse failed",
                "error" => error.to_string()
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NodeKind;
    use crate::symbols::{ModelManifest, ModelRegistry};
    use crate::tokens::{SkipPolicy, Token, TokenStreamBuilder};
    use std::path::Path;

    fn registry() -> Arc<ModelRegistry> {
        let manifest = ModelManifest::parse(
            r#"
            [[native_model]]
            name = "h.flow"

            [[component_model]]
            name = "h_ab"
            default_key = true

            [component_model.exchange]
            pit = "GridCoverage"

            [[class]]
            name = "GridCoverage"
            "#,
            Path::new("models.toml"),
        )
        .unwrap();
        Arc::new(ModelRegistry::from_manifest(&manifest).unwrap())
    }

    #[test]
    fn component_convenience_reduces_a_statement() {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();

        let mut builder = TokenStreamBuilder::new();
        builder.push_spaced(Token::Model("h_ab".to_string()));
        builder.push(Token::Literal("5".to_string()));
        let mut stream = builder.build(SkipPolicy::ComponentModel);

        let node = parse_component_statement(&mut stream, &registry, &mut tree, root)
            .unwrap()
            .unwrap();
        assert!(matches!(
            tree.kind(node),
            NodeKind::Statement { target: None }
        ));
    }

    #[test]
    fn native_convenience_reduces_a_statement() {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();

        let mut builder = TokenStreamBuilder::new();
        builder.push(Token::NativeModel("h.flow".to_string()));
        let mut stream = builder.build(SkipPolicy::NativeCommand);

        let node = parse_native_statement(&mut stream, &registry, &mut tree, root)
            .unwrap()
            .unwrap();
        assert_eq!(tree.children(node).len(), 1);
        let model = tree.children(node)[0];
        assert!(matches!(
            tree.kind(model),
            NodeKind::NativeModel { name } if name == "h.flow"
        ));
    }

    #[test]
    fn whitespace_only_input_reduces_to_nothing() {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();

        let mut builder = TokenStreamBuilder::new();
        builder.push(Token::Space);
        builder.push(Token::Space);
        let mut stream = builder.build(SkipPolicy::ComponentModel);

        let node = parse_component_statement(&mut stream, &registry, &mut tree, root).unwrap();
        assert_eq!(node, None);
        // Nothing but the script root should exist.
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn errors_carry_their_diagnostic_code() {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();

        let mut builder = TokenStreamBuilder::new();
        builder.push(Token::Word("no.such.model".to_string()));
        let mut stream = builder.build(SkipPolicy::ComponentModel);

        let error = parse_component_statement(&mut stream, &registry, &mut tree, root)
            .unwrap_err();
        assert_eq!(error.error_code().as_str(), "E050");
    }
}
