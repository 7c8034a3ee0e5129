//! Native command statement parser
//!
//! Native statements wrap external commands, so their grammar is flat:
//! one native-model token opens the scope and everything after it reduces
//! to parameter assignments. `--flag value` and `name = value` pairs
//! become keyed parameters; a bare value becomes a positional parameter.
//! The registry is consulted only to bind the model token; flags are
//! opaque to the front end and pass through unchecked.

use std::sync::Arc;

use crate::config::constants::compile_time::syntax::MAX_STATEMENT_TOKENS;
use crate::config::runtime::ParserPreferences;
use crate::grammar::{NodeId, NodeKind, ParseTree};
use crate::log_debug;
use crate::symbols::ModelRegistry;
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::Span;

use super::binding::{bind_model, Language};
use super::error::{ParseError, ParseResult};
use super::Step;

/// Parser states. Value tokens are held one behind so a following `=`
/// can turn them into a parameter name instead of a positional.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Before the model token; an optional `target =` prefix is allowed.
    Idle,
    /// A native model is bound; flags, pairs, and positionals reduce here.
    InModelScope,
    /// A flag or `name =` head is waiting for its value token.
    AwaitingParameterValue { flag: String, flag_span: Span },
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::InModelScope => "in-model-scope",
            State::AwaitingParameterValue { .. } => "awaiting-parameter-value",
        }
    }
}

/// Statement FSM for the native command sub-language.
pub struct NativeModelParser {
    registry: Arc<ModelRegistry>,
    parent: NodeId,
    preferences: ParserPreferences,
    state: State,
    statement: Option<NodeId>,
    model: Option<NodeId>,
    model_span: Span,
    target: Option<(String, Span)>,
    pending_value: Option<(String, Span)>,
    tokens_seen: usize,
}

impl NativeModelParser {
    pub fn new(registry: Arc<ModelRegistry>, parent: NodeId) -> Self {
        Self::with_preferences(registry, parent, ParserPreferences::default())
    }

    pub fn with_preferences(
        registry: Arc<ModelRegistry>,
        parent: NodeId,
        preferences: ParserPreferences,
    ) -> Self {
        Self {
            registry,
            parent,
            preferences,
            state: State::Idle,
            statement: None,
            model: None,
            model_span: Span::dummy(),
            target: None,
            pending_value: None,
            tokens_seen: 0,
        }
    }

    /// Drive the whole stream and finalize at the statement boundary.
    pub fn parse_statement(
        &mut self,
        stream: &mut TokenStream,
        tree: &mut ParseTree,
    ) -> ParseResult<Option<NodeId>> {
        loop {
            let Some(spanned) = stream.advance() else { break };
            let spanned = spanned.clone();
            let step = self.step(&spanned, tree)?;
            if self.preferences.trace_transitions {
                log_debug!("Native parser transition",
                    "token" => spanned.value.tag(),
                    "state" => self.state.name(),
                    "step" => format!("{:?}", step));
            }
            if matches!(spanned.value, Token::Eof) || spanned.value.ends_statement() {
                break;
            }
        }
        self.finish(tree)
    }

    /// Feed one significant token to the state machine.
    pub fn step(&mut self, spanned: &SpannedToken, tree: &mut ParseTree) -> ParseResult<Step> {
        self.tokens_seen += 1;
        if self.tokens_seen > MAX_STATEMENT_TOKENS {
            return Err(ParseError::StatementTooLong {
                count: self.tokens_seen,
                span: spanned.span,
            });
        }

        let token = &spanned.value;
        let span = spanned.span;

        if matches!(token, Token::Eof) || token.ends_statement() {
            return Ok(Step::Ignored);
        }

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => self.step_idle(token, span, tree),
            State::InModelScope => self.step_in_scope(token, span, tree),
            State::AwaitingParameterValue { flag, flag_span } => {
                self.step_parameter_value(flag, flag_span, token, span, tree)
            }
        }
    }

    /// Close the statement at its boundary. A held positional flushes
    /// here; anything else pending becomes a diagnostic.
    pub fn finish(&mut self, tree: &mut ParseTree) -> ParseResult<Option<NodeId>> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::InModelScope => {
                self.flush_positional(tree);
                Ok(self.statement)
            }
            State::AwaitingParameterValue { flag, flag_span } => {
                Err(ParseError::unexpected_end_of_statement(
                    &format!("a value for parameter '{}'", flag),
                    self.anchored(flag_span),
                ))
            }
            State::Idle => {
                if let Some((value, span)) = self.pending_value.take() {
                    return Err(ParseError::ParameterOutsideModel { value, span });
                }
                if let Some((target, span)) = self.target.take() {
                    return Err(ParseError::unexpected_end_of_statement(
                        &format!("a native model after '{} ='", target),
                        span,
                    ));
                }
                Ok(self.statement)
            }
        }
    }

    fn step_idle(&mut self, token: &Token, span: Span, tree: &mut ParseTree) -> ParseResult<Step> {
        match token {
            Token::NativeModel(name) | Token::Model(name) => {
                if let Some((value, value_span)) = self.pending_value.take() {
                    return Err(ParseError::ParameterOutsideModel {
                        value,
                        span: value_span,
                    });
                }
                self.bind_and_open(name.clone(), span, tree)
            }
            Token::Assign => match self.pending_value.take() {
                Some((name, name_span)) if self.target.is_none() => {
                    self.target = Some((name, name_span));
                    self.state = State::Idle;
                    Ok(Step::NeedMoreTokens)
                }
                _ => Err(ParseError::unexpected_token(
                    "a native model invocation",
                    "=",
                    span,
                )),
            },
            Token::Variable(name) => {
                if let Some((value, value_span)) = self.pending_value.take() {
                    return Err(ParseError::ParameterOutsideModel {
                        value,
                        span: value_span,
                    });
                }
                self.pending_value = Some((name.clone(), span));
                self.state = State::Idle;
                Ok(Step::NeedMoreTokens)
            }
            Token::Word(value) | Token::Literal(value) | Token::Unknown(value) => {
                let (value, span) = match self.pending_value.take() {
                    Some(first) => first,
                    None => (value.clone(), span),
                };
                Err(ParseError::ParameterOutsideModel { value, span })
            }
            flag if flag.is_flag() => {
                if let Some((value, value_span)) = self.pending_value.take() {
                    return Err(ParseError::ParameterOutsideModel {
                        value,
                        span: value_span,
                    });
                }
                Err(ParseError::AssignOutsideModel {
                    flag: flag.as_source_string(),
                    span,
                })
            }
            other => Err(ParseError::unexpected_token(
                "a native model invocation",
                &other.to_string(),
                span,
            )),
        }
    }

    fn step_in_scope(
        &mut self,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        match token {
            Token::NativeModel(name) | Token::Model(name) => {
                Err(ParseError::duplicate_model(name, self.anchored(span)))
            }
            Token::Assign => match self.pending_value.take() {
                Some((flag, flag_span)) => {
                    self.state = State::AwaitingParameterValue { flag, flag_span };
                    Ok(Step::NeedMoreTokens)
                }
                None => Err(ParseError::unexpected_token(
                    "a parameter name before '='",
                    "=",
                    self.anchored(span),
                )),
            },
            flag if flag.is_flag() => {
                let flushed = self.flush_positional(tree);
                self.state = State::AwaitingParameterValue {
                    flag: flag_name(flag),
                    flag_span: span,
                };
                Ok(flushed.map(Step::Reduced).unwrap_or(Step::NeedMoreTokens))
            }
            value if value.is_value() => {
                let flushed = self.flush_positional(tree);
                self.pending_value = Some((value.as_source_string(), span));
                self.state = State::InModelScope;
                Ok(flushed.map(Step::Reduced).unwrap_or(Step::NeedMoreTokens))
            }
            other => Err(ParseError::unexpected_token(
                "a parameter flag or value",
                &other.to_string(),
                self.anchored(span),
            )),
        }
    }

    fn step_parameter_value(
        &mut self,
        flag: String,
        flag_span: Span,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        if !token.is_value() {
            return Err(ParseError::expected_argument_value(
                &flag,
                &token.to_string(),
                flag_span.merge(span),
            ));
        }
        let node = self.reduce_parameter(
            flag,
            token.as_source_string(),
            flag_span.merge(span),
            tree,
        );
        self.state = State::InModelScope;
        Ok(Step::Reduced(node))
    }

    fn bind_and_open(
        &mut self,
        qualifier: String,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        let identifier = bind_model(&self.registry, Language::Native, &qualifier, span)?
            .identifier
            .clone();

        let target = self.target.take();
        let start = target.as_ref().map(|(_, s)| *s).unwrap_or(span);
        let statement = self.ensure_statement(target.map(|(t, _)| t), start.merge(span), tree);
        let model = tree.push(
            Some(statement),
            NodeKind::NativeModel { name: identifier },
            span,
        );

        self.model = Some(model);
        self.model_span = span;
        self.state = State::InModelScope;
        Ok(Step::NeedMoreTokens)
    }

    /// Reduce a held bare value as a positional parameter.
    fn flush_positional(&mut self, tree: &mut ParseTree) -> Option<NodeId> {
        let (value, span) = self.pending_value.take()?;
        Some(self.reduce_parameter(String::new(), value, span, tree))
    }

    fn reduce_parameter(
        &mut self,
        flag: String,
        value: String,
        span: Span,
        tree: &mut ParseTree,
    ) -> NodeId {
        let node = tree.push(self.model, NodeKind::Parameter { flag, value }, span);
        if let Some(model) = self.model {
            tree.widen_span(model, span);
        }
        if let Some(statement) = self.statement {
            tree.widen_span(statement, span);
        }
        node
    }

    fn ensure_statement(
        &mut self,
        target: Option<String>,
        span: Span,
        tree: &mut ParseTree,
    ) -> NodeId {
        match self.statement {
            Some(statement) => statement,
            None => {
                let statement = tree.push(Some(self.parent), NodeKind::Statement { target }, span);
                self.statement = Some(statement);
                statement
            }
        }
    }

    fn anchored(&self, span: Span) -> Span {
        if self.preferences.anchor_model_token && !self.model_span.is_empty() {
            self.model_span.merge(span)
        } else {
            span
        }
    }
}

/// Flag spelling without the leading dashes, as it keys the parameter.
fn flag_name(token: &Token) -> String {
    token.as_source_string().trim_start_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ModelManifest;
    use crate::tokens::{SkipPolicy, TokenStreamBuilder};
    use crate::utils::{Position, Spanned};
    use assert_matches::assert_matches;
    use std::path::Path;

    fn registry() -> Arc<ModelRegistry> {
        let manifest = ModelManifest::parse(
            r#"
            [[native_model]]
            name = "h.flow"

            [[native_model]]
            name = "h.pitfiller"

            [[component_model]]
            name = "h_ab"
            default_key = true
            "#,
            Path::new("models.toml"),
        )
        .unwrap();
        Arc::new(ModelRegistry::from_manifest(&manifest).unwrap())
    }

    fn stream_of(tokens: Vec<Token>) -> TokenStream {
        let mut builder = TokenStreamBuilder::new();
        for token in tokens {
            builder.push_spaced(token);
        }
        builder.build(SkipPolicy::NativeCommand)
    }

    fn parse(tokens: Vec<Token>) -> (ParseTree, ParseResult<Option<NodeId>>) {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();
        let mut parser = NativeModelParser::new(registry, root);
        let mut stream = stream_of(tokens);
        let result = parser.parse_statement(&mut stream, &mut tree);
        (tree, result)
    }

    fn spanned_at(token: Token, index: usize) -> SpannedToken {
        let start = Position::new(index * 4, 1, (index * 4 + 1) as u32);
        let end = Position::new(index * 4 + 3, 1, (index * 4 + 4) as u32);
        Spanned::new(token, Span::new(start, end))
    }

    #[test]
    fn builds_parameter_pairs_from_flags() {
        let (tree, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Input("pit".to_string()),
            Token::Variable("pit".to_string()),
            Token::Output("flow".to_string()),
            Token::Variable("flow".to_string()),
        ]);
        let statement = result.unwrap().unwrap();
        let model = tree.scoped_model(statement).unwrap();
        let children = tree.children(model);
        assert_eq!(children.len(), 2);
        assert_matches!(
            tree.kind(children[0]),
            NodeKind::Parameter { flag, value } if flag == "igrass-pit" && value == "pit"
        );
        assert_matches!(
            tree.kind(children[1]),
            NodeKind::Parameter { flag, value } if flag == "ograss-flow" && value == "flow"
        );
    }

    #[test]
    fn name_value_pairs_reduce_to_keyed_parameters() {
        let (tree, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Variable("res".to_string()),
            Token::Assign,
            Token::Literal("30".to_string()),
        ]);
        let statement = result.unwrap().unwrap();
        let model = tree.scoped_model(statement).unwrap();
        assert_matches!(
            tree.kind(tree.children(model)[0]),
            NodeKind::Parameter { flag, value } if flag == "res" && value == "30"
        );
    }

    #[test]
    fn bare_values_become_positional_parameters() {
        let (tree, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Word("input.txt".to_string()),
            Token::Input("pit".to_string()),
            Token::Variable("x".to_string()),
        ]);
        let statement = result.unwrap().unwrap();
        let model = tree.scoped_model(statement).unwrap();
        let children = tree.children(model);
        assert_eq!(children.len(), 2);
        assert_matches!(
            tree.kind(children[0]),
            NodeKind::Parameter { flag, value } if flag.is_empty() && value == "input.txt"
        );
    }

    #[test]
    fn trailing_positional_flushes_at_finish() {
        let (tree, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Word("basin.map".to_string()),
        ]);
        let statement = result.unwrap().unwrap();
        let model = tree.scoped_model(statement).unwrap();
        assert_eq!(tree.children(model).len(), 1);
    }

    #[test]
    fn target_assignment_binds_the_statement() {
        let (tree, result) = parse(vec![
            Token::Variable("x".to_string()),
            Token::Assign,
            Token::NativeModel("h.flow".to_string()),
        ]);
        let statement = result.unwrap().unwrap();
        assert_matches!(
            tree.kind(statement),
            NodeKind::Statement { target: Some(target) } if target == "x"
        );
    }

    #[test]
    fn stepping_stays_hungry_until_finish() {
        let registry = registry();
        let (mut tree, root) = ParseTree::with_script_root();
        let mut parser = NativeModelParser::new(registry, root);

        let tokens = [
            Token::Variable("x".to_string()),
            Token::Assign,
            Token::NativeModel("h.flow".to_string()),
        ];
        for (index, token) in tokens.into_iter().enumerate() {
            let spanned = spanned_at(token, index);
            let step = parser.step(&spanned, &mut tree).unwrap();
            assert_eq!(step, Step::NeedMoreTokens);
        }
        assert!(parser.finish(&mut tree).unwrap().is_some());
    }

    #[test]
    fn component_keywords_always_cross_rejected() {
        let registry = registry();
        for name in registry.component_keywords() {
            let (mut tree, root) = ParseTree::with_script_root();
            let mut parser = NativeModelParser::new(Arc::clone(&registry), root);
            let mut stream = stream_of(vec![Token::Model(name.clone())]);
            let error = parser.parse_statement(&mut stream, &mut tree).unwrap_err();
            assert_eq!(error.error_code().as_str(), "E060");
        }
    }

    #[test]
    fn flag_without_model_scope_is_rejected() {
        let (_, result) = parse(vec![
            Token::Argument("mode".to_string()),
            Token::Variable("fast".to_string()),
        ]);
        assert_eq!(result.unwrap_err().error_code().as_str(), "E061");
    }

    #[test]
    fn value_without_model_scope_is_rejected() {
        let (_, result) = parse(vec![Token::Literal("5".to_string())]);
        assert_eq!(result.unwrap_err().error_code().as_str(), "E062");
    }

    #[test]
    fn duplicate_model_in_statement_rejected() {
        let (_, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::NativeModel("h.pitfiller".to_string()),
        ]);
        assert_eq!(result.unwrap_err().error_code().as_str(), "E052");
    }

    #[test]
    fn flag_at_end_of_statement_needs_a_value() {
        let (_, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Argument("mode".to_string()),
        ]);
        assert_eq!(result.unwrap_err().error_code().as_str(), "E041");
    }

    #[test]
    fn flag_followed_by_flag_is_rejected() {
        let (_, result) = parse(vec![
            Token::NativeModel("h.flow".to_string()),
            Token::Argument("mode".to_string()),
            Token::Input("pit".to_string()),
        ]);
        assert_eq!(result.unwrap_err().error_code().as_str(), "E046");
    }

    #[test]
    fn empty_window_reduces_to_nothing() {
        let (tree, result) = parse(Vec::new());
        assert_eq!(result.unwrap(), None);
        assert_eq!(tree.len(), 1);
    }
}
