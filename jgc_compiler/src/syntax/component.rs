//! Component-model statement parser
//!
//! An explicit state machine over significant tokens. A statement opens at
//! most one component-model scope; inside the scope, exchange flags wire
//! quantities to references, keyword arguments take one value each, and a
//! single bare value in the first position after the model becomes the
//! default key. Exchange contracts are checked against the registry the
//! moment the flag token is read, so diagnostics land on the flag rather
//! than on whatever follows it.

use std::sync::Arc;

use crate::config::constants::compile_time::syntax::MAX_STATEMENT_TOKENS;
use crate::config::runtime::ParserPreferences;
use crate::grammar::{ExchangeReference, NodeId, NodeKind, ParseTree};
use crate::log_debug;
use crate::symbols::{ModelRegistry, Symbol, SymbolKind};
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::Span;

use super::binding::{bind_model, Language};
use super::error::{ParseError, ParseResult};
use super::Step;

/// Which way an exchange flag moves data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

impl Direction {
    fn flag_spelling(self, quantity: &str) -> String {
        match self {
            Direction::Input => format!("--igrass-{}", quantity),
            Direction::Output => format!("--ograss-{}", quantity),
        }
    }
}

/// An exchange flag whose reference side is still outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingExchange {
    direction: Direction,
    quantity: String,
    flag_span: Span,
}

impl PendingExchange {
    fn flag_spelling(&self) -> String {
        self.direction.flag_spelling(&self.quantity)
    }
}

/// Parser states, keyed by what the next token must supply.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Statement start: a model token or an assignment target.
    Idle,
    /// A leading identifier was read; `=` must follow.
    AwaitingAssign { target: String, start: Span },
    /// `target =` was read; a model token must follow.
    AwaitingModelName { target: String, start: Span },
    /// A model scope is open. `fresh` holds until the first flag or
    /// value, the only position where a default key may stand.
    InModelScope { fresh: bool },
    /// An exchange flag was read; a reference shape must follow.
    AwaitingExchangeReference(PendingExchange),
    /// `[` opened a reference list; values accumulate until `]`.
    CollectingExchangeList {
        pending: PendingExchange,
        open_span: Span,
        items: Vec<String>,
    },
    /// An `--argname` flag was read; its value must follow.
    AwaitingArgumentValue { name: String, flag_span: Span },
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::AwaitingAssign { .. } => "awaiting-assign",
            State::AwaitingModelName { .. } => "awaiting-model-name",
            State::InModelScope { .. } => "in-model-scope",
            State::AwaitingExchangeReference { .. } => "awaiting-exchange-reference",
            State::CollectingExchangeList { .. } => "collecting-exchange-list",
            State::AwaitingArgumentValue { .. } => "awaiting-argument-value",
        }
    }
}

/// Statement FSM for the component sub-language.
///
/// Fed one significant token at a time through [`step`](Self::step);
/// [`parse_statement`](Self::parse_statement) drives a whole stream and
/// finalizes at the statement boundary. Nodes grow under a caller-supplied
/// parent so block assembly can parent statements wherever they belong.
pub struct ComponentModelParser {
    registry: Arc<ModelRegistry>,
    parent: NodeId,
    preferences: ParserPreferences,
    state: State,
    statement: Option<NodeId>,
    model: Option<NodeId>,
    bound: Option<Symbol>,
    model_span: Span,
    tokens_seen: usize,
}

impl ComponentModelParser {
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
            bound: None,
            model_span: Span::dummy(),
            tokens_seen: 0,
        }
    }

    /// Drive the whole stream and finalize at the statement boundary.
    ///
    /// Returns the statement node, or `None` when the stream held nothing
    /// but ignorable tokens.
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
                log_debug!("Component parser transition",
                    "token" => spanned.value.tag(),
                    "state" => self.state.name(),
                    "step" => format!("{:?}", step));
            }
            if matches!(spanned.value, Token::Eof) || spanned.value.ends_statement() {
                break;
            }
        }
        self.finish()
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
            State::AwaitingAssign { target, start } => {
                self.step_awaiting_assign(target, start, token, span)
            }
            State::AwaitingModelName { target, start } => {
                self.step_model_name(Some((target, start)), token, span, tree)
            }
            State::InModelScope { fresh } => self.step_in_scope(fresh, token, span, tree),
            State::AwaitingExchangeReference(pending) => {
                self.step_exchange_reference(pending, token, span, tree)
            }
            State::CollectingExchangeList {
                pending,
                open_span,
                items,
            } => self.step_collect_list(pending, open_span, items, token, span, tree),
            State::AwaitingArgumentValue { name, flag_span } => {
                self.step_argument_value(name, flag_span, token, span, tree)
            }
        }
    }

    /// Close the statement at its boundary. Pending productions become
    /// end-of-statement diagnostics here.
    pub fn finish(&mut self) -> ParseResult<Option<NodeId>> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle | State::InModelScope { .. } => Ok(self.statement),
            State::AwaitingAssign { target, start } => {
                Err(ParseError::unexpected_end_of_statement(
                    &format!("'=' and a model invocation after '{}'", target),
                    start,
                ))
            }
            State::AwaitingModelName { target, start } => {
                Err(ParseError::unexpected_end_of_statement(
                    &format!("a model name after '{} ='", target),
                    start,
                ))
            }
            State::AwaitingExchangeReference(pending) => {
                Err(ParseError::unexpected_end_of_statement(
                    &format!("an exchange reference for '{}'", pending.flag_spelling()),
                    self.anchored(pending.flag_span),
                ))
            }
            State::CollectingExchangeList { open_span, .. } => {
                Err(ParseError::unmatched_delimiter("[", self.anchored(open_span)))
            }
            State::AwaitingArgumentValue { name, flag_span } => {
                Err(ParseError::unexpected_end_of_statement(
                    &format!("a value for argument '--{}'", name),
                    self.anchored(flag_span),
                ))
            }
        }
    }

    fn step_idle(&mut self, token: &Token, span: Span, tree: &mut ParseTree) -> ParseResult<Step> {
        match token {
            Token::Variable(name) => {
                self.state = State::AwaitingAssign {
                    target: name.clone(),
                    start: span,
                };
                Ok(Step::NeedMoreTokens)
            }
            Token::Model(_) | Token::NativeModel(_) | Token::Word(_) => {
                self.step_model_name(None, token, span, tree)
            }
            Token::Input(_) | Token::Output(_) | Token::Argument(_) => {
                Err(ParseError::ItemOutsideModel {
                    flag: token.as_source_string(),
                    span,
                })
            }
            Token::Literal(value) | Token::Unknown(value) => {
                Err(ParseError::DefaultKeyOutsideModel {
                    value: value.clone(),
                    span,
                })
            }
            other => Err(ParseError::unexpected_token(
                "a component model or assignment target",
                &other.to_string(),
                span,
            )),
        }
    }

    fn step_awaiting_assign(
        &mut self,
        target: String,
        start: Span,
        token: &Token,
        span: Span,
    ) -> ParseResult<Step> {
        match token {
            Token::Assign => {
                self.state = State::AwaitingModelName { target, start };
                Ok(Step::NeedMoreTokens)
            }
            other => Err(ParseError::expected_assignment(
                &target,
                &other.to_string(),
                start.merge(span),
            )),
        }
    }

    fn step_model_name(
        &mut self,
        target: Option<(String, Span)>,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        let qualifier = match token {
            Token::Model(name)
            | Token::NativeModel(name)
            | Token::Word(name)
            | Token::Variable(name) => name.clone(),
            other => {
                return Err(ParseError::expected_token(
                    "a model name after '='",
                    &other.to_string(),
                    span,
                ))
            }
        };

        let symbol = bind_model(&self.registry, Language::Component, &qualifier, span)?.clone();

        let start = target.as_ref().map(|(_, s)| *s).unwrap_or(span);
        let statement = self.ensure_statement(target.map(|(t, _)| t), start.merge(span), tree);
        let model = tree.push(
            Some(statement),
            NodeKind::ComponentModel {
                name: symbol.identifier.clone(),
            },
            span,
        );

        self.model = Some(model);
        self.bound = Some(symbol);
        self.model_span = span;
        self.state = State::InModelScope { fresh: true };
        Ok(Step::NeedMoreTokens)
    }

    fn step_in_scope(
        &mut self,
        fresh: bool,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        match token {
            Token::Model(name) | Token::NativeModel(name) => {
                Err(ParseError::duplicate_model(name, self.anchored(span)))
            }
            Token::Input(quantity) => {
                self.begin_exchange(Direction::Input, quantity.clone(), span)
            }
            Token::Output(quantity) => {
                self.begin_exchange(Direction::Output, quantity.clone(), span)
            }
            Token::Argument(name) => {
                self.state = State::AwaitingArgumentValue {
                    name: name.clone(),
                    flag_span: span,
                };
                Ok(Step::NeedMoreTokens)
            }
            value if value.is_value() => {
                if fresh {
                    self.reduce_default_key(value.as_source_string(), span, tree)
                } else {
                    Err(ParseError::unexpected_extra_token(
                        &value.to_string(),
                        self.anchored(span),
                    ))
                }
            }
            other => Err(ParseError::unexpected_token(
                "an exchange flag or argument",
                &other.to_string(),
                self.anchored(span),
            )),
        }
    }

    /// Validate an exchange flag against the bound model's contract. All
    /// three checks anchor at the flag so the reference token is never
    /// blamed for a contract problem.
    fn begin_exchange(
        &mut self,
        direction: Direction,
        quantity: String,
        span: Span,
    ) -> ParseResult<Step> {
        let (qualifier, has_items, supported, backing) = match self.bound.as_ref() {
            Some(symbol) => (
                symbol.qualifier(),
                symbol.has_exchange_items(),
                symbol.supports_quantity(&quantity),
                symbol.backing_type(&quantity).map(str::to_string),
            ),
            None => {
                return Err(ParseError::ItemOutsideModel {
                    flag: direction.flag_spelling(&quantity),
                    span,
                })
            }
        };

        if !has_items {
            return Err(ParseError::ModelHasNoExchangeItems {
                qualifier,
                span: self.anchored(span),
            });
        }
        if !supported {
            return Err(ParseError::UnsupportedExchangeItem {
                qualifier,
                quantity,
                span: self.anchored(span),
            });
        }

        let backing_type = backing.unwrap_or_default();
        let backs_class = self
            .registry
            .lookup(&backing_type)
            .map(|symbol| symbol.kind == SymbolKind::Class)
            .unwrap_or(false);
        if !backs_class {
            return Err(ParseError::UnresolvedExchangeType {
                qualifier,
                quantity,
                backing_type,
                span: self.anchored(span),
            });
        }

        self.state = State::AwaitingExchangeReference(PendingExchange {
            direction,
            quantity,
            flag_span: span,
        });
        Ok(Step::NeedMoreTokens)
    }

    fn reduce_default_key(
        &mut self,
        value: String,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        let (qualifier, declares) = match self.bound.as_ref() {
            Some(symbol) => (symbol.qualifier(), symbol.declares_default_key),
            None => return Err(ParseError::DefaultKeyOutsideModel { value, span }),
        };
        if !declares {
            return Err(ParseError::no_default_key(
                &qualifier,
                &value,
                self.anchored(span),
            ));
        }
        let node = self.reduce_child(NodeKind::DefaultKey { value }, span, tree);
        self.state = State::InModelScope { fresh: false };
        Ok(Step::Reduced(node))
    }

    fn step_exchange_reference(
        &mut self,
        pending: PendingExchange,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        let reference = match token {
            Token::Asterisk => ExchangeReference::Wildcard,
            Token::UsageDirective => ExchangeReference::Usage,
            Token::BracketOpen => {
                self.state = State::CollectingExchangeList {
                    pending,
                    open_span: span,
                    items: Vec::new(),
                };
                return Ok(Step::NeedMoreTokens);
            }
            Token::Literal(value) | Token::Variable(value) | Token::Word(value) => {
                ExchangeReference::value(value.clone())
            }
            other => {
                return Err(ParseError::malformed_exchange_reference(
                    &pending.quantity,
                    &other.to_string(),
                    pending.flag_span.merge(span),
                ))
            }
        };
        let node = self.reduce_exchange(pending, reference, span, tree);
        Ok(Step::Reduced(node))
    }

    fn step_collect_list(
        &mut self,
        pending: PendingExchange,
        open_span: Span,
        mut items: Vec<String>,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        match token {
            Token::Literal(value) | Token::Variable(value) | Token::Word(value) => {
                items.push(value.clone());
                self.state = State::CollectingExchangeList {
                    pending,
                    open_span,
                    items,
                };
                Ok(Step::NeedMoreTokens)
            }
            Token::BracketClose => {
                let node =
                    self.reduce_exchange(pending, ExchangeReference::List(items), span, tree);
                Ok(Step::Reduced(node))
            }
            other => Err(ParseError::malformed_exchange_reference(
                &pending.quantity,
                &other.to_string(),
                open_span.merge(span),
            )),
        }
    }

    fn step_argument_value(
        &mut self,
        name: String,
        flag_span: Span,
        token: &Token,
        span: Span,
        tree: &mut ParseTree,
    ) -> ParseResult<Step> {
        if !token.is_value() {
            return Err(ParseError::expected_argument_value(
                &name,
                &token.to_string(),
                flag_span.merge(span),
            ));
        }
        let node = self.reduce_child(
            NodeKind::Argument {
                name,
                value: token.as_source_string(),
            },
            flag_span.merge(span),
            tree,
        );
        self.state = State::InModelScope { fresh: false };
        Ok(Step::Reduced(node))
    }

    fn reduce_exchange(
        &mut self,
        pending: PendingExchange,
        reference: ExchangeReference,
        end_span: Span,
        tree: &mut ParseTree,
    ) -> NodeId {
        let kind = match pending.direction {
            Direction::Input => NodeKind::Input {
                quantity: pending.quantity,
                reference,
            },
            Direction::Output => NodeKind::Output {
                quantity: pending.quantity,
                reference,
            },
        };
        let node = self.reduce_child(kind, pending.flag_span.merge(end_span), tree);
        self.state = State::InModelScope { fresh: false };
        node
    }

    /// Push a child under the model scope and widen the enclosing spans.
    fn reduce_child(&mut self, kind: NodeKind, span: Span, tree: &mut ParseTree) -> NodeId {
        let node = tree.push(self.model, kind, span);
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

    /// Widen an error span over the model token when one is bound, so the
    /// diagnostic names both ends of the problem.
    fn anchored(&self, span: Span) -> Span {
        if self.preferences.anchor_model_token && !self.model_span.is_empty() {
            self.model_span.merge(span)
        } else {
            span
        }
    }
}
