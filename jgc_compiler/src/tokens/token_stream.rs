//! Token stream with policy-driven significance filtering
//!
//! Every scanner produces the full token sequence, whitespace and trivia
//! included. What a downstream consumer actually sees is the significant
//! view: a precomputed index list filtered by the scanner's skip policy.
//! Routing a statement to a different parser never re-scans; it re-views
//! the same tokens under that parser's policy.

use crate::tokens::token::Token;
use crate::utils::{Position, SourceMap, Span, Spanned};

/// A token paired with its source span.
pub type SpannedToken = Spanned<Token>;

/// Which token kinds survive into the significant view.
///
/// The classifier and the command scanner hide layout; the script scanner
/// keeps whitespace visible because statement boundaries depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPolicy {
    /// Classification: whitespace and comments are insignificant.
    Classifier,
    /// Native command parsing: whitespace, comments, and all directives
    /// are insignificant.
    NativeCommand,
    /// Component statement parsing: as `NativeCommand`, except the usage
    /// directive stays visible because it can stand as an exchange
    /// reference.
    ComponentModel,
    /// Script assembly: only comments are insignificant.
    Script,
}

impl SkipPolicy {
    /// Whether `token` survives into the significant view.
    pub fn retains(&self, token: &Token) -> bool {
        match self {
            SkipPolicy::Classifier => !token.is_whitespace() && !token.is_comment(),
            SkipPolicy::NativeCommand => {
                !token.is_whitespace() && !token.is_comment() && !token.is_directive()
            }
            SkipPolicy::ComponentModel => {
                !token.is_whitespace()
                    && !token.is_comment()
                    && !matches!(
                        token,
                        Token::CompileDirective | Token::DialectDirective(_)
                    )
            }
            SkipPolicy::Script => !token.is_comment(),
        }
    }
}

/// Immutable token sequence plus a cursor over its significant view.
#[derive(Debug, Clone)]
pub struct TokenStream {
    all_tokens: Vec<SpannedToken>,
    significant_indices: Vec<usize>,
    policy: SkipPolicy,
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>, policy: SkipPolicy) -> Self {
        let significant_indices = Self::filter_indices(&tokens, policy);
        Self {
            all_tokens: tokens,
            significant_indices,
            policy,
            position: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(mut self, source_map: SourceMap) -> Self {
        self.source_map = Some(source_map);
        self
    }

    /// Re-view the same tokens under another policy, cursor reset.
    pub fn with_policy(mut self, policy: SkipPolicy) -> Self {
        self.significant_indices = Self::filter_indices(&self.all_tokens, policy);
        self.policy = policy;
        self.position = 0;
        self
    }

    fn filter_indices(tokens: &[SpannedToken], policy: SkipPolicy) -> Vec<usize> {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, spanned)| policy.retains(&spanned.value))
            .map(|(index, _)| index)
            .collect()
    }

    /// Total token count, trivia included.
    pub fn len(&self) -> usize {
        self.all_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_tokens.is_empty()
    }

    /// Count of tokens the current policy retains.
    pub fn significant_len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn policy(&self) -> SkipPolicy {
        self.policy
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.all_tokens
    }

    /// The significant token under the cursor.
    pub fn current(&self) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position)
            .and_then(|&index| self.all_tokens.get(index))
    }

    /// Look `offset` significant tokens past the cursor without moving it.
    pub fn peek_ahead(&self, offset: usize) -> Option<&SpannedToken> {
        self.significant_indices
            .get(self.position + offset)
            .and_then(|&index| self.all_tokens.get(index))
    }

    /// Consume and return the significant token under the cursor.
    pub fn advance(&mut self) -> Option<&SpannedToken> {
        let index = self.significant_indices.get(self.position).copied()?;
        self.position += 1;
        self.all_tokens.get(index)
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.significant_indices.len()
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, position: usize) {
        self.position = position.min(self.significant_indices.len());
    }

    /// Span covering the significant tokens from `from` (a saved cursor)
    /// up to but excluding the current cursor.
    pub fn span_from(&self, from: usize) -> Option<Span> {
        let first = self
            .significant_indices
            .get(from)
            .and_then(|&index| self.all_tokens.get(index))?;
        let last_position = self.position.checked_sub(1)?.max(from);
        let last = self
            .significant_indices
            .get(last_position)
            .and_then(|&index| self.all_tokens.get(index))?;
        Some(first.span.merge(last.span))
    }

    /// Iterate the significant view from the beginning, cursor untouched.
    pub fn iter_significant(&self) -> impl Iterator<Item = &SpannedToken> {
        self.significant_indices
            .iter()
            .filter_map(move |&index| self.all_tokens.get(index))
    }

    /// Whether any significant token satisfies `predicate`. Used by the
    /// statement router to pick a parser.
    pub fn any_significant(&self, predicate: impl Fn(&Token) -> bool) -> bool {
        self.iter_significant()
            .any(|spanned| predicate(&spanned.value))
    }
}

/// Builds token streams with synthetic but consistent spans. Parser tests
/// use this instead of running a scanner.
#[derive(Debug, Default)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            position: Position::start(),
        }
    }

    /// Append a token, deriving its span from the source spelling.
    pub fn push(&mut self, token: Token) {
        let text = token.as_source_string();
        let start = self.position;
        let end = start.advance_str(&text);
        self.tokens.push(Spanned::new(token, Span::new(start, end)));
        self.position = end;
    }

    /// Append a token followed by a single space.
    pub fn push_spaced(&mut self, token: Token) {
        self.push(token);
        self.push(Token::Space);
    }

    pub fn build(mut self, policy: SkipPolicy) -> TokenStream {
        let eof_span = Span::new(self.position, self.position);
        self.tokens.push(Spanned::new(Token::Eof, eof_span));
        TokenStream::new(self.tokens, policy)
    }
}
