//! Lexical analysis stages for the console front end
//!
//! Three scanners share one catalog-driven scan loop and differ only in
//! their rule tables and skip policies. The command classifier routes raw
//! console input, the native command scanner tokenizes statements against
//! a registry snapshot, and the script scanner tokenizes whole script
//! files with layout preserved. No scanner ever drops input: lexemes no
//! rule covers are rescued as UNKNOWN tokens and carried forward.

pub mod catalog;
pub mod classifier;
pub mod command;
pub mod script;

pub use catalog::{LexemeCatalog, LexemeRule};
pub use classifier::{Classification, CommandClassifier};
pub use command::NativeCommandScanner;
pub use script::ScriptScanner;

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::log_warning;
use crate::logging::codes;
use crate::tokens::{SkipPolicy, Token, TokenClass, TokenStream};
use crate::utils::{Position, SourceMap, Span, Spanned};

/// Lexical analysis errors with compile-time resource boundaries
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexicalError {
    #[error("Input too large: {length} bytes (max {MAX_INPUT_LENGTH})")]
    InputTooLarge { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Lexeme too long at line {line}: {length} characters (max {MAX_LEXEME_LENGTH})")]
    LexemeTooLong { length: usize, line: u32 },

    #[error("Comment too long at line {line}: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize, line: u32 },

    #[error("Invalid lexeme rule '{pattern}': {reason}")]
    InvalidRule { pattern: String, reason: String },
}

impl LexicalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexicalError::InputTooLarge { .. } => codes::lexical::INPUT_TOO_LARGE,
            LexicalError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexicalError::LexemeTooLong { .. } => codes::lexical::LEXEME_TOO_LONG,
            LexicalError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexicalError::InvalidRule { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

/// Per-scan token metrics with runtime preference gating
#[derive(Debug, Default, Clone)]
pub struct ScanMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub constant_tokens: usize,
    pub directive_tokens: usize,
    pub punctuation_tokens: usize,
    pub comment_count: usize,
    pub max_comment_length: usize,
    pub rescued_lexemes: usize,

    // Runtime preference-controlled metrics
    pub whitespace_tokens: usize,
}

impl ScanMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        match token.class() {
            TokenClass::Keyword => self.keyword_tokens += 1,
            TokenClass::Identifier => self.identifier_tokens += 1,
            TokenClass::Constant => self.constant_tokens += 1,
            TokenClass::Directive => self.directive_tokens += 1,
            TokenClass::Operator | TokenClass::Punctuation => self.punctuation_tokens += 1,
            TokenClass::Comment => self.comment_count += 1,
            TokenClass::Whitespace => {
                if preferences.collect_detailed_metrics {
                    self.whitespace_tokens += 1;
                }
            }
            TokenClass::Unknown | TokenClass::Special => {}
        }
    }

    pub(crate) fn record_comment_length(&mut self, length: usize) {
        self.max_comment_length = self.max_comment_length.max(length);
    }

    pub(crate) fn record_rescued(&mut self) {
        self.rescued_lexemes += 1;
    }
}

/// Catalog-driven scan loop shared by all three scanners.
///
/// Matches rules first-match-wins at the current offset, rescues unmatched
/// lexemes as UNKNOWN tokens, tracks positions across line breaks and
/// appends the EOF token. The returned stream carries a source map so
/// later stages can excerpt the offending line in diagnostics.
pub(crate) fn scan_source(
    catalog: &LexemeCatalog,
    input: &str,
    policy: SkipPolicy,
    metrics: &mut ScanMetrics,
    preferences: &LexicalPreferences,
    warn_on_rescue: bool,
) -> Result<TokenStream, LexicalError> {
    if input.len() > MAX_INPUT_LENGTH {
        return Err(LexicalError::InputTooLarge {
            length: input.len(),
        });
    }

    let mut tokens = Vec::new();
    let mut position = Position::start();

    while position.offset < input.len() {
        if tokens.len() >= MAX_TOKEN_COUNT {
            return Err(LexicalError::TooManyTokens {
                count: tokens.len(),
            });
        }

        let rest = &input[position.offset..];
        let (token, length, rescued) = match catalog.match_at(rest) {
            Some((token, length)) => (token, length, false),
            None => {
                let (token, length) = catalog.rescue_at(rest);
                (token, length, true)
            }
        };

        // Comments have their own, larger limit
        match &token {
            Token::Comment(content) => {
                let chars = content.chars().count();
                if chars > MAX_COMMENT_LENGTH {
                    return Err(LexicalError::CommentTooLong {
                        length: chars,
                        line: position.line,
                    });
                }
                metrics.record_comment_length(chars);
            }
            _ => {
                if length > MAX_LEXEME_LENGTH {
                    return Err(LexicalError::LexemeTooLong {
                        length,
                        line: position.line,
                    });
                }
            }
        }

        let end = position.advance_str(&rest[..length]);

        if rescued {
            metrics.record_rescued();
            if warn_on_rescue && preferences.log_rescued_lexemes {
                log_warning!("No lexeme rule matched, input rescued as UNKNOWN",
                    "code" => codes::lexical::UNMATCHED_LEXEME,
                    "lexeme" => &rest[..length],
                    "line" => position.line,
                    "column" => position.column
                );
            }
        }

        metrics.record_token(&token, preferences);
        tokens.push(Spanned::new(token, Span::new(position, end)));
        position = end;
    }

    tokens.push(Spanned::new(Token::Eof, Span::new(position, position)));

    Ok(TokenStream::new(tokens, policy).with_source_map(SourceMap::new(input.to_string())))
}
