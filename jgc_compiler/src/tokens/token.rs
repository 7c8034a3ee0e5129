//! Token definitions shared by the three console scanners
//!
//! Tokens carry their payload directly: model keywords hold the invoked
//! type name, exchange flags hold the quantity they reference, arguments
//! hold the flag name. Scanners never interpret payloads; that is parser
//! and binding territory.

use crate::grammar::keywords::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single lexeme produced by one of the scanners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    // === REGISTRY-INJECTED MODEL KEYWORDS ===
    /// A registered component-model name; payload is the raw type name.
    Model(String),
    /// A registered native-model name; payload is the raw type name.
    NativeModel(String),

    // === EXCHANGE FLAGS AND ARGUMENTS ===
    /// `--igrass-<quantity>`; payload is the quantity name.
    Input(String),
    /// `--ograss-<quantity>`; payload is the quantity name.
    Output(String),
    /// `--<name>`; payload is the flag name.
    Argument(String),

    // === IDENTIFIERS AND VALUES ===
    /// Plain identifier: letters, digits, underscores.
    Variable(String),
    /// Identifier-like run containing path or qualifier separators.
    Word(String),
    /// Quoted string content or a numeric literal, unquoted.
    Literal(String),

    // === PUNCTUATORS ===
    /// The single assignment punctuator `=`.
    Assign,
    BlockOpen,
    BlockClose,
    BracketOpen,
    BracketClose,
    Semicolon,

    // === OPERATORS ===
    /// Exchange wildcard `*`.
    Asterisk,

    // === DIRECTIVES ===
    /// `/compile` compile-and-run directive.
    CompileDirective,
    /// `--usage` help request.
    UsageDirective,
    /// One of the three sub-language block introducers.
    DialectDirective(Dialect),

    // === CLASSIFIER OUTPUT ===
    /// A script pathname matched by the classifier; payload is the raw path.
    Pathname(String),

    // === WHITESPACE ===
    Space,
    Tab,
    Newline,
    CarriageReturn,
    FormFeed,

    // === TRIVIA AND RESCUE ===
    /// `#` comment to end of line; payload excludes the marker.
    Comment(String),
    /// Input no lexeme rule matched; scanning continues past it.
    Unknown(String),

    /// End of input marker appended by every scanner.
    Eof,
}

/// Coarse classification used by metrics and skip policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Whitespace,
    Comment,
    Constant,
    Directive,
    Identifier,
    Keyword,
    Operator,
    Punctuation,
    Unknown,
    Special,
}

impl Token {
    /// Coarse class of this token.
    pub fn class(&self) -> TokenClass {
        match self {
            Token::Model(_) | Token::NativeModel(_) => TokenClass::Keyword,
            Token::Input(_) | Token::Output(_) | Token::Argument(_) => TokenClass::Punctuation,
            Token::Variable(_) | Token::Word(_) => TokenClass::Identifier,
            Token::Literal(_) | Token::Pathname(_) => TokenClass::Constant,
            Token::Assign
            | Token::BlockOpen
            | Token::BlockClose
            | Token::BracketOpen
            | Token::BracketClose
            | Token::Semicolon => TokenClass::Punctuation,
            Token::Asterisk => TokenClass::Operator,
            Token::CompileDirective | Token::UsageDirective | Token::DialectDirective(_) => {
                TokenClass::Directive
            }
            Token::Space
            | Token::Tab
            | Token::Newline
            | Token::CarriageReturn
            | Token::FormFeed => TokenClass::Whitespace,
            Token::Comment(_) => TokenClass::Comment,
            Token::Unknown(_) => TokenClass::Unknown,
            Token::Eof => TokenClass::Special,
        }
    }

    /// Fine-grained tag name used in diagnostics.
    pub const fn tag(&self) -> &'static str {
        match self {
            Token::Model(_) => "MODEL",
            Token::NativeModel(_) => "NATIVE_MODEL",
            Token::Input(_) => "INPUT",
            Token::Output(_) => "OUTPUT",
            Token::Argument(_) => "ARGUMENT",
            Token::Variable(_) => "VARIABLE",
            Token::Word(_) => "WORD",
            Token::Literal(_) => "LITERAL",
            Token::Assign => "CHARACTER_ASSIGN",
            Token::BlockOpen => "BLOCK_OPEN",
            Token::BlockClose => "BLOCK_CLOSE",
            Token::BracketOpen => "BRACKET_OPEN",
            Token::BracketClose => "BRACKET_CLOSE",
            Token::Semicolon => "SEMICOLON",
            Token::Asterisk => "ASTERISK",
            Token::CompileDirective => "DIRECTIVE_COMPILE",
            Token::UsageDirective => "DIRECTIVE_USAGE",
            Token::DialectDirective(Dialect::Jgrass) => "DIRECTIVE_JGRASS",
            Token::DialectDirective(Dialect::Grass) => "DIRECTIVE_GRASS",
            Token::DialectDirective(Dialect::R) => "DIRECTIVE_R",
            Token::Pathname(_) => "PATHNAME",
            Token::Space => "SPACE",
            Token::Tab => "TAB",
            Token::Newline => "NEWLINE",
            Token::CarriageReturn => "CARRIAGE_RETURN",
            Token::FormFeed => "FORMFEED",
            Token::Comment(_) => "COMMENT",
            Token::Unknown(_) => "UNKNOWN",
            Token::Eof => "EOF",
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.class(), TokenClass::Whitespace)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    pub fn is_directive(&self) -> bool {
        matches!(self.class(), TokenClass::Directive)
    }

    /// Tokens accepted where a parameter, argument, or default-key value is
    /// expected. Rescued UNKNOWN lexemes count as values so one bad lexeme
    /// does not cascade into a second diagnostic.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Token::Literal(_) | Token::Word(_) | Token::Variable(_) | Token::Unknown(_)
        )
    }

    /// Flags that introduce a parameter assignment in the native grammar.
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            Token::Input(_) | Token::Output(_) | Token::Argument(_)
        )
    }

    /// Tokens that may stand as the wired side of an exchange-item
    /// reference.
    pub fn is_exchange_reference(&self) -> bool {
        matches!(
            self,
            Token::Asterisk
                | Token::BracketOpen
                | Token::Literal(_)
                | Token::UsageDirective
                | Token::Variable(_)
                | Token::Word(_)
        )
    }

    /// Statement boundary markers inside script blocks.
    pub fn ends_statement(&self) -> bool {
        matches!(self, Token::Newline | Token::Semicolon)
    }

    /// Raw type name carried by a model keyword token.
    pub fn model_name(&self) -> Option<&str> {
        match self {
            Token::Model(name) | Token::NativeModel(name) => Some(name),
            _ => None,
        }
    }

    /// Reconstruct the source spelling of this token. Whitespace and
    /// punctuators reproduce exactly; quoted literals render unquoted.
    pub fn as_source_string(&self) -> String {
        match self {
            Token::Model(name) | Token::NativeModel(name) => name.clone(),
            Token::Input(quantity) => format!("--igrass-{}", quantity),
            Token::Output(quantity) => format!("--ograss-{}", quantity),
            Token::Argument(name) => format!("--{}", name),
            Token::Variable(name) | Token::Word(name) => name.clone(),
            Token::Literal(value) => value.clone(),
            Token::Assign => "=".to_string(),
            Token::BlockOpen => "{".to_string(),
            Token::BlockClose => "}".to_string(),
            Token::BracketOpen => "[".to_string(),
            Token::BracketClose => "]".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Asterisk => "*".to_string(),
            Token::CompileDirective => "/compile".to_string(),
            Token::UsageDirective => "--usage".to_string(),
            Token::DialectDirective(dialect) => dialect.as_str().to_string(),
            Token::Pathname(path) => path.clone(),
            Token::Space => " ".to_string(),
            Token::Tab => "\t".to_string(),
            Token::Newline => "\n".to_string(),
            Token::CarriageReturn => "\r".to_string(),
            Token::FormFeed => "\u{000C}".to_string(),
            Token::Comment(content) => format!("#{}", content),
            Token::Unknown(text) => text.clone(),
            Token::Eof => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "<EOF>"),
            _ => write!(f, "{}", self.as_source_string()),
        }
    }
}

/// Classify the body of a `--` flag lexeme. Exchange prefixes and the usage
/// directive are carved out first; everything else is a keyword argument.
pub fn classify_flag(body: &str) -> Token {
    if body == "usage" {
        Token::UsageDirective
    } else if let Some(quantity) = body.strip_prefix("igrass-") {
        Token::Input(quantity.to_string())
    } else if let Some(quantity) = body.strip_prefix("ograss-") {
        Token::Output(quantity.to_string())
    } else {
        Token::Argument(body.to_string())
    }
}

/// Classify a bare word in script position: the three dialect introducers
/// are reserved, anything else stays a word for the statement re-scan.
pub fn classify_script_word(word: &str) -> Token {
    match Dialect::from_str(word) {
        Some(dialect) => Token::DialectDirective(dialect),
        None => Token::Word(word.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_classification_carves_out_exchange_prefixes() {
        assert_eq!(classify_flag("igrass-pit"), Token::Input("pit".to_string()));
        assert_eq!(
            classify_flag("ograss-flow"),
            Token::Output("flow".to_string())
        );
        assert_eq!(classify_flag("usage"), Token::UsageDirective);
        assert_eq!(classify_flag("mode"), Token::Argument("mode".to_string()));
        // A bare "igrass" without the dash is an ordinary argument name.
        assert_eq!(classify_flag("igrass"), Token::Argument("igrass".to_string()));
    }

    #[test]
    fn script_word_classification_reserves_dialects() {
        assert_eq!(
            classify_script_word("jgrass"),
            Token::DialectDirective(Dialect::Jgrass)
        );
        assert_eq!(
            classify_script_word("r"),
            Token::DialectDirective(Dialect::R)
        );
        assert_eq!(
            classify_script_word("rain"),
            Token::Word("rain".to_string())
        );
    }

    #[test]
    fn coarse_classes_cover_the_grammar_surface() {
        assert_eq!(Token::Model("h_ab".into()).class(), TokenClass::Keyword);
        assert_eq!(Token::Input("pit".into()).class(), TokenClass::Punctuation);
        assert_eq!(Token::Variable("x".into()).class(), TokenClass::Identifier);
        assert_eq!(Token::Literal("5".into()).class(), TokenClass::Constant);
        assert_eq!(Token::Assign.class(), TokenClass::Punctuation);
        assert_eq!(Token::Asterisk.class(), TokenClass::Operator);
        assert_eq!(Token::CompileDirective.class(), TokenClass::Directive);
        assert_eq!(Token::Space.class(), TokenClass::Whitespace);
        assert_eq!(Token::Unknown("@@".into()).class(), TokenClass::Unknown);
        assert_eq!(Token::Eof.class(), TokenClass::Special);
    }

    #[test]
    fn source_strings_reconstruct_flags() {
        assert_eq!(
            Token::Input("pit".to_string()).as_source_string(),
            "--igrass-pit"
        );
        assert_eq!(
            Token::Output("flow".to_string()).as_source_string(),
            "--ograss-flow"
        );
        assert_eq!(
            Token::Argument("mode".to_string()).as_source_string(),
            "--mode"
        );
        assert_eq!(Token::UsageDirective.as_source_string(), "--usage");
    }

    #[test]
    fn value_predicate_includes_rescued_lexemes() {
        assert!(Token::Literal("5".into()).is_value());
        assert!(Token::Variable("x".into()).is_value());
        assert!(Token::Unknown("@@".into()).is_value());
        assert!(!Token::Assign.is_value());
        assert!(!Token::Model("h_ab".into()).is_value());
    }

    #[test]
    fn exchange_reference_predicate_matches_grammar_set() {
        assert!(Token::Asterisk.is_exchange_reference());
        assert!(Token::BracketOpen.is_exchange_reference());
        assert!(Token::UsageDirective.is_exchange_reference());
        assert!(Token::Variable("pit".into()).is_exchange_reference());
        assert!(!Token::Assign.is_exchange_reference());
        assert!(!Token::Semicolon.is_exchange_reference());
    }
}
