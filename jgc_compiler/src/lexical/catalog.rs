//! Ordered lexeme rule catalogs for the three scanner stages
//!
//! Each scanner owns a catalog: a list of anchored patterns tried in order
//! against the unconsumed input, first match wins. The command catalog is
//! rebuilt from a registry snapshot so that registered model names lex as
//! keyword tokens; the classifier and script catalogs are fixed. Registered
//! names are injected longest first, so a name that prefixes another can
//! never shadow it inside the alternation.

use regex::{Captures, Regex};

use super::LexicalError;
use crate::symbols::ModelRegistry;
use crate::tokens::{classify_flag, classify_script_word, Token};

/// Words must contain at least one separator character, so plain
/// identifiers fall through to the variable or dialect rules below
const WORD_PATTERN: &str = r"^[\w./:\\-]*[./:\\-][\w./:\\-]*";

/// How a rule turns its match into a token.
enum RuleAction {
    /// Clone a fixed token (layout, punctuators)
    Emit(Token),
    /// Build the token from the capture groups
    Build(fn(&Captures<'_>) -> Token),
}

/// One lexeme rule: an anchored pattern plus its token action.
pub struct LexemeRule {
    pattern: Regex,
    action: RuleAction,
}

impl LexemeRule {
    fn try_match(&self, input: &str) -> Option<(Token, usize)> {
        let caps = self.pattern.captures(input)?;
        let matched = caps.get(0)?;
        // A zero-length match would stall the scan loop
        if matched.start() != 0 || matched.end() == 0 {
            return None;
        }
        let token = match &self.action {
            RuleAction::Emit(token) => token.clone(),
            RuleAction::Build(make) => make(&caps),
        };
        Some((token, matched.end()))
    }
}

/// An ordered lexeme rule list with a rescue pattern of last resort.
pub struct LexemeCatalog {
    rules: Vec<LexemeRule>,
    rescue: Regex,
}

impl LexemeCatalog {
    fn empty() -> Result<Self, LexicalError> {
        Ok(Self {
            rules: Vec::new(),
            rescue: compile(r"^\S+")?,
        })
    }

    /// Catalog for the command classifier: compile directives and script
    /// pathnames; everything else is left unmatched on purpose.
    pub fn classifier() -> Result<Self, LexicalError> {
        let mut catalog = Self::empty()?;
        catalog.push_layout_rules()?;
        catalog.emit(r"(?i)^/compile\b", Token::CompileDirective)?;
        catalog.build(r"(?i)^\S+\.jgrass\b", pathname_token)?;
        catalog.build(r"(?i)^\S+\.jgs\b", pathname_token)?;
        Ok(catalog)
    }

    /// Catalog for the native command scanner. Model names registered in
    /// the snapshot lex as keyword tokens, case-insensitively.
    pub fn command(registry: &ModelRegistry) -> Result<Self, LexicalError> {
        let mut catalog = Self::empty()?;
        catalog.push_layout_rules()?;
        catalog.emit(r"(?i)^/compile\b", Token::CompileDirective)?;
        catalog.build(r"^--[A-Za-z][A-Za-z0-9_-]*", flag_token)?;
        catalog.emit(r"^=", Token::Assign)?;
        catalog.emit(r"^\*", Token::Asterisk)?;
        catalog.emit(r"^\[", Token::BracketOpen)?;
        catalog.emit(r"^\]", Token::BracketClose)?;
        catalog.emit(r"^;", Token::Semicolon)?;
        catalog.build(r#"^"([^"]*)""#, quoted_token)?;
        catalog.build(r"^'([^']*)'", quoted_token)?;
        catalog.build(r"^-?[0-9]+(?:\.[0-9]+)?\b", number_token)?;
        if !registry.native_keywords().is_empty() {
            catalog.build(
                &keyword_alternation(registry.native_keywords()),
                native_keyword_token,
            )?;
        }
        if !registry.component_keywords().is_empty() {
            catalog.build(
                &keyword_alternation(registry.component_keywords()),
                component_keyword_token,
            )?;
        }
        catalog.build(WORD_PATTERN, word_token)?;
        catalog.build(r"^[A-Za-z_][A-Za-z0-9_]*", variable_token)?;
        Ok(catalog)
    }

    /// Catalog for the script scanner: block delimiters and dialect words,
    /// no registry injection. Statement text is re-scanned later with a
    /// command catalog, which is why plain identifiers lex as words here.
    pub fn script() -> Result<Self, LexicalError> {
        let mut catalog = Self::empty()?;
        catalog.push_layout_rules()?;
        catalog.emit(r"(?i)^/compile\b", Token::CompileDirective)?;
        catalog.emit(r"^\{", Token::BlockOpen)?;
        catalog.emit(r"^\}", Token::BlockClose)?;
        catalog.emit(r"^;", Token::Semicolon)?;
        catalog.emit(r"^=", Token::Assign)?;
        catalog.emit(r"^\*", Token::Asterisk)?;
        catalog.emit(r"^\[", Token::BracketOpen)?;
        catalog.emit(r"^\]", Token::BracketClose)?;
        catalog.build(r#"^"([^"]*)""#, quoted_token)?;
        catalog.build(r"^'([^']*)'", quoted_token)?;
        catalog.build(r"^-?[0-9]+(?:\.[0-9]+)?\b", number_token)?;
        catalog.build(WORD_PATTERN, word_token)?;
        catalog.build(r"^[A-Za-z_][A-Za-z0-9_]*", script_word_token)?;
        Ok(catalog)
    }

    /// Try every rule in order against the start of `input`.
    pub fn match_at(&self, input: &str) -> Option<(Token, usize)> {
        self.rules.iter().find_map(|rule| rule.try_match(input))
    }

    /// Rescue of last resort: consume the run of non-space characters at
    /// the start of `input` as an UNKNOWN token. Layout rules own every
    /// whitespace kind, so the run is non-empty whenever this is reached;
    /// a single character is consumed otherwise so the scan always moves.
    pub fn rescue_at(&self, input: &str) -> (Token, usize) {
        if let Some(matched) = self.rescue.find(input) {
            if matched.start() == 0 && matched.end() > 0 {
                return (Token::Unknown(matched.as_str().to_string()), matched.end());
            }
        }
        let length = input.chars().next().map_or(1, char::len_utf8);
        (Token::Unknown(input[..length].to_string()), length)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn push_layout_rules(&mut self) -> Result<(), LexicalError> {
        self.emit(r"^ ", Token::Space)?;
        self.emit(r"^\t", Token::Tab)?;
        self.emit(r"^\n", Token::Newline)?;
        self.emit(r"^\r", Token::CarriageReturn)?;
        self.emit(r"^\x0C", Token::FormFeed)?;
        self.build(r"^#[^\r\n]*", comment_token)
    }

    fn emit(&mut self, pattern: &str, token: Token) -> Result<(), LexicalError> {
        self.rules.push(LexemeRule {
            pattern: compile(pattern)?,
            action: RuleAction::Emit(token),
        });
        Ok(())
    }

    fn build(&mut self, pattern: &str, make: fn(&Captures<'_>) -> Token) -> Result<(), LexicalError> {
        self.rules.push(LexemeRule {
            pattern: compile(pattern)?,
            action: RuleAction::Build(make),
        });
        Ok(())
    }
}

fn compile(pattern: &str) -> Result<Regex, LexicalError> {
    Regex::new(pattern).map_err(|e| LexicalError::InvalidRule {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Case-insensitive alternation over registered names. The alternation is
/// leftmost-first, so callers pass names sorted longest first.
fn keyword_alternation(names: &[String]) -> String {
    let escaped: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();
    format!(r"(?i)^(?:{})\b", escaped.join("|"))
}

fn comment_token(caps: &Captures<'_>) -> Token {
    Token::Comment(caps[0][1..].to_string())
}

fn pathname_token(caps: &Captures<'_>) -> Token {
    Token::Pathname(caps[0].to_string())
}

fn flag_token(caps: &Captures<'_>) -> Token {
    classify_flag(&caps[0][2..])
}

fn quoted_token(caps: &Captures<'_>) -> Token {
    Token::Literal(caps[1].to_string())
}

fn number_token(caps: &Captures<'_>) -> Token {
    Token::Literal(caps[0].to_string())
}

fn native_keyword_token(caps: &Captures<'_>) -> Token {
    Token::NativeModel(caps[0].to_string())
}

fn component_keyword_token(caps: &Captures<'_>) -> Token {
    Token::Model(caps[0].to_string())
}

fn word_token(caps: &Captures<'_>) -> Token {
    Token::Word(caps[0].to_string())
}

fn variable_token(caps: &Captures<'_>) -> Token {
    Token::Variable(caps[0].to_string())
}

fn script_word_token(caps: &Captures<'_>) -> Token {
    classify_script_word(&caps[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::keywords::Dialect;
    use crate::symbols::ModelManifest;
    use std::path::Path;

    fn registry() -> ModelRegistry {
        let manifest = ModelManifest::parse(
            r#"
            [[native_model]]
            name = "h.flow"

            [[native_model]]
            name = "h.flow.ext"

            [[component_model]]
            name = "h_ab"
            default_key = true
            "#,
            Path::new("catalog-tests.toml"),
        )
        .unwrap();
        ModelRegistry::from_manifest(&manifest).unwrap()
    }

    fn lex(catalog: &LexemeCatalog, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while offset < input.len() {
            let rest = &input[offset..];
            let (token, length) = catalog
                .match_at(rest)
                .unwrap_or_else(|| catalog.rescue_at(rest));
            tokens.push(token);
            offset += length;
        }
        tokens
    }

    #[test]
    fn command_catalog_injects_registry_keywords() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        let tokens = lex(&catalog, "out = h_ab");
        assert_eq!(
            tokens,
            vec![
                Token::Variable("out".to_string()),
                Token::Space,
                Token::Assign,
                Token::Space,
                Token::Model("h_ab".to_string()),
            ]
        );
        assert_eq!(
            lex(&catalog, "h.flow"),
            vec![Token::NativeModel("h.flow".to_string())]
        );
    }

    #[test]
    fn longer_registered_name_wins_over_its_prefix() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, "h.flow.ext"),
            vec![Token::NativeModel("h.flow.ext".to_string())]
        );
    }

    #[test]
    fn keyword_match_respects_identifier_boundary() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        // "h_ab2" is a different identifier, not the registered "h_ab"
        assert_eq!(
            lex(&catalog, "h_ab2"),
            vec![Token::Variable("h_ab2".to_string())]
        );
    }

    #[test]
    fn registered_names_match_case_insensitively() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, "H.FLOW"),
            vec![Token::NativeModel("H.FLOW".to_string())]
        );
    }

    #[test]
    fn flags_classify_into_exchange_tokens() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, "--igrass-pit"),
            vec![Token::Input("pit".to_string())]
        );
        assert_eq!(
            lex(&catalog, "--ograss-netnumber"),
            vec![Token::Output("netnumber".to_string())]
        );
        assert_eq!(lex(&catalog, "--usage"), vec![Token::UsageDirective]);
        assert_eq!(
            lex(&catalog, "--mode"),
            vec![Token::Argument("mode".to_string())]
        );
    }

    #[test]
    fn words_require_a_separator_character() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, "h.unregistered"),
            vec![Token::Word("h.unregistered".to_string())]
        );
        assert_eq!(
            lex(&catalog, "data/basin"),
            vec![Token::Word("data/basin".to_string())]
        );
        assert_eq!(
            lex(&catalog, "plain"),
            vec![Token::Variable("plain".to_string())]
        );
    }

    #[test]
    fn quoted_and_numeric_constants() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, r#""two words""#),
            vec![Token::Literal("two words".to_string())]
        );
        assert_eq!(
            lex(&catalog, "'single'"),
            vec![Token::Literal("single".to_string())]
        );
        assert_eq!(
            lex(&catalog, "-3.5"),
            vec![Token::Literal("-3.5".to_string())]
        );
    }

    #[test]
    fn script_catalog_tags_dialect_words() {
        let catalog = LexemeCatalog::script().unwrap();
        assert_eq!(
            lex(&catalog, "jgrass"),
            vec![Token::DialectDirective(Dialect::Jgrass)]
        );
        assert_eq!(lex(&catalog, "r"), vec![Token::DialectDirective(Dialect::R)]);
        assert_eq!(
            lex(&catalog, "basin"),
            vec![Token::Word("basin".to_string())]
        );
    }

    #[test]
    fn script_catalog_leaves_flags_as_words() {
        let catalog = LexemeCatalog::script().unwrap();
        assert_eq!(
            lex(&catalog, "--igrass-pit"),
            vec![Token::Word("--igrass-pit".to_string())]
        );
    }

    #[test]
    fn classifier_catalog_matches_script_pathnames() {
        let catalog = LexemeCatalog::classifier().unwrap();
        assert_eq!(
            lex(&catalog, "MyBasin.JGS"),
            vec![Token::Pathname("MyBasin.JGS".to_string())]
        );
        assert_eq!(
            lex(&catalog, "run/basin.jgrass"),
            vec![Token::Pathname("run/basin.jgrass".to_string())]
        );
        // Not a script extension: falls to the rescue pattern
        assert_eq!(
            lex(&catalog, "basin.jgsx"),
            vec![Token::Unknown("basin.jgsx".to_string())]
        );
    }

    #[test]
    fn rescue_consumes_the_nonspace_run() {
        let catalog = LexemeCatalog::command(&registry()).unwrap();
        assert_eq!(
            lex(&catalog, "@@@ x"),
            vec![
                Token::Unknown("@@@".to_string()),
                Token::Space,
                Token::Variable("x".to_string()),
            ]
        );
    }

    #[test]
    fn layout_rules_cover_every_whitespace_kind() {
        let catalog = LexemeCatalog::script().unwrap();
        assert_eq!(
            lex(&catalog, " \t\r\n\u{000C}"),
            vec![
                Token::Space,
                Token::Tab,
                Token::CarriageReturn,
                Token::Newline,
                Token::FormFeed,
            ]
        );
    }

    #[test]
    fn comment_rule_stops_at_line_end() {
        let catalog = LexemeCatalog::script().unwrap();
        assert_eq!(
            lex(&catalog, "# header\nr"),
            vec![
                Token::Comment(" header".to_string()),
                Token::Newline,
                Token::DialectDirective(Dialect::R),
            ]
        );
    }
}
