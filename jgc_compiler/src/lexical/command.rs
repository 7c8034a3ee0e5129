//! Native command scanner: model-aware tokenization of one statement
//!
//! The catalog is built against a registry snapshot, so registered model
//! names lex as keyword tokens while everything else falls through to the
//! word and variable rules. Layout, directives and comments stay in the
//! full token list but are hidden from the significant view the parsers
//! consume.

use super::{scan_source, LexemeCatalog, LexicalError, ScanMetrics};
use crate::config::constants::compile_time::lexical::MAX_TOKEN_COUNT;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::symbols::ModelRegistry;
use crate::tokens::{SkipPolicy, TokenStream};
use crate::{log_debug, log_error, log_success};

pub struct NativeCommandScanner {
    catalog: LexemeCatalog,
    metrics: ScanMetrics,
    preferences: LexicalPreferences,
}

impl NativeCommandScanner {
    /// Build a scanner against one registry snapshot. The catalog embeds
    /// the registered names; a registry swap needs a fresh scanner.
    pub fn new(registry: &ModelRegistry) -> Result<Self, LexicalError> {
        Self::with_preferences(registry, LexicalPreferences::default())
    }

    pub fn with_preferences(
        registry: &ModelRegistry,
        preferences: LexicalPreferences,
    ) -> Result<Self, LexicalError> {
        Ok(Self {
            catalog: LexemeCatalog::command(registry)?,
            metrics: ScanMetrics::default(),
            preferences,
        })
    }

    /// Tokenize one command line or statement.
    pub fn tokenize(&mut self, input: &str) -> Result<TokenStream, LexicalError> {
        self.metrics = ScanMetrics::default();

        log_debug!("Starting native command scan",
            "input_length" => input.len(),
            "rules" => self.catalog.rule_count(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let stream = match scan_source(
            &self.catalog,
            input,
            SkipPolicy::NativeCommand,
            &mut self.metrics,
            &self.preferences,
            true,
        ) {
            Ok(stream) => stream,
            Err(error) => {
                log_error!(error.error_code(), "Native command scan failed",
                    "input_length" => input.len(),
                    "tokens_processed" => self.metrics.total_tokens
                );
                return Err(error);
            }
        };

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Native command scan completed",
            "token_count" => stream.len(),
            "keywords" => self.metrics.keyword_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "constants" => self.metrics.constant_tokens,
            "rescued" => self.metrics.rescued_lexemes
        );

        Ok(stream)
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ModelManifest;
    use crate::tokens::SkipPolicy;
    use std::path::Path;

    fn scanner() -> NativeCommandScanner {
        let manifest = ModelManifest::parse(
            r#"
            [[native_model]]
            name = "h.flow"

            [[component_model]]
            name = "h_ab"
            default_key = true
            "#,
            Path::new("command-tests.toml"),
        )
        .unwrap();
        let registry = ModelRegistry::from_manifest(&manifest).unwrap();
        NativeCommandScanner::with_preferences(
            &registry,
            LexicalPreferences {
                collect_detailed_metrics: true,
                log_rescued_lexemes: false,
                include_position_in_errors: true,
            },
        )
        .unwrap()
    }

    fn significant_tags(stream: &TokenStream) -> Vec<&'static str> {
        stream.iter_significant().map(|t| t.value.tag()).collect()
    }

    #[test]
    fn registered_names_lex_as_keywords() {
        let mut scanner = scanner();
        let stream = scanner
            .tokenize(r#"out = h_ab --igrass-pit "top of basin""#)
            .unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec!["VARIABLE", "CHARACTER_ASSIGN", "MODEL", "INPUT", "LITERAL", "EOF"]
        );
        assert_eq!(scanner.metrics().keyword_tokens, 1);
    }

    #[test]
    fn layout_and_comments_are_hidden_from_the_significant_view() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("out = h_ab # derive basins").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec!["VARIABLE", "CHARACTER_ASSIGN", "MODEL", "EOF"]
        );
        // The full list still carries the layout for span accounting
        assert!(stream.all_tokens().len() > stream.significant_len());
        assert_eq!(scanner.metrics().comment_count, 1);
    }

    #[test]
    fn usage_directive_is_hidden_here_but_visible_to_the_component_view() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("h_ab --usage").unwrap();
        assert_eq!(significant_tags(&stream), vec!["MODEL", "EOF"]);

        let component_view = scanner
            .tokenize("h_ab --usage")
            .unwrap()
            .with_policy(SkipPolicy::ComponentModel);
        assert_eq!(
            significant_tags(&component_view),
            vec!["MODEL", "DIRECTIVE_USAGE", "EOF"]
        );
    }

    #[test]
    fn unmatched_input_is_rescued_not_fatal() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("out = h_ab @@@").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec!["VARIABLE", "CHARACTER_ASSIGN", "MODEL", "UNKNOWN", "EOF"]
        );
        assert_eq!(scanner.metrics().rescued_lexemes, 1);
    }

    #[test]
    fn unregistered_dotted_name_stays_a_word() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("out = h.missing").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec!["VARIABLE", "CHARACTER_ASSIGN", "WORD", "EOF"]
        );
        assert_eq!(scanner.metrics().keyword_tokens, 0);
    }

    #[test]
    fn exchange_punctuation_round_trip() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("h.flow --igrass-pit [a b]; *").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec![
                "NATIVE_MODEL",
                "INPUT",
                "BRACKET_OPEN",
                "VARIABLE",
                "VARIABLE",
                "BRACKET_CLOSE",
                "SEMICOLON",
                "ASTERISK",
                "EOF"
            ]
        );
    }
}
