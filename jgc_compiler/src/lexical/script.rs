//! Script scanner: whole-file tokenization with layout preserved
//!
//! Script files interleave dialect blocks with statement text, and the
//! block assembler needs newlines to split statements, so every
//! whitespace kind survives as its own token. Comments are the only
//! lexemes filtered from the significant view. Statement text found
//! inside blocks is re-scanned later with a registry-aware command
//! catalog; this scanner only knows block structure and dialect words.

use super::{scan_source, LexemeCatalog, LexicalError, ScanMetrics};
use crate::config::constants::compile_time::lexical::MAX_INPUT_LENGTH;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{SkipPolicy, TokenStream};
use crate::{log_debug, log_error, log_success};

pub struct ScriptScanner {
    catalog: LexemeCatalog,
    metrics: ScanMetrics,
    preferences: LexicalPreferences,
}

impl ScriptScanner {
    pub fn new() -> Result<Self, LexicalError> {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Result<Self, LexicalError> {
        Ok(Self {
            catalog: LexemeCatalog::script()?,
            metrics: ScanMetrics::default(),
            preferences,
        })
    }

    /// Tokenize a whole script file.
    pub fn tokenize(&mut self, input: &str) -> Result<TokenStream, LexicalError> {
        self.metrics = ScanMetrics::default();

        log_debug!("Starting script scan",
            "input_length" => input.len(),
            "rules" => self.catalog.rule_count(),
            "max_input_allowed" => MAX_INPUT_LENGTH
        );

        let stream = match scan_source(
            &self.catalog,
            input,
            SkipPolicy::Script,
            &mut self.metrics,
            &self.preferences,
            true,
        ) {
            Ok(stream) => stream,
            Err(error) => {
                log_error!(error.error_code(), "Script scan failed",
                    "input_length" => input.len(),
                    "tokens_processed" => self.metrics.total_tokens
                );
                return Err(error);
            }
        };

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Script scan completed",
            "token_count" => stream.len(),
            "directives" => self.metrics.directive_tokens,
            "comments" => self.metrics.comment_count,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> ScriptScanner {
        ScriptScanner::with_preferences(LexicalPreferences {
            collect_detailed_metrics: true,
            log_rescued_lexemes: false,
            include_position_in_errors: true,
        })
        .unwrap()
    }

    fn significant_tags(stream: &TokenStream) -> Vec<&'static str> {
        stream.iter_significant().map(|t| t.value.tag()).collect()
    }

    #[test]
    fn whitespace_kinds_survive_as_distinct_tokens() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("jgrass {\n}\n").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec![
                "DIRECTIVE_JGRASS",
                "SPACE",
                "BLOCK_OPEN",
                "NEWLINE",
                "BLOCK_CLOSE",
                "NEWLINE",
                "EOF"
            ]
        );
    }

    #[test]
    fn comments_are_the_only_filtered_kind() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("# header\nr { x }\n").unwrap();
        let tags = significant_tags(&stream);
        assert!(!tags.contains(&"COMMENT"));
        assert_eq!(tags[0], "NEWLINE");
        assert_eq!(scanner.metrics().comment_count, 1);
    }

    #[test]
    fn carriage_return_and_formfeed_stay_distinct() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("\r\n\u{000C}").unwrap();
        assert_eq!(
            significant_tags(&stream),
            vec!["CARRIAGE_RETURN", "NEWLINE", "FORMFEED", "EOF"]
        );
    }

    #[test]
    fn dialect_words_only_tag_at_script_level_scanning() {
        let mut scanner = scanner();
        let stream = scanner.tokenize("grass {\ng.region\n}\n").unwrap();
        let tags = significant_tags(&stream);
        assert_eq!(tags[0], "DIRECTIVE_GRASS");
        // "g.region" is statement text here, untouched by the registry
        assert!(tags.contains(&"WORD"));
    }

    #[test]
    fn spans_cover_the_exact_source_text() {
        let mut scanner = scanner();
        let source = "jgrass {\nout = h_ab\n}\n";
        let stream = scanner.tokenize(source).unwrap();
        let map = stream.source_map().unwrap();
        for spanned in stream.all_tokens() {
            if spanned.span.is_empty() {
                continue;
            }
            let text = map.span_text(&spanned.span);
            assert!(!text.is_empty());
        }
        assert_eq!(map.get_line(2), Some("out = h_ab"));
    }
}
