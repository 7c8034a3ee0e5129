//! Command classifier: the first scanner stage, routing raw console input
//!
//! The classifier only knows three shapes: a compile directive followed by
//! a script pathname, a bare script pathname, and everything else. It
//! never rejects a line; unmatched lexemes rescue silently because they
//! are the expected route to the command classification.

use super::{scan_source, LexemeCatalog, LexicalError, ScanMetrics};
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{SkipPolicy, Token, TokenStream};
use crate::{log_debug, log_error, log_success};

/// Route decision for one line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// `/compile <pathname>`: compile the referenced script file
    CompileScript { path: String },
    /// A bare script pathname: compile and run it directly
    ScriptReference { path: String },
    /// Anything else: hand the line to the model-aware command scanner
    Command,
}

pub struct CommandClassifier {
    catalog: LexemeCatalog,
    metrics: ScanMetrics,
    preferences: LexicalPreferences,
}

impl CommandClassifier {
    pub fn new() -> Result<Self, LexicalError> {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Result<Self, LexicalError> {
        Ok(Self {
            catalog: LexemeCatalog::classifier()?,
            metrics: ScanMetrics::default(),
            preferences,
        })
    }

    /// Classify one line of console input.
    ///
    /// Only the exact token shapes `/compile <pathname>` and `<pathname>`
    /// leave the command route; extra trailing tokens put the line back on
    /// it. Classification itself cannot fail, only the resource limits of
    /// the underlying scan can.
    pub fn classify(&mut self, input: &str) -> Result<Classification, LexicalError> {
        let stream = self.tokenize(input)?;
        let tokens: Vec<&Token> = stream.iter_significant().map(|t| &t.value).collect();

        let classification = match tokens.as_slice() {
            [Token::CompileDirective, Token::Pathname(path), Token::Eof] => {
                Classification::CompileScript { path: path.clone() }
            }
            [Token::Pathname(path), Token::Eof] => {
                Classification::ScriptReference { path: path.clone() }
            }
            _ => Classification::Command,
        };

        log_debug!("Console input classified",
            "classification" => format!("{:?}", classification),
            "significant_tokens" => tokens.len()
        );

        Ok(classification)
    }

    /// Tokenize one line with the classifier catalog. Whitespace and
    /// comments are hidden from the significant view.
    pub fn tokenize(&mut self, input: &str) -> Result<TokenStream, LexicalError> {
        self.metrics = ScanMetrics::default();

        log_debug!("Starting command classification scan",
            "input_length" => input.len(),
            "rules" => self.catalog.rule_count()
        );

        // Rescued lexemes are the normal route to the Command
        // classification, so this scanner never warns about them
        let stream = match scan_source(
            &self.catalog,
            input,
            SkipPolicy::Classifier,
            &mut self.metrics,
            &self.preferences,
            false,
        ) {
            Ok(stream) => stream,
            Err(error) => {
                log_error!(error.error_code(), "Command classification scan failed",
                    "input_length" => input.len()
                );
                return Err(error);
            }
        };

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Command classification scan completed",
            "token_count" => stream.len(),
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

    fn classifier() -> CommandClassifier {
        CommandClassifier::with_preferences(LexicalPreferences {
            collect_detailed_metrics: false,
            log_rescued_lexemes: false,
            include_position_in_errors: true,
        })
        .unwrap()
    }

    #[test]
    fn compile_directive_with_pathname_routes_to_compile() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("/compile basin.jgs").unwrap(),
            Classification::CompileScript {
                path: "basin.jgs".to_string()
            }
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("/COMPILE Basin.JGRASS").unwrap(),
            Classification::CompileScript {
                path: "Basin.JGRASS".to_string()
            }
        );
    }

    #[test]
    fn bare_pathname_routes_to_script_reference() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("  runs/basin.jgrass  ").unwrap(),
            Classification::ScriptReference {
                path: "runs/basin.jgrass".to_string()
            }
        );
    }

    #[test]
    fn everything_else_is_a_command() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("out = h_ab --igrass-pit pit").unwrap(),
            Classification::Command
        );
        assert_eq!(classifier.classify("g.region -p").unwrap(), Classification::Command);
        assert_eq!(classifier.classify("").unwrap(), Classification::Command);
        assert_eq!(classifier.classify("   ").unwrap(), Classification::Command);
    }

    #[test]
    fn trailing_tokens_defeat_the_compile_shape() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("/compile basin.jgs extra").unwrap(),
            Classification::Command
        );
        assert_eq!(
            classifier.classify("basin.jgs; ls").unwrap(),
            Classification::Command
        );
    }

    #[test]
    fn compile_directive_needs_a_word_boundary() {
        let mut classifier = classifier();
        // No boundary after "/compile", but the whole lexeme still ends
        // in a script extension, so it reads as a pathname
        assert_eq!(
            classifier.classify("/compilebasin.jgs").unwrap(),
            Classification::ScriptReference {
                path: "/compilebasin.jgs".to_string()
            }
        );
        assert_eq!(classifier.classify("/compileX").unwrap(), Classification::Command);
    }

    #[test]
    fn comments_do_not_change_the_route() {
        let mut classifier = classifier();
        assert_eq!(
            classifier.classify("/compile basin.jgs # nightly run").unwrap(),
            Classification::CompileScript {
                path: "basin.jgs".to_string()
            }
        );
    }
}
