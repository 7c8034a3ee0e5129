//! Compile pipeline: classification, scanning, routing, and tree assembly
//!
//! The [`Interpreter`] owns one console session. Each line of input is
//! classified first; compile directives and script references stage the
//! named file, everything else compiles in place as a command. Script
//! source is scanned once with layout preserved, assembled into dialect
//! blocks, and each statement is re-scanned against the registry catalog
//! before it reaches a statement parser.

mod error;
mod result;

// Re-export public types
pub use error::{PipelineError, ScriptFileError};
pub use result::{CompileOutput, CompileRoute, CompileStats};

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE,
};
use crate::config::constants::compile_time::pipeline::{MAX_BLOCK_DEPTH, MAX_SCRIPT_STATEMENTS};
use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences, PipelinePreferences};
use crate::grammar::{Dialect, NodeId, NodeKind, ParseTree};
use crate::lexical::{Classification, CommandClassifier, NativeCommandScanner, ScriptScanner};
use crate::logging::{self, codes};
use crate::symbols::{ModelManifest, ModelRegistry, RegistryHandle};
use crate::syntax::{self, ParseError};
use crate::tokens::{SkipPolicy, SpannedToken, Token, TokenStream};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_info, log_success, log_warning};

/// One console session's compile front end.
///
/// The interpreter holds a registry handle rather than a registry: each
/// compile unit takes its own snapshot, so a manifest reload between
/// lines never shifts the meaning of a compile already in flight.
pub struct Interpreter {
    registry: RegistryHandle,
    file_preferences: FileProcessorPreferences,
    lexical_preferences: LexicalPreferences,
    preferences: PipelinePreferences,
    script_counter: AtomicUsize,
}

impl Interpreter {
    pub fn new(registry: RegistryHandle) -> Self {
        Self {
            registry,
            file_preferences: FileProcessorPreferences::default(),
            lexical_preferences: LexicalPreferences::default(),
            preferences: PipelinePreferences::default(),
            script_counter: AtomicUsize::new(0),
        }
    }

    pub fn with_registry(registry: ModelRegistry) -> Self {
        Self::new(RegistryHandle::new(registry))
    }

    /// Build an interpreter from a model manifest file, the usual
    /// console entry point.
    pub fn from_manifest_path(path: &Path) -> Result<Self, PipelineError> {
        let manifest = ModelManifest::load(path)?;
        let registry = ModelRegistry::from_manifest(&manifest)?;
        log_success!(codes::success::REGISTRY_BUILD_COMPLETE,
            "Session registry built",
            "manifest" => path.display(),
            "symbols" => registry.symbol_count()
        );
        Ok(Self::with_registry(registry))
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn set_file_preferences(&mut self, preferences: FileProcessorPreferences) {
        self.file_preferences = preferences;
    }

    pub fn set_pipeline_preferences(&mut self, preferences: PipelinePreferences) {
        self.preferences = preferences;
    }

    /// Interpret one line of console input end to end.
    pub fn interpret_line(&self, input: &str) -> Result<CompileOutput, PipelineError> {
        log_info!("Interpreting console line", "input_length" => input.len());

        let mut classifier = CommandClassifier::with_preferences(self.lexical_preferences.clone())?;
        let classification = classifier.classify(input)?;
        log_success!(codes::success::CLASSIFICATION_COMPLETE,
            "Console input classified",
            "route" => match &classification {
                Classification::CompileScript { .. } => "compile-script",
                Classification::ScriptReference { .. } => "script-reference",
                Classification::Command => "command",
            }
        );

        match classification {
            Classification::CompileScript { path } => {
                let route = CompileRoute::CompileScript { path: path.clone() };
                self.compile_file_as(Path::new(&path), route)
            }
            Classification::ScriptReference { path } => {
                let route = CompileRoute::ScriptReference { path: path.clone() };
                self.compile_file_as(Path::new(&path), route)
            }
            Classification::Command => self.compile_command(input),
        }
    }

    /// Compile a script file without going through classification.
    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput, PipelineError> {
        let route = CompileRoute::ScriptReference {
            path: path.display().to_string(),
        };
        self.compile_file_as(path, route)
    }

    /// Compile script source handed to the library directly.
    pub fn compile_script(&self, source: &str) -> Result<CompileOutput, PipelineError> {
        self.compile_script_source(source, CompileRoute::Source)
    }

    fn compile_file_as(&self, path: &Path, route: CompileRoute) -> Result<CompileOutput, PipelineError> {
        let script_id = self.script_counter.fetch_add(1, Ordering::Relaxed);
        logging::with_script_context(path.to_path_buf(), script_id, || {
            let source = match self.load_script(path) {
                Ok(source) => source,
                Err(error) => {
                    log_error!(error.error_code(), "Script file rejected",
                        "path" => path.display(),
                        "reason" => error
                    );
                    return Err(error.into());
                }
            };

            log_success!(codes::success::FILE_PROCESSING_SUCCESS,
                "Script file staged",
                "path" => path.display(),
                "bytes" => source.len()
            );

            self.compile_script_source(&source, route)
        })
    }

    /// Stage a script file: existence, extension, size, encoding, and
    /// content checks, in that order.
    fn load_script(&self, path: &Path) -> Result<String, ScriptFileError> {
        if !path.exists() {
            return Err(ScriptFileError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        if self.file_preferences.require_script_extension && !has_script_extension(path) {
            return Err(ScriptFileError::InvalidExtension {
                extension: script_extension(path),
            });
        }

        let metadata = fs::metadata(path).map_err(|error| ScriptFileError::IoError {
            message: error.to_string(),
        })?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ScriptFileError::FileTooLarge {
                size: metadata.len(),
                max_size: MAX_FILE_SIZE,
            });
        }
        if metadata.len() > LARGE_FILE_THRESHOLD {
            log_warning!("Large script file",
                "path" => path.display(),
                "bytes" => metadata.len()
            );
        }

        let bytes = fs::read(path).map_err(|error| ScriptFileError::IoError {
            message: error.to_string(),
        })?;
        let source = String::from_utf8(bytes).map_err(|_| ScriptFileError::InvalidEncoding {
            path: path.display().to_string(),
        })?;

        if source.trim().is_empty() {
            return Err(ScriptFileError::EmptyFile {
                path: path.display().to_string(),
            });
        }

        Ok(source)
    }

    fn compile_script_source(&self, source: &str, route: CompileRoute) -> Result<CompileOutput, PipelineError> {
        let mut stats = CompileStats::begin();
        stats.source_bytes = source.len();

        let registry = self.registry.snapshot();
        let mut scanner = ScriptScanner::with_preferences(self.lexical_preferences.clone())?;
        let stream = scanner.tokenize(source)?;
        stats.record_scan(scanner.metrics());

        let (mut tree, root) = ParseTree::with_script_root();
        let mut assembler = ScriptAssembler {
            interpreter: self,
            registry: &registry,
            source,
            tokens: stream.all_tokens(),
            index: 0,
        };
        assembler.assemble(&mut tree, root, &mut stats)?;

        Ok(self.finish_unit(route, tree, stats))
    }

    /// Compile a console command line in place. Semicolons and newlines
    /// separate statements exactly as they do inside a script block.
    fn compile_command(&self, input: &str) -> Result<CompileOutput, PipelineError> {
        let mut stats = CompileStats::begin();
        stats.source_bytes = input.len();

        let registry = self.registry.snapshot();
        let mut scanner =
            NativeCommandScanner::with_preferences(&registry, self.lexical_preferences.clone())?;
        let stream = scanner.tokenize(input)?;
        stats.record_scan(scanner.metrics());

        let (mut tree, root) = ParseTree::with_script_root();
        for segment in split_statements(stream.all_tokens()) {
            if !has_statement_content(segment) {
                continue;
            }
            let segment_stream = TokenStream::new(segment.to_vec(), SkipPolicy::NativeCommand);
            let node = self.parse_routed_statement(&registry, segment_stream, &mut tree, root, None)?;
            if let Some(node) = node {
                stats.statement_count += 1;
                let span = tree.span(node);
                tree.widen_span(root, span);
            }
        }

        Ok(self.finish_unit(CompileRoute::Command, tree, stats))
    }

    /// Route one statement to its parser. Any registered native-model
    /// keyword claims the statement for the native sub-language;
    /// otherwise the component parser owns it. Routing re-views the
    /// same tokens under the target policy, it never rescans.
    fn parse_routed_statement(
        &self,
        registry: &Arc<ModelRegistry>,
        stream: TokenStream,
        tree: &mut ParseTree,
        parent: NodeId,
        rebase: Option<Position>,
    ) -> Result<Option<NodeId>, PipelineError> {
        let native = stream.any_significant(|token| matches!(token, Token::NativeModel(_)));
        log_debug!("Routing statement",
            "route" => if native { "native" } else { "component" }
        );

        let checkpoint = tree.len();
        let parsed = if native {
            let mut stream = stream.with_policy(SkipPolicy::NativeCommand);
            syntax::parse_native_statement(&mut stream, registry, tree, parent)
        } else {
            let mut stream = stream.with_policy(SkipPolicy::ComponentModel);
            syntax::parse_component_statement(&mut stream, registry, tree, parent)
        };

        match parsed {
            Ok(node) => {
                if let Some(base) = rebase {
                    tree.rebase_spans_from(checkpoint, base);
                }
                Ok(node)
            }
            Err(error) => {
                let error = match rebase {
                    Some(base) => {
                        let span = error.span().rebased(base);
                        error.with_span(span)
                    }
                    None => error,
                };
                log_error!(error.error_code(), "Statement aborted the compile unit",
                    span = error.span(),
                    "reason" => error
                );
                Err(PipelineError::Parse(error))
            }
        }
    }

    fn finish_unit(&self, route: CompileRoute, tree: ParseTree, mut stats: CompileStats) -> CompileOutput {
        stats.node_count = tree.len();
        stats.finish();

        if self.preferences.warn_on_unknown_tokens && stats.rescued_lexemes > 0 {
            log_warning!("Unknown lexemes were rescued during this compile",
                "count" => stats.rescued_lexemes
            );
        }
        if self.file_preferences.enable_performance_logging {
            log_debug!("Compile unit timing",
                "duration_ms" => format!("{:.2}", stats.duration_ms),
                "tokens_per_sec" => format!("{:.0}", stats.tokens_per_second())
            );
        }

        let output = CompileOutput::new(route, tree, stats);
        if self.preferences.include_compile_stats {
            output.log_success();
        } else {
            log_success!(codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
                "Compile unit completed",
                "route" => output.route.describe()
            );
        }
        output
    }
}

/// One script's walk over the layout-preserving token stream.
///
/// The script scanner leaves model names unclassified, so each statement
/// slice is re-scanned against the registry catalog before parsing; the
/// resulting spans are then rebased onto the enclosing source.
struct ScriptAssembler<'a> {
    interpreter: &'a Interpreter,
    registry: &'a Arc<ModelRegistry>,
    source: &'a str,
    tokens: &'a [SpannedToken],
    index: usize,
}

impl ScriptAssembler<'_> {
    fn assemble(
        &mut self,
        tree: &mut ParseTree,
        root: NodeId,
        stats: &mut CompileStats,
    ) -> Result<(), PipelineError> {
        while let Some(spanned) = self.tokens.get(self.index) {
            match &spanned.value {
                Token::Eof => break,
                token if token.is_whitespace() || token.is_comment() => self.index += 1,
                Token::DialectDirective(dialect) => {
                    let dialect = *dialect;
                    let directive_span = spanned.span;
                    self.index += 1;
                    self.block(dialect, directive_span, tree, root, stats)?;
                }
                token => {
                    return Err(assembly_error(ParseError::unexpected_token(
                        "a dialect block (jgrass, grass, or r)",
                        &token.to_string(),
                        spanned.span,
                    )));
                }
            }
        }
        Ok(())
    }

    fn block(
        &mut self,
        dialect: Dialect,
        directive_span: Span,
        tree: &mut ParseTree,
        root: NodeId,
        stats: &mut CompileStats,
    ) -> Result<(), PipelineError> {
        self.skip_layout();
        let open_span = match self.tokens.get(self.index) {
            Some(spanned) if matches!(spanned.value, Token::BlockOpen) => spanned.span,
            Some(spanned) => {
                return Err(assembly_error(ParseError::expected_token(
                    &format!("'{{' to open the {} block", dialect.as_str()),
                    &spanned.value.to_string(),
                    spanned.span,
                )));
            }
            None => {
                return Err(assembly_error(ParseError::expected_token(
                    &format!("'{{' to open the {} block", dialect.as_str()),
                    "<EOF>",
                    directive_span,
                )));
            }
        };
        self.index += 1;

        let block = tree.push(Some(root), NodeKind::Block { dialect }, directive_span);
        stats.block_count += 1;
        log_debug!("Opened dialect block", "dialect" => dialect.as_str());

        if dialect.is_raw() {
            self.raw_block(open_span, tree, block)?;
        } else {
            self.dialect_block(open_span, tree, block, stats)?;
        }

        let span = tree.span(block);
        tree.widen_span(root, span);
        Ok(())
    }

    /// Walk a jgrass/grass block body, splitting statements on newlines
    /// and semicolons at brace depth one.
    fn dialect_block(
        &mut self,
        open_span: Span,
        tree: &mut ParseTree,
        block: NodeId,
        stats: &mut CompileStats,
    ) -> Result<(), PipelineError> {
        let mut depth = 1usize;
        let mut range: Option<(usize, usize)> = None;

        loop {
            let Some(spanned) = self.tokens.get(self.index) else {
                return Err(assembly_error(ParseError::unmatched_delimiter("{", open_span)));
            };
            match &spanned.value {
                Token::Eof => {
                    return Err(assembly_error(ParseError::unmatched_delimiter("{", open_span)));
                }
                Token::BlockOpen => {
                    depth += 1;
                    if depth > MAX_BLOCK_DEPTH {
                        return Err(assembly_error(ParseError::BlockNestingTooDeep {
                            depth,
                            span: spanned.span,
                        }));
                    }
                    extend_range(&mut range, self.index);
                }
                Token::BlockClose => {
                    depth -= 1;
                    if depth == 0 {
                        let close_span = spanned.span;
                        self.index += 1;
                        self.flush_statement(range.take(), tree, block, stats)?;
                        tree.widen_span(block, close_span);
                        return Ok(());
                    }
                    extend_range(&mut range, self.index);
                }
                token if token.ends_statement() && depth == 1 => {
                    self.flush_statement(range.take(), tree, block, stats)?;
                }
                token if token.is_whitespace() || token.is_comment() => {}
                _ => extend_range(&mut range, self.index),
            }
            self.index += 1;
        }
    }

    /// Capture an r block body verbatim. Braces nest; the text between
    /// the outer pair passes through untouched.
    fn raw_block(
        &mut self,
        open_span: Span,
        tree: &mut ParseTree,
        block: NodeId,
    ) -> Result<(), PipelineError> {
        let mut depth = 1usize;
        let body_start = open_span.end.offset;

        loop {
            let Some(spanned) = self.tokens.get(self.index) else {
                return Err(assembly_error(ParseError::unmatched_delimiter("{", open_span)));
            };
            match &spanned.value {
                Token::Eof => {
                    return Err(assembly_error(ParseError::unmatched_delimiter("{", open_span)));
                }
                Token::BlockOpen => {
                    depth += 1;
                    if depth > MAX_BLOCK_DEPTH {
                        return Err(assembly_error(ParseError::BlockNestingTooDeep {
                            depth,
                            span: spanned.span,
                        }));
                    }
                }
                Token::BlockClose => {
                    depth -= 1;
                    if depth == 0 {
                        let text = self.source[body_start..spanned.span.start.offset].to_string();
                        let span = Span::new(open_span.end, spanned.span.start);
                        tree.push(Some(block), NodeKind::RawCode { text }, span);
                        tree.widen_span(block, spanned.span);
                        self.index += 1;
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.index += 1;
        }
    }

    /// Re-scan one statement slice against the registry catalog and hand
    /// it to the routed parser.
    fn flush_statement(
        &mut self,
        range: Option<(usize, usize)>,
        tree: &mut ParseTree,
        block: NodeId,
        stats: &mut CompileStats,
    ) -> Result<(), PipelineError> {
        let Some((first, last)) = range else {
            return Ok(());
        };

        if stats.statement_count >= MAX_SCRIPT_STATEMENTS {
            return Err(PipelineError::pipeline_error(&format!(
                "script exceeds {} statements",
                MAX_SCRIPT_STATEMENTS
            )));
        }

        let base = self.tokens[first].span.start;
        let text = &self.source[base.offset..self.tokens[last].span.end.offset];

        let mut scanner = NativeCommandScanner::with_preferences(
            self.registry,
            self.interpreter.lexical_preferences.clone(),
        )?;
        let stream = scanner.tokenize(text)?;
        stats.record_scan(scanner.metrics());

        let node = self
            .interpreter
            .parse_routed_statement(self.registry, stream, tree, block, Some(base))?;
        if let Some(node) = node {
            stats.statement_count += 1;
            let span = tree.span(node);
            tree.widen_span(block, span);
        }
        Ok(())
    }

    fn skip_layout(&mut self) {
        while let Some(spanned) = self.tokens.get(self.index) {
            if spanned.value.is_whitespace() || spanned.value.is_comment() {
                self.index += 1;
            } else {
                break;
            }
        }
    }
}

fn script_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
}

fn has_script_extension(path: &Path) -> bool {
    matches!(script_extension(path).as_deref(), Some("jgs") | Some("jgrass"))
}

/// Split a scanned command line into per-statement token runs, keeping
/// each terminator with its statement.
fn split_statements(tokens: &[SpannedToken]) -> Vec<&[SpannedToken]> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (index, spanned) in tokens.iter().enumerate() {
        if spanned.value.ends_statement() {
            segments.push(&tokens[start..=index]);
            start = index + 1;
        }
    }
    if start < tokens.len() {
        segments.push(&tokens[start..]);
    }
    segments
}

fn has_statement_content(tokens: &[SpannedToken]) -> bool {
    tokens.iter().any(|spanned| {
        let token = &spanned.value;
        !(token.is_whitespace()
            || token.is_comment()
            || token.ends_statement()
            || matches!(token, Token::Eof))
    })
}

fn extend_range(range: &mut Option<(usize, usize)>, index: usize) {
    *range = match *range {
        None => Some((index, index)),
        Some((first, _)) => Some((first, index)),
    };
}

fn assembly_error(error: ParseError) -> PipelineError {
    log_error!(error.error_code(), "Script assembly failed",
        span = error.span(),
        "reason" => error
    );
    PipelineError::Parse(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use std::path::Path;

    const MANIFEST: &str = r#"
        [[native_model]]
        name = "h.flow"

        [[component_model]]
        name = "h_ab"
        default_key = true

        [component_model.exchange]
        pit = "GridCoverage"
        flow = "GridCoverage"

        [[class]]
        name = "GridCoverage"
    "#;

    fn interpreter() -> Interpreter {
        let manifest = ModelManifest::parse(MANIFEST, Path::new("models.toml")).unwrap();
        Interpreter::with_registry(ModelRegistry::from_manifest(&manifest).unwrap())
    }

    fn write_script(dir: &tempfile::TempDir, name: &str, source: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(source.as_bytes()).unwrap();
        path
    }

    #[test]
    fn native_command_builds_parameter_children() {
        let output = interpreter()
            .interpret_line("h.flow --igrass-pit pit --ograss-flow flow")
            .unwrap();

        assert_eq!(output.route, CompileRoute::Command);
        let statements = output.tree.statements();
        assert_eq!(statements.len(), 1);
        let model = output.tree.scoped_model(statements[0]).unwrap();
        assert_matches!(output.tree.kind(model), NodeKind::NativeModel { name } if name == "h.flow");

        let children = output.tree.children(model);
        assert_eq!(children.len(), 2);
        assert_matches!(
            output.tree.kind(children[0]),
            NodeKind::Parameter { flag, value } if flag == "igrass-pit" && value == "pit"
        );
        assert_matches!(
            output.tree.kind(children[1]),
            NodeKind::Parameter { flag, value } if flag == "ograss-flow" && value == "flow"
        );
    }

    #[test]
    fn component_assignment_compiles_from_the_console() {
        let output = interpreter().interpret_line("out = h_ab 5").unwrap();

        let statements = output.tree.statements();
        assert_eq!(statements.len(), 1);
        assert_matches!(
            output.tree.kind(statements[0]),
            NodeKind::Statement { target: Some(target) } if target == "out"
        );
        let model = output.tree.scoped_model(statements[0]).unwrap();
        let children = output.tree.children(model);
        assert_matches!(
            output.tree.kind(children[0]),
            NodeKind::DefaultKey { value } if value == "5"
        );
    }

    #[test]
    fn semicolons_split_console_statements() {
        let output = interpreter()
            .interpret_line("out = h_ab 5; h.flow --igrass-pit out")
            .unwrap();

        let statements = output.tree.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(output.stats.statement_count, 2);
        let second = output.tree.scoped_model(statements[1]).unwrap();
        assert_matches!(output.tree.kind(second), NodeKind::NativeModel { .. });
    }

    #[test]
    fn empty_command_line_compiles_to_nothing() {
        let output = interpreter().interpret_line("   ").unwrap();
        assert_eq!(output.tree.statements().len(), 0);
        assert_eq!(output.stats.statement_count, 0);
    }

    #[test]
    fn compile_directive_routes_to_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            "basin.jgs",
            "jgrass {\nout = h_ab 5\nh.flow --igrass-pit out\n}\n",
        );

        let output = interpreter()
            .interpret_line(&format!("/compile {}", path.display()))
            .unwrap();

        assert_matches!(output.route, CompileRoute::CompileScript { .. });
        assert_eq!(output.stats.block_count, 1);
        assert_eq!(output.stats.statement_count, 2);
    }

    #[test]
    fn bare_pathname_compiles_as_script_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "basin.jgs", "jgrass {\nout = h_ab 5\n}\n");

        let output = interpreter()
            .interpret_line(&path.display().to_string())
            .unwrap();

        assert_matches!(output.route, CompileRoute::ScriptReference { .. });
        assert_eq!(output.stats.statement_count, 1);
    }

    #[test]
    fn missing_script_file_is_rejected() {
        let error = interpreter()
            .compile_file(Path::new("/no/such/dir/basin.jgs"))
            .unwrap_err();
        assert_matches!(
            error,
            PipelineError::ScriptFile(ScriptFileError::FileNotFound { .. })
        );
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn empty_script_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "basin.jgs", "  \n\n");

        let error = interpreter().compile_file(&path).unwrap_err();
        assert_eq!(error.error_code().as_str(), "E008");
    }

    #[test]
    fn extension_check_honours_file_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "notes.txt", "jgrass {\nout = h_ab 5\n}\n");

        let mut strict = interpreter();
        strict.set_file_preferences(FileProcessorPreferences {
            require_script_extension: true,
            enable_performance_logging: false,
        });
        let error = strict.compile_file(&path).unwrap_err();
        assert_eq!(error.error_code().as_str(), "E006");

        let lenient = interpreter();
        assert!(lenient.compile_file(&path).is_ok());
    }

    #[test]
    fn script_statements_carry_file_relative_spans() {
        let source = "jgrass {\nout = h_ab 5\n}\n";
        let output = interpreter().compile_script(source).unwrap();

        let statements = output.tree.statements();
        let span = output.tree.span(statements[0]);
        assert_eq!(span.start.line, 2);
        assert_eq!(span.start.column, 1);
        assert_eq!(span.slice(source), "out = h_ab 5");
    }

    #[test]
    fn statement_error_aborts_the_whole_script() {
        let source = "jgrass {\nout = h_ab 5\nout2 = no.such.model\n}\n";
        let error = interpreter().compile_script(source).unwrap_err();

        assert_eq!(error.error_code().as_str(), "E050");
        let span = error.span().unwrap();
        assert_eq!(span.start.line, 3);
    }

    #[test]
    fn reparse_is_idempotent() {
        let interpreter = interpreter();
        let source = "jgrass {\nout = h_ab 5\n}\n\ngrass {\nh.flow --igrass-pit out\n}\n";

        let first = interpreter.compile_script(source).unwrap();
        let second = interpreter.compile_script(source).unwrap();

        assert_eq!(first.tree, second.tree);
        assert_eq!(first.tree.outline(), second.tree.outline());
    }

    #[test]
    fn mixed_dialect_blocks_compile_in_order() {
        let source = "jgrass {\nout = h_ab 5\n}\nr {\nplot(out)\n}\n";
        let output = interpreter().compile_script(source).unwrap();

        assert_eq!(output.stats.block_count, 2);
        let root = output.tree.root().unwrap();
        let blocks = output.tree.children(root);
        assert_matches!(
            output.tree.kind(blocks[0]),
            NodeKind::Block { dialect: Dialect::Jgrass }
        );
        assert_matches!(
            output.tree.kind(blocks[1]),
            NodeKind::Block { dialect: Dialect::R }
        );
    }

    #[test]
    fn raw_block_preserves_body_verbatim() {
        let source = "r {\nx <- c(1, 2)\n}\n";
        let output = interpreter().compile_script(source).unwrap();

        let root = output.tree.root().unwrap();
        let body = output.tree.children(output.tree.children(root)[0]);
        assert_eq!(body.len(), 1);
        assert_matches!(
            output.tree.kind(body[0]),
            NodeKind::RawCode { text } if text == "\nx <- c(1, 2)\n"
        );
        assert_eq!(output.stats.statement_count, 0);
    }

    #[test]
    fn comments_and_blank_lines_sit_between_blocks() {
        let source = "# header\n\njgrass {\n# inside\nout = h_ab 5\n\n}\n# trailer\n";
        let output = interpreter().compile_script(source).unwrap();

        assert_eq!(output.stats.block_count, 1);
        assert_eq!(output.stats.statement_count, 1);
    }

    #[test]
    fn top_level_statement_text_is_rejected() {
        let error = interpreter().compile_script("out = h_ab 5\n").unwrap_err();
        assert_eq!(error.error_code().as_str(), "E040");
    }

    #[test]
    fn unterminated_block_reports_the_open_brace() {
        let error = interpreter()
            .compile_script("jgrass {\nout = h_ab 5\n")
            .unwrap_err();
        assert_eq!(error.error_code().as_str(), "E047");
    }

    #[test]
    fn directive_without_brace_is_rejected() {
        let error = interpreter().compile_script("jgrass\nout = h_ab 5\n").unwrap_err();
        assert_eq!(error.error_code().as_str(), "E042");
    }

    #[test]
    fn stats_count_tokens_across_statement_rescans() {
        let output = interpreter()
            .compile_script("jgrass {\nout = h_ab 5\n}\n")
            .unwrap();

        assert!(output.stats.token_count > 0);
        assert_eq!(output.stats.source_bytes, 24);
        assert!(output.stats.node_count >= 4);
        assert!(output.stats.duration_ms >= 0.0);
    }
}
