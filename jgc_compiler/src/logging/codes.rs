//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for every code the front end can emit, with the
//! behavioral metadata (severity, recoverability, whether the current script
//! compile is abandoned) kept next to the constants.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a diagnostic code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Scanning/parsing may continue past this diagnostic
    pub recoverable: bool,
    /// The current compile unit is abandoned when this fires
    pub halts_script: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl CodeMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        halts_script: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            halts_script,
            description,
            recommended_action,
        }
    }
}

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
}

/// Lexical analysis codes
pub mod lexical {
    use super::Code;

    pub const INPUT_TOO_LARGE: Code = Code::new("E020");
    pub const TOO_MANY_TOKENS: Code = Code::new("E021");
    pub const LEXEME_TOO_LONG: Code = Code::new("E022");
    pub const COMMENT_TOO_LONG: Code = Code::new("E023");

    /// Rescued input: no catalog rule matched, an UNKNOWN token was emitted
    pub const UNMATCHED_LEXEME: Code = Code::new("E024");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_STATEMENT: Code = Code::new("E041");
    pub const EXPECTED_TOKEN: Code = Code::new("E042");
    pub const UNEXPECTED_EXTRA_TOKEN: Code = Code::new("E043");
    pub const MALFORMED_EXCHANGE_REFERENCE: Code = Code::new("E044");
    pub const EXPECTED_ASSIGNMENT: Code = Code::new("E045");
    pub const EXPECTED_ARGUMENT_VALUE: Code = Code::new("E046");
    pub const UNMATCHED_BLOCK_DELIMITER: Code = Code::new("E047");
    pub const STATEMENT_TOO_LONG: Code = Code::new("E048");
    pub const BLOCK_NESTING_TOO_DEEP: Code = Code::new("E049");
}

/// Semantic error codes for the component-model sub-language
pub mod component {
    use super::Code;

    pub const UNKNOWN_TYPE: Code = Code::new("E050");
    pub const NATIVE_TOKEN_IN_COMPONENT: Code = Code::new("E051");
    pub const DUPLICATE_MODEL_IN_STATEMENT: Code = Code::new("E052");
    pub const NO_DEFAULT_KEY_DECLARED: Code = Code::new("E053");
    pub const UNRESOLVED_EXCHANGE_TYPE: Code = Code::new("E054");
    pub const MODEL_HAS_NO_EXCHANGE_ITEMS: Code = Code::new("E055");
    pub const UNSUPPORTED_EXCHANGE_ITEM: Code = Code::new("E056");
    pub const ITEM_OUTSIDE_MODEL: Code = Code::new("E057");
    pub const DEFAULT_KEY_OUTSIDE_MODEL: Code = Code::new("E058");
    pub const TYPE_NOT_INVOCABLE: Code = Code::new("E059");
}

/// Semantic error codes for the native-model sub-language
pub mod native {
    use super::Code;

    pub const COMPONENT_TOKEN_IN_NATIVE: Code = Code::new("E060");
    pub const ASSIGN_OUTSIDE_MODEL: Code = Code::new("E061");
    pub const PARAMETER_OUTSIDE_MODEL: Code = Code::new("E062");
}

/// Symbol table and model registry error codes
pub mod symbols {
    use super::Code;

    pub const REGISTRY_CONSTRUCTION_ERROR: Code = Code::new("E081");
    pub const DUPLICATE_SYMBOL: Code = Code::new("E090");
    pub const SYMBOL_LIMIT_EXCEEDED: Code = Code::new("E091");
    pub const QUALIFIER_TOO_LONG: Code = Code::new("E092");
    pub const MANIFEST_PARSE_ERROR: Code = Code::new("E093");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I030");
    pub const PARSE_TREE_COMPLETE: Code = Code::new("I040");
    pub const REGISTRY_BUILD_COMPLETE: Code = Code::new("I050");
}

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            CodeMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the offending input",
            ),
        );
        registry.insert(
            "ERR002",
            CodeMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Console initialization failure",
                "Check configuration and model manifest",
            ),
        );

        // File processing errors
        registry.insert(
            "E005",
            CodeMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Script file not found at specified path",
                "Check the pathname passed to the compile directive",
            ),
        );
        registry.insert(
            "E006",
            CodeMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Pathname does not carry a script extension",
                "Use a .jgs or .jgrass extension or disable the extension check",
            ),
        );
        registry.insert(
            "E007",
            CodeMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Script file exceeds maximum size limit",
                "Split the script or raise the processing limit",
            ),
        );
        registry.insert(
            "E008",
            CodeMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Script file is empty",
                "Provide a script with content",
            ),
        );
        registry.insert(
            "E010",
            CodeMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid UTF-8 encoding in script file",
                "Convert the file to UTF-8",
            ),
        );
        registry.insert(
            "E011",
            CodeMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "I/O error while reading script file",
                "Check permissions and file system state",
            ),
        );

        // Lexical codes
        registry.insert(
            "E020",
            CodeMetadata::new(
                "E020",
                "Lexical",
                Severity::High,
                false,
                true,
                "Raw input exceeds maximum scanner length",
                "Reduce input size or raise the scanner limit",
            ),
        );
        registry.insert(
            "E021",
            CodeMetadata::new(
                "E021",
                "Lexical",
                Severity::High,
                false,
                true,
                "Input produced too many tokens",
                "Reduce input complexity or raise the token limit",
            ),
        );
        registry.insert(
            "E022",
            CodeMetadata::new(
                "E022",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "A single lexeme exceeds the maximum length",
                "Shorten the literal, word or pathname",
            ),
        );
        registry.insert(
            "E023",
            CodeMetadata::new(
                "E023",
                "Lexical",
                Severity::Medium,
                false,
                true,
                "Comment is longer than the scanner accepts",
                "Break the comment into smaller pieces",
            ),
        );
        registry.insert(
            "E024",
            CodeMetadata::new(
                "E024",
                "Lexical",
                Severity::Low,
                true,
                false,
                "No lexeme rule matched; input rescued as UNKNOWN token",
                "Check for typos; the token is carried forward, not dropped",
            ),
        );

        // Syntax errors
        registry.insert(
            "E040",
            CodeMetadata::new(
                "E040",
                "Syntax",
                Severity::High,
                false,
                true,
                "Unexpected token for the current grammar position",
                "Check the statement against the sub-language grammar",
            ),
        );
        registry.insert(
            "E041",
            CodeMetadata::new(
                "E041",
                "Syntax",
                Severity::High,
                false,
                true,
                "Statement ended while the grammar expected more tokens",
                "Complete the assignment, exchange reference or argument",
            ),
        );
        registry.insert(
            "E042",
            CodeMetadata::new(
                "E042",
                "Syntax",
                Severity::High,
                false,
                true,
                "A specific token was expected here",
                "Insert the expected token",
            ),
        );
        registry.insert(
            "E043",
            CodeMetadata::new(
                "E043",
                "Syntax",
                Severity::Medium,
                false,
                true,
                "Unexpected extra token after a complete production",
                "Remove the trailing token or start a new statement",
            ),
        );
        registry.insert(
            "E044",
            CodeMetadata::new(
                "E044",
                "Syntax",
                Severity::High,
                false,
                true,
                "Malformed exchange-item reference after input/output flag",
                "Reference a map, variable, literal, asterisk or bracket form",
            ),
        );
        registry.insert(
            "E045",
            CodeMetadata::new(
                "E045",
                "Syntax",
                Severity::High,
                false,
                true,
                "Expected assignment punctuator after variable",
                "Write `<variable> = <ModelName> ...`",
            ),
        );
        registry.insert(
            "E046",
            CodeMetadata::new(
                "E046",
                "Syntax",
                Severity::High,
                false,
                true,
                "Expected a value after argument flag",
                "Supply a literal, word or variable as the argument value",
            ),
        );
        registry.insert(
            "E047",
            CodeMetadata::new(
                "E047",
                "Syntax",
                Severity::High,
                false,
                true,
                "Unmatched sub-language block delimiter",
                "Balance the braces of the jgrass/grass/r block",
            ),
        );
        registry.insert(
            "E048",
            CodeMetadata::new(
                "E048",
                "Syntax",
                Severity::High,
                false,
                true,
                "Statement exceeds maximum token count",
                "Split the statement or raise the limit",
            ),
        );
        registry.insert(
            "E049",
            CodeMetadata::new(
                "E049",
                "Syntax",
                Severity::High,
                false,
                true,
                "Sub-language blocks nested too deeply",
                "Flatten the block structure",
            ),
        );

        // Component-model semantic errors
        registry.insert(
            "E050",
            CodeMetadata::new(
                "E050",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Identifier does not name a registered type",
                "Register the model or fix the spelling",
            ),
        );
        registry.insert(
            "E051",
            CodeMetadata::new(
                "E051",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Native-model token used in the component-model sub-language",
                "Invoke native models as bare commands, not assignments",
            ),
        );
        registry.insert(
            "E052",
            CodeMetadata::new(
                "E052",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "A second model invocation inside one statement",
                "Use one model invocation per statement",
            ),
        );
        registry.insert(
            "E053",
            CodeMetadata::new(
                "E053",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Model declares no default key but a bare value follows it",
                "Name the exchange item explicitly or drop the bare value",
            ),
        );
        registry.insert(
            "E054",
            CodeMetadata::new(
                "E054",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Exchange quantity's backing type does not resolve to a class",
                "Fix the model descriptor's exchange-item declaration",
            ),
        );
        registry.insert(
            "E055",
            CodeMetadata::new(
                "E055",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Model descriptor declares no exchange items",
                "Remove the input/output flags or fix the descriptor",
            ),
        );
        registry.insert(
            "E056",
            CodeMetadata::new(
                "E056",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Exchange quantity is not supported by the model descriptor",
                "Use one of the quantities the model declares",
            ),
        );
        registry.insert(
            "E057",
            CodeMetadata::new(
                "E057",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Argument/input/output flag used outside a model scope",
                "Open a model invocation before the flag",
            ),
        );
        registry.insert(
            "E058",
            CodeMetadata::new(
                "E058",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Default-key value used outside a model scope",
                "Place the value immediately after a model invocation",
            ),
        );
        registry.insert(
            "E059",
            CodeMetadata::new(
                "E059",
                "ComponentModel",
                Severity::High,
                false,
                true,
                "Type resolves to a class or primitive, not an invocable model",
                "Invoke a registered native or component model",
            ),
        );

        // Native-model semantic errors
        registry.insert(
            "E060",
            CodeMetadata::new(
                "E060",
                "NativeModel",
                Severity::High,
                false,
                true,
                "Component-model token used in the native command sub-language",
                "Assign component models to a variable instead",
            ),
        );
        registry.insert(
            "E061",
            CodeMetadata::new(
                "E061",
                "NativeModel",
                Severity::High,
                false,
                true,
                "Parameter flag used before any native model was invoked",
                "Start the command with a registered native model",
            ),
        );
        registry.insert(
            "E062",
            CodeMetadata::new(
                "E062",
                "NativeModel",
                Severity::High,
                false,
                true,
                "Parameter value used before any native model was invoked",
                "Start the command with a registered native model",
            ),
        );

        // Symbols / registry errors
        registry.insert(
            "E081",
            CodeMetadata::new(
                "E081",
                "Symbols",
                Severity::Medium,
                false,
                true,
                "Model registry snapshot construction failed",
                "Check the manifest entries for consistency",
            ),
        );
        registry.insert(
            "E090",
            CodeMetadata::new(
                "E090",
                "Symbols",
                Severity::Medium,
                false,
                true,
                "Duplicate symbol qualifier in the registry",
                "Use unique model/class names (case-insensitive)",
            ),
        );
        registry.insert(
            "E091",
            CodeMetadata::new(
                "E091",
                "Symbols",
                Severity::High,
                false,
                true,
                "Registry exceeds the maximum symbol count",
                "Reduce the manifest or raise the limit",
            ),
        );
        registry.insert(
            "E092",
            CodeMetadata::new(
                "E092",
                "Symbols",
                Severity::Medium,
                false,
                true,
                "Symbol qualifier exceeds maximum length",
                "Shorten the type name",
            ),
        );
        registry.insert(
            "E093",
            CodeMetadata::new(
                "E093",
                "Symbols",
                Severity::Medium,
                false,
                true,
                "Model manifest could not be parsed",
                "Fix the TOML syntax or schema of the manifest",
            ),
        );

        // Informational codes used by the collector summary
        registry.insert(
            "I004",
            CodeMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Console initialization completed",
                "No action needed",
            ),
        );
        registry.insert(
            "I006",
            CodeMetadata::new(
                "I006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Script file processed successfully",
                "Continue to the next input",
            ),
        );

        registry
    })
}

/// Get metadata for a specific code
pub fn get_code_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

/// Get severity from a diagnostic code
pub fn get_severity(code: &str) -> Severity {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if scanning/parsing may continue past this diagnostic
pub fn is_recoverable(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if the current compile unit is abandoned when this fires
pub fn halts_script(code: &str) -> bool {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.halts_script)
        .unwrap_or(false)
}

/// Human-readable description for a code
pub fn get_description(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown diagnostic")
}

/// Recommended action for a code
pub fn get_action(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Category for a code
pub fn get_category(code: &str) -> &'static str {
    get_code_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_parser_facing_code_has_metadata() {
        let codes = [
            lexical::INPUT_TOO_LARGE,
            lexical::TOO_MANY_TOKENS,
            lexical::LEXEME_TOO_LONG,
            lexical::COMMENT_TOO_LONG,
            lexical::UNMATCHED_LEXEME,
            syntax::UNEXPECTED_TOKEN,
            syntax::UNEXPECTED_END_OF_STATEMENT,
            syntax::EXPECTED_TOKEN,
            syntax::UNEXPECTED_EXTRA_TOKEN,
            syntax::MALFORMED_EXCHANGE_REFERENCE,
            syntax::EXPECTED_ASSIGNMENT,
            syntax::EXPECTED_ARGUMENT_VALUE,
            syntax::UNMATCHED_BLOCK_DELIMITER,
            syntax::STATEMENT_TOO_LONG,
            syntax::BLOCK_NESTING_TOO_DEEP,
            component::UNKNOWN_TYPE,
            component::NATIVE_TOKEN_IN_COMPONENT,
            component::DUPLICATE_MODEL_IN_STATEMENT,
            component::NO_DEFAULT_KEY_DECLARED,
            component::UNRESOLVED_EXCHANGE_TYPE,
            component::MODEL_HAS_NO_EXCHANGE_ITEMS,
            component::UNSUPPORTED_EXCHANGE_ITEM,
            component::ITEM_OUTSIDE_MODEL,
            component::DEFAULT_KEY_OUTSIDE_MODEL,
            component::TYPE_NOT_INVOCABLE,
            native::COMPONENT_TOKEN_IN_NATIVE,
            native::ASSIGN_OUTSIDE_MODEL,
            native::PARAMETER_OUTSIDE_MODEL,
            symbols::REGISTRY_CONSTRUCTION_ERROR,
            symbols::DUPLICATE_SYMBOL,
            symbols::SYMBOL_LIMIT_EXCEEDED,
            symbols::QUALIFIER_TOO_LONG,
            symbols::MANIFEST_PARSE_ERROR,
        ];
        for code in codes {
            assert!(
                get_code_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn rescued_lexeme_is_the_only_recoverable_parse_code() {
        assert!(is_recoverable(lexical::UNMATCHED_LEXEME.as_str()));
        assert!(!halts_script(lexical::UNMATCHED_LEXEME.as_str()));

        assert!(!is_recoverable(syntax::UNEXPECTED_TOKEN.as_str()));
        assert!(halts_script(syntax::UNEXPECTED_TOKEN.as_str()));
        assert!(!is_recoverable(component::UNKNOWN_TYPE.as_str()));
        assert!(halts_script(component::UNKNOWN_TYPE.as_str()));
        assert!(halts_script(native::COMPONENT_TOKEN_IN_NATIVE.as_str()));
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_severity("E999"), Severity::Medium);
    }
}
