use crate::lexical::LexicalError;
use crate::logging::{codes, Code};
use crate::symbols::{ManifestError, SymbolError};
use crate::syntax::ParseError;
use crate::utils::Span;

/// Script file staging errors, raised before any scanning happens
#[derive(Debug, thiserror::Error)]
pub enum ScriptFileError {
    #[error("Script file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid script extension: expected .jgs or .jgrass, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("Script file too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Script file is empty: {path}")]
    EmptyFile { path: String },

    #[error("Invalid UTF-8 encoding in script file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading script file: {message}")]
    IoError { message: String },
}

impl ScriptFileError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> Code {
        match self {
            ScriptFileError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            ScriptFileError::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            ScriptFileError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            ScriptFileError::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            ScriptFileError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            ScriptFileError::IoError { .. } => codes::file_processing::IO_ERROR,
        }
    }
}

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Script file processing failed: {0}")]
    ScriptFile(#[from] ScriptFileError),

    #[error("Manifest loading failed: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Registry construction failed: {0}")]
    Symbols(#[from] SymbolError),

    #[error("Lexical scan failed: {0}")]
    Lexical(#[from] LexicalError),

    #[error("Statement parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    /// Diagnostic code of the stage that failed
    pub fn error_code(&self) -> Code {
        match self {
            Self::ScriptFile(error) => error.error_code(),
            Self::Manifest(error) => error.error_code(),
            Self::Symbols(error) => error.error_code(),
            Self::Lexical(error) => error.error_code(),
            Self::Parse(error) => error.error_code(),
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Source span of the failure, where one exists. Only statement
    /// parse errors point at source; staging and scan failures do not.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse(error) => Some(error.span()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    #[test]
    fn error_codes_map_one_per_staging_failure() {
        let cases = [
            (
                ScriptFileError::FileNotFound {
                    path: "basin.jgs".to_string(),
                },
                "E005",
            ),
            (
                ScriptFileError::InvalidExtension {
                    extension: Some("txt".to_string()),
                },
                "E006",
            ),
            (
                ScriptFileError::FileTooLarge {
                    size: 10,
                    max_size: 5,
                },
                "E007",
            ),
            (
                ScriptFileError::EmptyFile {
                    path: "basin.jgs".to_string(),
                },
                "E008",
            ),
            (
                ScriptFileError::InvalidEncoding {
                    path: "basin.jgs".to_string(),
                },
                "E010",
            ),
            (
                ScriptFileError::IoError {
                    message: "interrupted".to_string(),
                },
                "E011",
            ),
        ];
        for (error, code) in cases {
            assert_eq!(error.error_code().as_str(), code);
        }
    }

    #[test]
    fn pipeline_error_delegates_code_and_span() {
        let parse = ParseError::unknown_type("h_ab", Span::from_offsets(4, 8));
        let error = PipelineError::from(parse);
        assert_eq!(error.error_code().as_str(), "E050");
        assert_eq!(error.span(), Some(Span::from_offsets(4, 8)));

        let staging = PipelineError::from(ScriptFileError::EmptyFile {
            path: "basin.jgs".to_string(),
        });
        assert_eq!(staging.error_code().as_str(), "E008");
        assert_eq!(staging.span(), None);

        let internal = PipelineError::pipeline_error("stage out of order");
        assert_eq!(internal.error_code().as_str(), "ERR001");
    }
}
