//! Model manifest loading
//!
//! The manifest is a TOML file listing every model the session knows about,
//! with component models carrying their exchange contracts. It is the only
//! external input to registry construction.
//!
//! ```toml
//! [[native_model]]
//! name = "h.flow"
//!
//! [[component_model]]
//! name = "h_ab"
//! default_key = false
//! [component_model.exchange]
//! pit = "GridCoverage"
//! flow = "GridCoverage"
//!
//! [[class]]
//! name = "GridCoverage"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while reading or parsing a model manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Model manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read model manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in model manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ManifestError {
    /// Get error code for the global logging system
    pub fn error_code(&self) -> crate::logging::Code {
        use crate::logging::codes;
        match self {
            Self::NotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::Io { .. } => codes::file_processing::IO_ERROR,
            Self::Parse { .. } => codes::symbols::MANIFEST_PARSE_ERROR,
        }
    }
}

/// One native model entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NativeModelEntry {
    pub name: String,
}

/// One component model entry with its exchange contract.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentModelEntry {
    pub name: String,
    #[serde(default)]
    pub default_key: bool,
    /// Quantity name to backing type name.
    #[serde(default)]
    pub exchange: BTreeMap<String, String>,
}

/// One class or primitive type entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    pub name: String,
}

/// Parsed model manifest. Section order in the file does not matter; every
/// section may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelManifest {
    #[serde(default, rename = "native_model")]
    pub native_models: Vec<NativeModelEntry>,
    #[serde(default, rename = "component_model")]
    pub component_models: Vec<ComponentModelEntry>,
    #[serde(default, rename = "class")]
    pub classes: Vec<TypeEntry>,
    #[serde(default, rename = "primitive")]
    pub primitives: Vec<TypeEntry>,
}

impl ModelManifest {
    /// Parse manifest text. `path` is only used for error reporting.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn entry_count(&self) -> usize {
        self.native_models.len()
            + self.component_models.len()
            + self.classes.len()
            + self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}
