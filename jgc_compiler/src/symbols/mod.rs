//! Session symbol management: typed descriptors, registry snapshots, and
//! manifest loading.

pub mod error;
pub mod manifest;
pub mod registry;
pub mod table;

pub use error::{SymbolError, SymbolResult};
pub use manifest::{ManifestError, ModelManifest};
pub use registry::{ModelRegistry, RegistryHandle};
pub use table::{normalize_qualifier, Symbol, SymbolKind, SymbolTable};
