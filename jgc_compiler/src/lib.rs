// Internal modules
pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod symbols;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use pipeline::{CompileOutput, CompileRoute, CompileStats, Interpreter, PipelineError};
pub use symbols::{ModelRegistry, RegistryHandle};
