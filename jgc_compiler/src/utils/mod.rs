//! Shared primitives used across the scanners, parsers and diagnostics:
//! source positions, spans and the per-compile source map.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
