//! Configuration module for the console front end
//!
//! Compile-time limits live in `constants`; user preferences come from
//! `JGC_*` environment variables via `runtime`.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
