//! Token layer shared by the classifier, command, and script scanners.

pub mod token;
pub mod token_stream;

pub use token::{classify_flag, classify_script_word, Token, TokenClass};
pub use token_stream::{SkipPolicy, SpannedToken, TokenStream, TokenStreamBuilder};
