//! Compile-time resource bounds
//!
//! These caps are part of the front end's contract: every stage checks its
//! input against them and raises a staging or lexical diagnostic instead
//! of growing without bound on hostile input.

pub mod compile_time {
    pub mod file_processing {
        /// Largest script file accepted for staging (4MB)
        pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

        /// Scripts past this size (256KB) get a size warning during staging
        pub const LARGE_FILE_THRESHOLD: u64 = 256 * 1024;
    }

    pub mod lexical {
        /// Longest raw input a scanner accepts (2MB)
        pub const MAX_INPUT_LENGTH: usize = 2 * 1024 * 1024;

        /// Most tokens one input may produce
        pub const MAX_TOKEN_COUNT: usize = 500_000;

        /// Longest single lexeme (literal, word, pathname)
        pub const MAX_LEXEME_LENGTH: usize = 4_096;

        /// Longest comment carried through a scanner
        pub const MAX_COMMENT_LENGTH: usize = 10_000;
    }

    pub mod syntax {
        /// Most significant tokens in one statement
        pub const MAX_STATEMENT_TOKENS: usize = 10_000;
    }

    pub mod symbols {
        /// Most symbols one registry snapshot may hold
        pub const MAX_SYMBOLS: usize = 50_000;

        /// Longest qualifier accepted into the symbol table
        pub const MAX_QUALIFIER_LENGTH: usize = 255;

        /// Most exchange items a single model descriptor may declare
        pub const MAX_EXCHANGE_ITEMS_PER_MODEL: usize = 1_000;
    }

    pub mod pipeline {
        /// Most statements per script
        pub const MAX_SCRIPT_STATEMENTS: usize = 100_000;

        /// Deepest sub-language block nesting; the grammar itself is flat
        /// but unbalanced braces must not recurse unbounded
        pub const MAX_BLOCK_DEPTH: usize = 16;
    }

    pub mod logging {
        /// Most diagnostics the collector retains per compile run
        pub const MAX_ERROR_COLLECTION: usize = 1_000;

        /// Most log events retained per script file, so one broken script
        /// cannot crowd out diagnostics for the rest of the invocation
        pub const MAX_LOG_EVENTS_PER_SCRIPT: usize = 200;

        /// Longest message stored on a single log event
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 10_000;
    }
}
