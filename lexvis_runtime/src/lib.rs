//! # LEXVIS runtime - grammar-driven tokenization
//!
//! Compiles an uploaded ANTLR-style grammar with the external `lexgen` tool,
//! loads the resulting lexer for the current request only, and runs it over
//! a text sample to produce a fully attributed token stream.

pub mod api;
pub mod compiler;
pub mod execution;
pub mod ingest;
pub mod resolution;
pub mod types;
pub mod workspace;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{
        ErrorKind, ErrorResponse, ToolConfig, Token, TokenStream, TokenizeError, TokenizeOutcome,
        TokenizeResponse, Tokenizer, TokenizerConfig,
    };
}
