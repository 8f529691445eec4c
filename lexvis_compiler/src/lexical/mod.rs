//! Lexical analysis of grammar text

pub mod analyzer;

use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize grammar source with a fresh analyzer
pub fn tokenize(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}
