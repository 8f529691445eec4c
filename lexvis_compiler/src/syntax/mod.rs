//! Syntax analysis: grammar tokens to `GrammarFile`

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::GrammarParser;

use crate::grammar::GrammarFile;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_error, log_success};

/// Parse a token stream into a grammar syntax tree
pub fn parse_grammar(tokens: TokenStream) -> SyntaxResult<GrammarFile> {
    let result = GrammarParser::new(tokens).parse();

    match &result {
        Ok(grammar) => {
            log_success!(codes::success::GRAMMAR_PARSED, "Grammar parsed",
                "lexer_rules" => grammar.lexer_rules.len(),
                "parser_rules" => grammar.parser_rules.len(),
                "modes" => grammar.modes.len()
            );
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), span = error.span());
        }
    }

    result
}
