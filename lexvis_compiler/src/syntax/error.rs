//! Syntax errors raised while parsing grammar text

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("syntax error: mismatched input {found} expecting {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("syntax error: premature end of file, expecting {expected}")]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("syntax error: {message}")]
    InvalidConstruct { message: String, span: Span },

    #[error("rule nesting too deep (max {max_depth})")]
    MaxRecursionDepth { max_depth: usize, span: Span },

    #[error("no lexer to generate: parser grammar {name} contains no lexer rules")]
    ParserGrammarUnsupported { name: String, span: Span },

    #[error("grammar imports are not supported: {name}")]
    ImportUnsupported { name: String, span: Span },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, span: Span) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn invalid_construct(message: &str, span: Span) -> Self {
        Self::InvalidConstruct {
            message: message.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } | Self::InvalidConstruct { .. } => {
                codes::syntax::UNEXPECTED_TOKEN
            }
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::MaxRecursionDepth { .. } => codes::syntax::MAX_RECURSION_DEPTH,
            Self::ParserGrammarUnsupported { .. } => codes::syntax::PARSER_GRAMMAR_UNSUPPORTED,
            Self::ImportUnsupported { .. } => codes::syntax::IMPORT_UNSUPPORTED,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::InvalidConstruct { span, .. }
            | Self::MaxRecursionDepth { span, .. }
            | Self::ParserGrammarUnsupported { span, .. }
            | Self::ImportUnsupported { span, .. } => *span,
        }
    }
}
