//! Shared semantic analysis types

use crate::{
    artifact::schema::{LexerAction, Vocabulary},
    grammar::ast::{Element, GrammarKind},
    log_error,
    logging::codes,
    utils::Span,
};
use thiserror::Error;

/// Result type for semantic analysis operations
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Grammar errors found after parsing; all of them are reported
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("reference to undefined rule: {name}")]
    UndefinedRule { name: String, span: Span },

    #[error("rule {name} redefinition; previous at line {previous_line}")]
    DuplicateRule {
        name: String,
        previous_line: u32,
        span: Span,
    },

    #[error("recursive lexer rule reference: {}", cycle_path.join(" -> "))]
    RecursiveRule { cycle_path: Vec<String>, span: Span },

    #[error("mode {name} not defined")]
    UndefinedMode { name: String, span: Span },

    #[error("channel {name} not defined")]
    UndefinedChannel { name: String, span: Span },

    #[error("token type {name} not defined")]
    UndefinedTokenType { name: String, span: Span },

    #[error("lexer command {command} {reason}")]
    InvalidCommand {
        command: String,
        reason: String,
        span: Span,
    },

    #[error("{element} is not a valid set element")]
    InvalidSetElement { element: String, span: Span },

    #[error("invalid range {from}..{to}")]
    InvalidRange { from: String, to: String, span: Span },

    #[error("string literals and sets cannot be empty")]
    EmptyLiteral { span: Span },

    #[error("grammar defines {count} lexer rules, limit is {limit}")]
    TooManyRules { count: usize, limit: usize, span: Span },

    #[error("grammar defines {count} modes, limit is {limit}")]
    TooManyModes { count: usize, limit: usize, span: Span },

    #[error("{kind} {name} declared more than once")]
    DuplicateDeclaration {
        kind: &'static str,
        name: String,
        span: Span,
    },
}

impl SemanticError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::UndefinedRule { .. } => codes::semantic::UNDEFINED_RULE,
            Self::DuplicateRule { .. } => codes::semantic::DUPLICATE_RULE,
            Self::RecursiveRule { .. } => codes::semantic::RECURSIVE_RULE,
            Self::UndefinedMode { .. } => codes::semantic::UNDEFINED_MODE,
            Self::UndefinedChannel { .. } => codes::semantic::UNDEFINED_CHANNEL,
            Self::UndefinedTokenType { .. } => codes::semantic::UNDEFINED_TOKEN_TYPE,
            Self::InvalidCommand { .. } => codes::semantic::INVALID_COMMAND,
            Self::InvalidSetElement { .. } => codes::semantic::INVALID_SET_ELEMENT,
            Self::InvalidRange { .. } => codes::semantic::INVALID_RANGE,
            Self::EmptyLiteral { .. } => codes::semantic::EMPTY_LITERAL,
            Self::TooManyRules { .. } => codes::semantic::TOO_MANY_RULES,
            Self::TooManyModes { .. } => codes::automaton::MODE_LIMIT_EXCEEDED,
            Self::DuplicateDeclaration { .. } => codes::semantic::DUPLICATE_DECLARATION,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedRule { span, .. }
            | Self::DuplicateRule { span, .. }
            | Self::RecursiveRule { span, .. }
            | Self::UndefinedMode { span, .. }
            | Self::UndefinedChannel { span, .. }
            | Self::UndefinedTokenType { span, .. }
            | Self::InvalidCommand { span, .. }
            | Self::InvalidSetElement { span, .. }
            | Self::InvalidRange { span, .. }
            | Self::EmptyLiteral { span }
            | Self::TooManyRules { span, .. }
            | Self::TooManyModes { span, .. }
            | Self::DuplicateDeclaration { span, .. } => *span,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn invalid_command(command: &str, reason: impl Into<String>, span: Span) -> Self {
        Self::InvalidCommand {
            command: command.to_string(),
            reason: reason.into(),
            span,
        }
    }

    pub fn log(&self) {
        log_error!(self.error_code(), &self.to_string(), span = self.span());
    }
}

/// Non-fatal finding; compilation continues
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticWarning {
    pub code: codes::Code,
    pub message: String,
    pub span: Span,
}

impl SemanticWarning {
    pub fn new(code: codes::Code, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for SemanticWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lexer rule after name resolution, ready for automaton construction
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedRule {
    pub name: String,
    pub fragment: bool,
    /// Synthesized `T__n` rule for a parser-rule literal
    pub implicit: bool,
    /// `None` for fragments
    pub token_type: Option<i32>,
    pub mode: usize,
    pub case_insensitive: bool,
    pub alternatives: Vec<AnalyzedAlternative>,
    pub span: Span,
}

impl AnalyzedRule {
    pub fn is_token(&self) -> bool {
        !self.fragment
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedAlternative {
    pub elements: Vec<Element>,
    pub actions: Vec<LexerAction>,
}

/// Grammar with every name resolved to a number
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedGrammar {
    pub name: String,
    pub kind: GrammarKind,
    pub vocabulary: Vocabulary,
    pub channel_names: Vec<String>,
    pub mode_names: Vec<String>,
    /// Implicit literal rules first, then lexer rules in declaration order
    pub rules: Vec<AnalyzedRule>,
}

impl AnalyzedGrammar {
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    pub fn rule(&self, name: &str) -> Option<&AnalyzedRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn token_rules(&self) -> impl Iterator<Item = &AnalyzedRule> {
        self.rules.iter().filter(|r| r.is_token())
    }
}

/// Outcome of the semantic pass
#[derive(Debug, Clone, Default)]
pub struct SemanticOutput {
    pub grammar: Option<AnalyzedGrammar>,
    pub errors: Vec<SemanticError>,
    pub warnings: Vec<SemanticWarning>,
}

impl SemanticOutput {
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && self.grammar.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_messages() {
        let err = SemanticError::RecursiveRule {
            cycle_path: vec!["A".into(), "B".into(), "A".into()],
            span: Span::dummy(),
        };
        assert_eq!(err.error_code(), codes::semantic::RECURSIVE_RULE);
        assert_eq!(err.to_string(), "recursive lexer rule reference: A -> B -> A");
        assert!(err.requires_halt());

        let err = SemanticError::invalid_command("skip", "does not take an argument", Span::dummy());
        assert_eq!(err.to_string(), "lexer command skip does not take an argument");
        assert_eq!(
            SemanticError::TooManyModes { count: 9, limit: 8, span: Span::dummy() }.error_code(),
            codes::automaton::MODE_LIMIT_EXCEEDED
        );
    }

    #[test]
    fn test_output_success() {
        let mut out = SemanticOutput::default();
        assert!(!out.is_successful());
        out.errors.push(SemanticError::EmptyLiteral { span: Span::dummy() });
        assert_eq!(out.error_count(), 1);
    }
}
