use crate::artifact::ArtifactError;
use crate::automaton::AutomatonError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::semantic_analysis::{SemanticError, SemanticWarning};
use crate::syntax::SyntaxError;
use crate::utils::Position;
use std::fmt;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    SyntaxAnalysis(#[from] SyntaxError),

    #[error("Semantic analysis failed with {} error(s)", errors.len())]
    SemanticAnalysis {
        errors: Vec<SemanticError>,
        warnings: Vec<SemanticWarning>,
    },

    #[error("Automaton construction failed: {0}")]
    Automaton(#[from] AutomatonError),

    #[error("Artifact emission failed: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("cannot derive a grammar name from {source_name}")]
    InvalidIdentifier { source_name: String },
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::SyntaxAnalysis(e) => e.error_code(),
            Self::SemanticAnalysis { errors, .. } => errors
                .first()
                .map(|e| e.error_code())
                .unwrap_or(crate::logging::codes::system::INTERNAL_ERROR),
            Self::Automaton(e) => e.error_code(),
            Self::Artifact(e) => e.error_code(),
            Self::InvalidIdentifier { .. } => crate::logging::codes::grammar_file::INVALID_IDENTIFIER,
        }
    }

    /// Every message this failure should print, errors first
    pub fn diagnostics(&self, file: &str) -> Vec<Diagnostic> {
        match self {
            Self::FileProcessing(e) => vec![Diagnostic::error(e.error_code(), file, None, e.to_string())],
            Self::LexicalAnalysis(e) => vec![Diagnostic::error(
                e.error_code(),
                file,
                Some(e.position()),
                e.to_string(),
            )],
            Self::SyntaxAnalysis(e) => vec![Diagnostic::error(
                e.error_code(),
                file,
                Some(e.span().start),
                e.to_string(),
            )],
            Self::SemanticAnalysis { errors, warnings } => errors
                .iter()
                .map(|e| Diagnostic::error(e.error_code(), file, Some(e.span().start), e.to_string()))
                .chain(warnings.iter().map(|w| Diagnostic::warning(w, file)))
                .collect(),
            Self::Automaton(e) => vec![Diagnostic::error(e.error_code(), file, None, e.to_string())],
            Self::Artifact(e) => vec![Diagnostic::error(e.error_code(), file, None, e.to_string())],
            Self::InvalidIdentifier { .. } => {
                vec![Diagnostic::error(self.error_code(), file, None, self.to_string())]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// One line of compiler output:
/// `error(<code>): <file>:<line>:<column>: <message>`
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: Code,
    pub file: String,
    pub position: Option<Position>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: Code, file: &str, position: Option<Position>, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            file: file.to_string(),
            position,
            message,
        }
    }

    pub fn warning(warning: &SemanticWarning, file: &str) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: warning.code,
            file: file.to_string(),
            position: Some(warning.span.start),
            message: warning.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        match self.position {
            Some(pos) => write!(
                f,
                "{}({}): {}:{}:{}: {}",
                label, self.code, self.file, pos.line, pos.column, self.message
            ),
            None => write!(f, "{}({}): {}: {}", label, self.code, self.file, self.message),
        }
    }
}
