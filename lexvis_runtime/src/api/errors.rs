//! # Tokenizer Errors

use crate::api::config::ConfigError;
use crate::compiler::CompileError;
use crate::execution::ExecutionError;
use crate::ingest::IngestError;
use crate::resolution::LoadError;
use crate::workspace::WorkspaceError;
use lexvis_compiler::logging::codes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure of one tokenization request; no partial token data survives it
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("invalid grammar: {0}")]
    InvalidGrammar(#[from] IngestError),

    #[error("{0}")]
    Compilation(CompileError),

    #[error("grammar compilation timed out after {timeout_ms}ms")]
    CompilationTimeout { timeout_ms: u64 },

    #[error("lexer load failed: {0}")]
    Load(#[from] LoadError),

    #[error("tokenization failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
}

impl From<CompileError> for TokenizeError {
    fn from(error: CompileError) -> Self {
        match error {
            CompileError::Timeout { timeout_ms } => TokenizeError::CompilationTimeout { timeout_ms },
            other => TokenizeError::Compilation(other),
        }
    }
}

impl TokenizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenizeError::InvalidGrammar(_) => ErrorKind::InvalidGrammar,
            TokenizeError::Compilation(_) => ErrorKind::Compilation,
            TokenizeError::CompilationTimeout { .. } => ErrorKind::CompilationTimeout,
            TokenizeError::Load(_) => ErrorKind::Load,
            TokenizeError::Execution(_) => ErrorKind::Execution,
            TokenizeError::Workspace(_) => ErrorKind::Workspace,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            TokenizeError::InvalidGrammar(e) => e.error_code(),
            TokenizeError::Compilation(e) => e.error_code(),
            TokenizeError::CompilationTimeout { .. } => codes::runtime::COMPILATION_TIMEOUT,
            TokenizeError::Load(e) => e.error_code(),
            TokenizeError::Execution(e) => e.error_code(),
            TokenizeError::Workspace(e) => e.error_code(),
        }
    }

    /// Caller supplied bad input, as opposed to a service-side fault
    ///
    /// Only a grammar the tool rejected counts; a tool that cannot run or
    /// leaves no artifact is a deployment problem.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TokenizeError::InvalidGrammar(_)
                | TokenizeError::Compilation(CompileError::Failed { .. })
                | TokenizeError::Execution(_)
        )
    }
}

/// Serializable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidGrammar,
    Compilation,
    CompilationTimeout,
    Load,
    Execution,
    Workspace,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidGrammar => "InvalidGrammarError",
            ErrorKind::Compilation => "CompilationError",
            ErrorKind::CompilationTimeout => "CompilationTimeoutError",
            ErrorKind::Load => "LoadError",
            ErrorKind::Execution => "ExecutionError",
            ErrorKind::Workspace => "WorkspaceError",
            ErrorKind::Configuration => "ConfigurationError",
        };
        f.write_str(name)
    }
}

/// Error body returned to callers: `{kind, message}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&TokenizeError> for ErrorResponse {
    fn from(error: &TokenizeError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<&ConfigError> for ErrorResponse {
    fn from(error: &ConfigError) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CommandError;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    #[test]
    fn test_timeout_is_routed_to_its_own_kind() {
        let error = TokenizeError::from(CompileError::Timeout { timeout_ms: 50 });
        assert_eq!(error.kind(), ErrorKind::CompilationTimeout);
        assert_eq!(error.error_code(), codes::runtime::COMPILATION_TIMEOUT);

        let error = TokenizeError::from(CompileError::Failed {
            exit_code: 1,
            diagnostics: "error(E050): G.g4:1:0: bad".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::Compilation);
        assert!(error.to_string().contains("error(E050): G.g4:1:0: bad"));
        assert!(error.is_client_error());
    }

    #[test]
    fn test_tool_faults_are_not_client_errors() {
        let missing = TokenizeError::from(CompileError::from(CommandError::ProgramNotFound {
            program: "lexgen".to_string(),
        }));
        assert_matches!(missing, TokenizeError::Compilation(CompileError::Tool(_)));
        assert_eq!(missing.kind(), ErrorKind::Compilation);
        assert!(!missing.is_client_error());

        let no_artifact = TokenizeError::from(CompileError::ArtifactMissing {
            path: PathBuf::from("out/GLexer.json"),
        });
        assert!(!no_artifact.is_client_error());
        assert!(!TokenizeError::CompilationTimeout { timeout_ms: 10 }.is_client_error());
        assert!(TokenizeError::from(IngestError::Empty).is_client_error());
    }

    #[test]
    fn test_error_response_serialization() {
        let error = TokenizeError::from(IngestError::Empty);
        let response = ErrorResponse::from(&error);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "invalid_grammar");
        assert_eq!(json["message"], "invalid grammar: grammar is empty");
        assert_eq!(ErrorKind::InvalidGrammar.to_string(), "InvalidGrammarError");
    }
}
