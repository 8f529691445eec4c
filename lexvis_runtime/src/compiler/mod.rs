//! # Lexer Compiler
//!
//! Drives the external grammar tool over a stored grammar:
//! `<tool> -Dlanguage=Json -no-listener -o <workspace> <Identifier>.g4`.

pub mod command_executor;

pub use command_executor::{CommandError, CommandExecutor, CommandOutput};

use crate::api::config::{ConfigError, ToolConfig};
use crate::ingest::GrammarSource;
use crate::workspace::Workspace;
use lexvis_compiler::artifact::schema::LexerArtifact;
use lexvis_compiler::config::compile_time::runtime::MAX_DIAGNOSTIC_BYTES;
use lexvis_compiler::logging::codes;
use lexvis_compiler::{log_debug, log_performance, log_success};
use std::path::PathBuf;
use std::time::Duration;

/// Target flag understood by the tool; the runtime only loads JSON artifacts
pub const TARGET_LANGUAGE_FLAG: &str = "-Dlanguage=Json";

/// Output of a successful compilation
#[derive(Debug, Clone)]
pub struct CompiledLexerArtifact {
    pub grammar_identifier: String,
    pub lexer_name: String,
    pub artifact_path: PathBuf,
    /// `<Identifier>Lexer.tokens`, when the tool wrote one
    pub tokens_path: Option<PathBuf>,
    /// Warnings the tool printed on success
    pub diagnostics: String,
    pub duration: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("grammar compilation failed:\n{diagnostics}")]
    Failed { exit_code: i32, diagnostics: String },

    #[error("grammar compilation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("grammar compilation failed: artifact missing ({})", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("grammar tool could not be run: {0}")]
    Tool(CommandError),
}

impl From<CommandError> for CompileError {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::Timeout { timeout_ms } => CompileError::Timeout { timeout_ms },
            other => CompileError::Tool(other),
        }
    }
}

impl CompileError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            CompileError::Timeout { .. } => codes::runtime::COMPILATION_TIMEOUT,
            CompileError::Tool(_) => codes::runtime::TOOL_UNAVAILABLE,
            _ => codes::runtime::COMPILATION_FAILED,
        }
    }
}

/// Compiles grammars with one configured, version-checked tool
#[derive(Debug, Clone)]
pub struct LexerCompiler {
    tool: ToolConfig,
    executor: CommandExecutor,
}

impl LexerCompiler {
    pub fn new(tool: ToolConfig) -> Self {
        let executor = CommandExecutor::new(tool.timeout(), MAX_DIAGNOSTIC_BYTES);
        Self { tool, executor }
    }

    pub fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    /// Run `<tool> --version` and compare with the expected version
    pub fn validate_tool(&self) -> Result<String, ConfigError> {
        let output = self
            .executor
            .execute(&self.tool.path, &["--version"], None)
            .map_err(|e| ConfigError::ToolUnavailable {
                path: self.tool.path.clone(),
                reason: e.to_string(),
            })?;
        if !output.success() {
            return Err(ConfigError::ToolUnavailable {
                path: self.tool.path.clone(),
                reason: format!("--version exited with status {}", output.exit_code),
            });
        }

        let reported = output.stdout.trim().to_string();
        let version = reported.split_whitespace().last().unwrap_or_default();
        if version != self.tool.expected_version {
            return Err(ConfigError::ToolVersionMismatch {
                expected: self.tool.expected_version.clone(),
                found: reported,
            });
        }

        log_success!(codes::success::TOOL_VALIDATED, "Grammar tool validated",
            "path" => self.tool.path.display(),
            "version" => version);
        Ok(version.to_string())
    }

    /// Compile `grammar` into `<workspace>/<Identifier>Lexer.json`
    pub fn compile(
        &self,
        grammar: &GrammarSource,
        workspace: &Workspace,
    ) -> Result<CompiledLexerArtifact, CompileError> {
        let args = [
            TARGET_LANGUAGE_FLAG.into(),
            "-no-listener".into(),
            "-o".into(),
            workspace.root().as_os_str().to_os_string(),
            grammar.path.as_os_str().to_os_string(),
        ];
        log_debug!("Invoking grammar tool",
            "tool" => self.tool.path.display(),
            "grammar" => grammar.path.display());

        let output = self.executor.execute::<std::ffi::OsString>(&self.tool.path, &args, None)?;
        if !output.success() {
            let mut diagnostics = output.stderr;
            if diagnostics.trim().is_empty() {
                diagnostics = output.stdout;
            }
            if output.truncated {
                diagnostics.push_str("\n... (diagnostics truncated)");
            }
            return Err(CompileError::Failed {
                exit_code: output.exit_code,
                diagnostics,
            });
        }

        let lexer_name = LexerArtifact::lexer_name_for(&grammar.identifier);
        let artifact_path = workspace.file(&format!("{}.json", lexer_name));
        if !artifact_path.is_file() {
            return Err(CompileError::ArtifactMissing {
                path: artifact_path,
            });
        }
        let tokens_path = Some(workspace.file(&format!("{}.tokens", lexer_name)))
            .filter(|path| path.is_file());

        log_performance!(codes::success::LEXER_COMPILED, "Grammar compiled",
            duration = output.duration,
            "lexer" => &lexer_name);

        Ok(CompiledLexerArtifact {
            grammar_identifier: grammar.identifier.clone(),
            lexer_name,
            artifact_path,
            tokens_path,
            diagnostics: output.stderr,
            duration: output.duration,
        })
    }
}
