//! # Tokenizer Service
//!
//! Runs the five stages for one request inside a private workspace:
//! ingest, compile, load, tokenize, and unconditional cleanup.

use crate::api::config::{ConfigError, TokenizerConfig};
use crate::api::errors::TokenizeError;
use crate::compiler::LexerCompiler;
use crate::execution;
use crate::ingest::ingest;
use crate::resolution::{self, ResolutionScope};
use crate::types::TokenStream;
use crate::workspace::{Workspace, WorkspaceManager};
use chrono::{DateTime, Utc};
use lexvis_compiler::config::compile_time::runtime::MAX_INPUT_SIZE;
use lexvis_compiler::logging::{self, codes};
use lexvis_compiler::{log_error, log_info, log_performance};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Stage timings of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetrics {
    pub request_id: String,
    pub started_at: DateTime<Utc>,
    pub ingest: Duration,
    pub compile: Duration,
    pub load: Duration,
    pub tokenize: Duration,
    pub total: Duration,
}

impl StageMetrics {
    fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            started_at: Utc::now(),
            ingest: Duration::ZERO,
            compile: Duration::ZERO,
            load: Duration::ZERO,
            tokenize: Duration::ZERO,
            total: Duration::ZERO,
        }
    }
}

/// Successful result of [`Tokenizer::tokenize`]
#[derive(Debug, Clone)]
pub struct TokenizeOutcome {
    pub grammar_identifier: String,
    pub tokens: TokenStream,
    pub metrics: StageMetrics,
}

/// Response body: `{grammar_identifier, input_text, tokens}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizeResponse {
    pub grammar_identifier: String,
    pub input_text: String,
    pub tokens: TokenStream,
}

impl TokenizeResponse {
    pub fn new(outcome: TokenizeOutcome, input_text: impl Into<String>) -> Self {
        Self {
            grammar_identifier: outcome.grammar_identifier,
            input_text: input_text.into(),
            tokens: outcome.tokens,
        }
    }
}

/// Grammar-driven tokenization service
///
/// Each call to [`Tokenizer::tokenize`] is independent: its own request id,
/// workspace, resolution scope and lexer instance.
#[derive(Debug)]
pub struct Tokenizer {
    config: TokenizerConfig,
    workspaces: WorkspaceManager,
    compiler: LexerCompiler,
    tool_version: String,
}

impl Tokenizer {
    /// Validate the configuration and the grammar tool
    pub fn new(config: TokenizerConfig) -> Result<Self, ConfigError> {
        config.validate().map_err(|e| {
            log_error!(e.error_code(), &e.to_string());
            e
        })?;
        let compiler = LexerCompiler::new(config.tool.clone());
        let tool_version = compiler.validate_tool().map_err(|e| {
            log_error!(e.error_code(), &e.to_string());
            e
        })?;

        Ok(Self {
            workspaces: WorkspaceManager::new(config.workspace_base.clone()),
            compiler,
            tool_version,
            config,
        })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    /// Tokenize `input` with the lexer defined by `grammar`
    pub fn tokenize(
        &self,
        grammar: &[u8],
        filename: &str,
        input: &str,
    ) -> Result<TokenizeOutcome, TokenizeError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let result = logging::with_grammar_context(filename, || {
            log_info!("Tokenization request received",
                "request_id" => &request_id,
                "grammar_bytes" => grammar.len(),
                "input_bytes" => input.len());

            if input.len() > MAX_INPUT_SIZE {
                return Err(TokenizeError::Execution(
                    execution::ExecutionError::InputTooLarge {
                        size: input.len(),
                        limit: MAX_INPUT_SIZE,
                    },
                ));
            }

            let workspace = self.workspaces.open(&request_id)?;
            let result = self.run_stages(&workspace, grammar, filename, input);
            workspace.close();
            result
        });

        match result {
            Ok(mut outcome) => {
                outcome.metrics.total = started.elapsed();
                log_performance!(codes::success::REQUEST_COMPLETE, "Tokenization request complete",
                    duration = outcome.metrics.total,
                    "request_id" => &request_id,
                    "grammar" => &outcome.grammar_identifier,
                    "tokens" => outcome.tokens.len());
                Ok(outcome)
            }
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    "request_id" => &request_id,
                    "kind" => error.kind());
                Err(error)
            }
        }
    }

    fn run_stages(
        &self,
        workspace: &Workspace,
        grammar: &[u8],
        filename: &str,
        input: &str,
    ) -> Result<TokenizeOutcome, TokenizeError> {
        let mut metrics = StageMetrics::new(workspace.request_id());

        // Stage 1: Grammar ingestion
        let stage = Instant::now();
        let source = ingest(grammar, filename, workspace)?;
        metrics.ingest = stage.elapsed();

        // Stage 2: Lexer compilation
        let stage = Instant::now();
        let compiled = self.compiler.compile(&source, workspace)?;
        metrics.compile = stage.elapsed();

        // Stage 3: Lexer loading, scoped to this request
        let stage = Instant::now();
        let mut scope = ResolutionScope::new(workspace.request_id());
        let factory = resolution::load(&compiled, &mut scope)?;
        metrics.load = stage.elapsed();

        // Stage 4: Tokenization
        let stage = Instant::now();
        let tokens = execution::tokenize(&factory, input)?;
        metrics.tokenize = stage.elapsed();

        log_performance!(codes::success::TOKENIZATION_COMPLETE, "Input tokenized",
            duration = metrics.tokenize,
            "lexer" => factory.key(),
            "tokens" => tokens.len());

        Ok(TokenizeOutcome {
            grammar_identifier: source.identifier,
            tokens,
            metrics,
        })
    }
}
