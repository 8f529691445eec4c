//! # Lexer Loader
//!
//! Reads `<Identifier>Lexer.json`, validates it and registers the resolved
//! lexer in the request's [`ResolutionScope`].

use super::automaton::{resolve, validate, ExecutableLexer};
use super::error::LoadError;
use super::scope::ResolutionScope;
use crate::compiler::CompiledLexerArtifact;
use crate::execution::{ExecutionError, LexerInstance};
use lexvis_compiler::artifact::schema::{LexerArtifact, DEFAULT_MODE, DEFAULT_TOKEN_CHANNEL};
use lexvis_compiler::config::compile_time::runtime::MAX_ARTIFACT_SIZE;
use lexvis_compiler::log_success;
use lexvis_compiler::logging::codes;
use std::sync::Arc;

/// Per-instance lexer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    pub initial_mode: usize,
    pub default_channel: i32,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            initial_mode: DEFAULT_MODE,
            default_channel: DEFAULT_TOKEN_CHANNEL,
        }
    }
}

impl LexerOptions {
    pub fn with_initial_mode(mut self, mode: usize) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn with_default_channel(mut self, channel: i32) -> Self {
        self.default_channel = channel;
        self
    }
}

/// Creates lexer instances bound to one input text each
#[derive(Debug, Clone)]
pub struct LexerFactory {
    key: String,
    lexer: Arc<ExecutableLexer>,
}

impl LexerFactory {
    /// Resolution scope key of the underlying unit
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lexer(&self) -> &ExecutableLexer {
        &self.lexer
    }

    pub fn create(&self, input: &str, options: LexerOptions) -> Result<LexerInstance, ExecutionError> {
        LexerInstance::new(Arc::clone(&self.lexer), input, options)
    }
}

/// Load a compiled artifact from disk
pub fn load(
    compiled: &CompiledLexerArtifact,
    scope: &mut ResolutionScope,
) -> Result<LexerFactory, LoadError> {
    let path = &compiled.artifact_path;
    let size = std::fs::metadata(path)
        .map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?
        .len();
    if size > MAX_ARTIFACT_SIZE {
        return Err(LoadError::TooLarge {
            path: path.clone(),
            size,
            limit: MAX_ARTIFACT_SIZE,
        });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
    })?;
    let artifact: LexerArtifact = serde_json::from_slice(&bytes)?;
    load_artifact(artifact, &compiled.lexer_name, scope)
}

/// Validate, resolve and register an in-memory artifact
pub fn load_artifact(
    artifact: LexerArtifact,
    expected_lexer: &str,
    scope: &mut ResolutionScope,
) -> Result<LexerFactory, LoadError> {
    validate(&artifact, expected_lexer)?;
    let (key, lexer) = scope.register(resolve(artifact))?;

    log_success!(codes::success::LEXER_LOADED, "Lexer resolved",
        "key" => &key,
        "modes" => lexer.modes.len(),
        "states" => lexer.state_count());

    Ok(LexerFactory { key, lexer })
}
