//! # Public API for the tokenization pipeline
//!
//! `Tokenizer` is the service entry point; the other stage components are
//! re-exported for callers that drive the pipeline themselves.

pub mod config;
pub mod errors;
pub mod tokenizer;

pub use config::{ConfigError, ToolConfig, TokenizerConfig};
pub use errors::{ErrorKind, ErrorResponse, TokenizeError};
pub use tokenizer::{StageMetrics, TokenizeOutcome, TokenizeResponse, Tokenizer};

pub use crate::compiler::{CompileError, CompiledLexerArtifact, LexerCompiler};
pub use crate::execution::{tokenize, ExecutionError, LexerInstance};
pub use crate::ingest::{ingest, GrammarKind, GrammarSource, IngestError};
pub use crate::resolution::{load, LexerFactory, LexerOptions, LoadError, ResolutionScope};
pub use crate::types::{Token, TokenStream};
pub use crate::workspace::{Workspace, WorkspaceError, WorkspaceManager};
