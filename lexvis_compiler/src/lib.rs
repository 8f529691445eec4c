//! LEXVIS grammar compiler
//!
//! Compiles ANTLR 4 lexer and combined grammars into `<Name>Lexer.json`
//! artifacts: a vocabulary, a rule table with resolved lexer commands, and a
//! Thompson NFA per lexer mode.

pub mod artifact;
pub mod automaton;
pub mod cli;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod semantic_analysis;
pub mod syntax;
pub mod tokens;
pub mod utils;

pub use artifact::{LexerAction, LexerArtifact, Vocabulary, FORMAT_VERSION, TOOL_VERSION};
pub use pipeline::{compile_grammar_file, compile_source, PipelineError, PipelineResult};
