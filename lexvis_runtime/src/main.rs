//! # lexvis
//!
//! CLI for tokenizing a text sample with an ANTLR-style grammar. Prints a
//! `TokenizeResponse` or an `ErrorResponse` as JSON.

use clap::{ArgGroup, Parser};
use lexvis_runtime::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lexvis", version, about = "Tokenize text with a grammar-defined lexer")]
#[command(group(ArgGroup::new("source").required(true).args(["input", "input_file"])))]
struct Args {
    /// Grammar file (.g4)
    #[arg(long)]
    grammar: PathBuf,

    /// Text to tokenize
    #[arg(long)]
    input: Option<String>,

    /// File holding the text to tokenize
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Grammar compilation tool (defaults to LEXVIS_TOOL_PATH or lexgen)
    #[arg(long)]
    tool: Option<PathBuf>,

    /// Compilation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = lexvis_compiler::logging::init_global_logging() {
        eprintln!("warning: logging unavailable: {}", e);
    }

    match run(&args) {
        Ok(response) => emit(&response, args.pretty, ExitCode::SUCCESS),
        Err(error) => emit(&error, args.pretty, ExitCode::FAILURE),
    }
}

fn run(args: &Args) -> Result<TokenizeResponse, ErrorResponse> {
    let mut config = TokenizerConfig::from_env().map_err(|e| ErrorResponse::from(&e))?;
    if let Some(tool) = &args.tool {
        config = config.with_tool_path(tool);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    let tokenizer = Tokenizer::new(config).map_err(|e| ErrorResponse::from(&e))?;

    let grammar = std::fs::read(&args.grammar).map_err(|e| ErrorResponse {
        kind: ErrorKind::InvalidGrammar,
        message: format!("cannot read {}: {}", args.grammar.display(), e),
    })?;
    let filename = args
        .grammar
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let input = match (&args.input, &args.input_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| ErrorResponse {
            kind: ErrorKind::Execution,
            message: format!("cannot read {}: {}", path.display(), e),
        })?,
        (None, None) => String::new(),
    };

    tokenizer
        .tokenize(&grammar, &filename, &input)
        .map(|outcome| TokenizeResponse::new(outcome, input.as_str()))
        .map_err(|e| ErrorResponse::from(&e))
}

fn emit<T: Serialize>(value: &T, pretty: bool, code: ExitCode) -> ExitCode {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            code
        }
        Err(e) => {
            eprintln!("error: cannot serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}
