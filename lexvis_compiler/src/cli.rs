//! Command-line front end of the `lexgen` grammar compiler
//!
//! ```text
//! lexgen [-o DIR] [-Dlanguage=Json] [-no-listener] [-listener]
//!        [-visitor] [-no-visitor] [-log] [--version] [--help] GRAMMAR.g4
//! ```
//!
//! Exit status: 0 success, 1 grammar error, 2 usage error.

use crate::artifact::{TOOL_NAME, TOOL_VERSION};
use crate::config::runtime::CompilerPreferences;
use crate::pipeline::{self, CompileOptions, Diagnostic};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GRAMMAR_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// The only code generation target
pub const TARGET_LANGUAGE: &str = "Json";

#[derive(Debug, Clone, PartialEq)]
pub struct CompileArgs {
    pub grammar: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub log: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Compile(CompileArgs),
    Version,
    Help,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing argument for {0}")]
    MissingValue(String),

    #[error("unsupported target language {0}; only Json is available")]
    UnsupportedLanguage(String),

    #[error("no grammar file given")]
    NoGrammar,

    #[error("only one grammar file can be compiled per run")]
    TooManyGrammars,
}

pub fn parse_args<I, S>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut grammar: Option<PathBuf> = None;
    let mut output_dir = None;
    let mut log = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-help" | "-h" => return Ok(Command::Help),
            "--version" | "-version" => return Ok(Command::Version),
            "-o" => {
                let dir = args.next().ok_or_else(|| UsageError::MissingValue(arg.clone()))?;
                output_dir = Some(PathBuf::from(dir));
            }
            "-log" => log = true,
            "-listener" | "-no-listener" | "-visitor" | "-no-visitor" => {}
            other if other.starts_with("-Dlanguage=") => {
                let language = &other["-Dlanguage=".len()..];
                if language != TARGET_LANGUAGE {
                    return Err(UsageError::UnsupportedLanguage(language.to_string()));
                }
            }
            other if other.starts_with('-') => return Err(UsageError::UnknownOption(arg)),
            _ => {
                if grammar.is_some() {
                    return Err(UsageError::TooManyGrammars);
                }
                grammar = Some(PathBuf::from(arg));
            }
        }
    }

    let grammar = grammar.ok_or(UsageError::NoGrammar)?;
    Ok(Command::Compile(CompileArgs {
        grammar,
        output_dir,
        log,
    }))
}

pub fn usage() -> String {
    format!(
        "{TOOL_NAME} {TOOL_VERSION}: compile an ANTLR 4 lexer grammar to a loadable lexer\n\
         \n\
         USAGE:\n    {TOOL_NAME} [options] GRAMMAR.g4\n\
         \n\
         OPTIONS:\n\
         \x20   -o DIR            write generated files to DIR (default: the grammar's directory)\n\
         \x20   -Dlanguage=Json   target format (the only one available)\n\
         \x20   -listener, -no-listener, -visitor, -no-visitor\n\
         \x20                     accepted; lexers produce no listener or visitor\n\
         \x20   -log              write compiler log events to stderr\n\
         \x20   --version         print the tool version\n\
         \x20   --help            print this message\n"
    )
}

/// Run the tool and return its exit status
pub fn run<I, S>(args: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let command = match parse_args(args) {
        Ok(command) => command,
        Err(error) => {
            let _ = writeln!(stderr, "error: {}", error);
            let _ = write!(stderr, "{}", usage());
            return EXIT_USAGE;
        }
    };

    match command {
        Command::Help => {
            let _ = write!(stdout, "{}", usage());
            EXIT_SUCCESS
        }
        Command::Version => {
            let _ = writeln!(stdout, "{} {}", TOOL_NAME, TOOL_VERSION);
            EXIT_SUCCESS
        }
        Command::Compile(args) => compile(&args, stderr),
    }
}

fn compile(args: &CompileArgs, stderr: &mut dyn Write) -> i32 {
    if args.log {
        if let Err(error) = crate::logging::init_global_logging() {
            let _ = writeln!(stderr, "warning: logging unavailable: {}", error);
        }
    }

    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.grammar
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let options = CompileOptions {
        output_dir,
        preferences: CompilerPreferences::default(),
    };
    let file = args.grammar.display().to_string();

    match pipeline::compile_grammar_file(&args.grammar, &options) {
        Ok(result) => {
            for warning in &result.warnings {
                let _ = writeln!(stderr, "{}", Diagnostic::warning(warning, &file));
            }
            EXIT_SUCCESS
        }
        Err(error) => {
            for diagnostic in error.diagnostics(&file) {
                let _ = writeln!(stderr, "{}", diagnostic);
            }
            EXIT_GRAMMAR_ERROR
        }
    }
}
