//! Grammar compilation pipeline
//!
//! file -> lexical -> syntax -> semantics -> automaton -> artifact

mod error;
mod result;
mod validation;

pub use error::{Diagnostic, DiagnosticSeverity, PipelineError};
pub use result::{CompileStats, PipelineResult};
pub use validation::validate_pipeline;

use crate::artifact::{self, LexerArtifact};
use crate::config::runtime::CompilerPreferences;
use crate::grammar::ast::GrammarFile;
use crate::logging::{self, codes};
use crate::semantic_analysis::{AnalyzedGrammar, LintSettings, SemanticAnalyzer, SemanticWarning};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where and how artifacts are written
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub output_dir: PathBuf,
    pub preferences: CompilerPreferences,
}

impl CompileOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            preferences: CompilerPreferences::default(),
        }
    }
}

/// In-memory compilation result
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub grammar: AnalyzedGrammar,
    pub artifact: LexerArtifact,
    pub warnings: Vec<SemanticWarning>,
    pub grammar_tokens: usize,
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn grammar_name(grammar: &GrammarFile, file_stem: Option<&str>) -> Result<String, PipelineError> {
    if let Some(name) = &grammar.name {
        return Ok(name.value.clone());
    }
    match file_stem {
        Some(stem) if is_valid_identifier(stem) => Ok(stem.to_string()),
        other => Err(PipelineError::InvalidIdentifier {
            source_name: other.unwrap_or("<unnamed>").to_string(),
        }),
    }
}

/// Compile grammar text without touching the filesystem
pub fn compile_source(
    source: &str,
    file_stem: Option<&str>,
    preferences: &CompilerPreferences,
) -> Result<CompiledGrammar, PipelineError> {
    // Stage 1: Lexical analysis
    let tokens = crate::lexical::tokenize(source)?;
    let grammar_tokens = tokens.len();

    // Stage 2: Syntax analysis
    let ast = crate::syntax::parse_grammar(tokens)?;
    let name = grammar_name(&ast, file_stem)?;

    // Stage 3: Semantic analysis
    let analyzer = SemanticAnalyzer::new(LintSettings {
        warn_on_name_mismatch: preferences.warn_on_name_mismatch,
        warn_on_ignored_actions: preferences.warn_on_ignored_actions,
    });
    let output = analyzer.analyze(&ast, &name, file_stem);
    let grammar = match output.grammar {
        Some(grammar) if output.errors.is_empty() => grammar,
        _ => {
            return Err(PipelineError::SemanticAnalysis {
                errors: output.errors,
                warnings: output.warnings,
            })
        }
    };

    // Stage 4: Automaton construction
    let automata = crate::automaton::build_automata(&grammar).map_err(|e| {
        crate::log_error!(e.error_code(), &e.to_string(), "grammar" => &name);
        e
    })?;
    crate::log_success!(codes::success::AUTOMATON_BUILT,
        "Lexer automata built",
        "grammar" => &name,
        "modes" => automata.modes.len(),
        "states" => automata.state_count());

    // Stage 5: Artifact assembly
    let artifact = artifact::assemble(&grammar, automata);

    Ok(CompiledGrammar {
        grammar,
        artifact,
        warnings: output.warnings,
        grammar_tokens,
    })
}

/// Compile a `.g4` file and write `<Name>Lexer.json` (and `.tokens`) to the output directory
pub fn compile_grammar_file(
    path: &Path,
    options: &CompileOptions,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let display = path.display().to_string();

    logging::with_grammar_context(&display, || {
        crate::log_info!("Starting grammar compilation", "file" => &display);

        let file = crate::file_processor::process_file(path)?;
        let compiled = compile_source(
            &file.source,
            file.metadata.stem.as_deref(),
            &options.preferences,
        )?;

        let artifact_path = artifact::write_artifact(
            &compiled.artifact,
            &options.output_dir,
            options.preferences.pretty_artifact,
        )?;
        let tokens_path = if options.preferences.emit_tokens_file {
            Some(artifact::write_tokens_file(&compiled.grammar, &options.output_dir)?)
        } else {
            None
        };

        let result = PipelineResult {
            grammar_name: compiled.grammar.name.clone(),
            artifact_path,
            tokens_path,
            stats: CompileStats {
                grammar_bytes: file.metadata.size,
                grammar_tokens: compiled.grammar_tokens,
                token_types: compiled.artifact.vocabulary.max_token_type as usize,
                modes: compiled.artifact.modes.len(),
                automaton_states: compiled.artifact.state_count(),
                processing_duration: start_time.elapsed(),
            },
            warnings: compiled.warnings,
        };
        result.log_success(&display);
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn prefs() -> CompilerPreferences {
        CompilerPreferences {
            warn_on_name_mismatch: true,
            warn_on_ignored_actions: true,
            emit_tokens_file: true,
            pretty_artifact: false,
        }
    }

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("Calc_2"));
        assert!(is_valid_identifier("_x"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("my-grammar"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_compile_file_writes_artifacts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Words.g4");
        fs::write(&path, "lexer grammar Words;\nWORD : ~[ ]+ ;\nWS : ' '+ -> skip ;\n").unwrap();

        let mut options = CompileOptions::new(dir.path());
        options.preferences = prefs();
        let result = compile_grammar_file(&path, &options).unwrap();

        assert_eq!(result.grammar_name, "Words");
        assert!(result.artifact_path.ends_with("WordsLexer.json"));
        assert!(result.artifact_path.exists());
        assert!(result.tokens_path.unwrap().exists());
        assert_eq!(result.stats.token_types, 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_header_uses_file_stem() {
        let compiled = compile_source("A : 'a' ;\n", Some("foo"), &prefs()).unwrap();
        assert_eq!(compiled.artifact.lexer_name, "fooLexer");

        let err = compile_source("A : 'a' ;\n", Some("3d-model"), &prefs()).unwrap_err();
        assert_matches!(err, PipelineError::InvalidIdentifier { .. });
    }

    #[test]
    fn test_diagnostic_format() {
        let err = compile_source("lexer grammar G;\nA : 'a' B ;\n", Some("G"), &prefs()).unwrap_err();
        let lines: Vec<String> = err.diagnostics("G.g4").iter().map(|d| d.to_string()).collect();
        assert_eq!(lines, vec!["error(E100): G.g4:2:8: reference to undefined rule: B"]);

        let err = compile_source("lexer grammar G;\nA : 'a' ", Some("G"), &prefs()).unwrap_err();
        assert_matches!(err, PipelineError::SyntaxAnalysis(_));
        assert!(err.diagnostics("G.g4")[0].to_string().starts_with("error(E05"));
    }

    #[test]
    fn test_warnings_survive_failure() {
        let err = compile_source("lexer grammar H;\nA : 'a' -> mode(X) ;\n", Some("G"), &prefs()).unwrap_err();
        let lines: Vec<String> = err.diagnostics("G.g4").iter().map(|d| d.to_string()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("error(E103): G.g4:2:11: "));
        assert!(lines[1].starts_with("warning(W100): G.g4:1:14: "));
    }

    #[test]
    fn test_parser_grammar_rejected() {
        let err = compile_source("parser grammar P;\ns : 'x' ;\n", Some("P"), &prefs()).unwrap_err();
        assert_eq!(err.error_code(), codes::syntax::PARSER_GRAMMAR_UNSUPPORTED);
    }
}
