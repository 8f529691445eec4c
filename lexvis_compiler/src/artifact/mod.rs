//! Lexer artifact assembly and emission

pub mod schema;
pub mod tokens_file;

pub use schema::{
    Accept, AlternativeInfo, LexerAction, LexerArtifact, ModeAutomaton, NfaState, RuleInfo,
    Transition, Vocabulary, FORMAT_VERSION, TOOL_NAME, TOOL_VERSION,
};

use crate::{
    automaton::AutomatonOutput, log_success, logging::codes, semantic_analysis::AnalyzedGrammar,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot serialize lexer artifact: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::Serialization(_) => codes::artifact::SERIALIZATION_ERROR,
            Self::Write { .. } => codes::artifact::WRITE_ERROR,
        }
    }
}

/// Combine the analyzed grammar with its automata
pub fn assemble(grammar: &AnalyzedGrammar, automata: AutomatonOutput) -> LexerArtifact {
    let rules = automata
        .token_rules
        .iter()
        .zip(&automata.non_greedy)
        .map(|(&index, &non_greedy)| {
            let rule = &grammar.rules[index];
            RuleInfo {
                name: rule.name.clone(),
                token_type: rule.token_type.unwrap_or(schema::INVALID_TYPE),
                mode: rule.mode,
                non_greedy,
                alternatives: rule
                    .alternatives
                    .iter()
                    .map(|alt| AlternativeInfo {
                        actions: alt.actions.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    LexerArtifact {
        format_version: FORMAT_VERSION,
        tool_version: TOOL_VERSION.to_string(),
        grammar_name: grammar.name.clone(),
        lexer_name: LexerArtifact::lexer_name_for(&grammar.name),
        generated_at: chrono::Utc::now(),
        vocabulary: grammar.vocabulary.clone(),
        channel_names: grammar.channel_names.clone(),
        mode_names: grammar.mode_names.clone(),
        rules,
        modes: automata.modes,
    }
}

pub fn artifact_path(out_dir: &Path, grammar_name: &str) -> PathBuf {
    out_dir.join(format!("{}.json", LexerArtifact::lexer_name_for(grammar_name)))
}

pub fn write_artifact(
    artifact: &LexerArtifact,
    out_dir: &Path,
    pretty: bool,
) -> Result<PathBuf, ArtifactError> {
    let json = if pretty {
        serde_json::to_string_pretty(artifact)?
    } else {
        serde_json::to_string(artifact)?
    };
    let path = artifact_path(out_dir, &artifact.grammar_name);
    write_file(&path, json.as_bytes())?;

    log_success!(codes::success::ARTIFACT_WRITTEN,
        "Lexer artifact written",
        "path" => path.display(),
        "bytes" => json.len(),
        "states" => artifact.state_count());
    Ok(path)
}

pub fn write_tokens_file(grammar: &AnalyzedGrammar, out_dir: &Path) -> Result<PathBuf, ArtifactError> {
    let path = out_dir.join(format!("{}.tokens", LexerArtifact::lexer_name_for(&grammar.name)));
    write_file(&path, tokens_file::render(grammar).as_bytes())?;
    Ok(path)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
    std::fs::write(path, contents).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::build_automata, lexical::tokenize, semantic_analysis::SemanticAnalyzer,
        syntax::parse_grammar,
    };
    use tempfile::TempDir;

    fn analyzed(source: &str) -> AnalyzedGrammar {
        let grammar = parse_grammar(tokenize(source).unwrap()).unwrap();
        SemanticAnalyzer::default()
            .analyze(&grammar, "Demo", None)
            .grammar
            .unwrap()
    }

    #[test]
    fn test_assemble_rule_table() {
        let grammar = analyzed(
            "grammar Demo;\ns : '+' ID ;\nID : [a-z]+ ;\nfragment F : 'f' ;\nWS : ' ' -> skip ;\n",
        );
        let artifact = assemble(&grammar, build_automata(&grammar).unwrap());
        assert_eq!(artifact.lexer_name, "DemoLexer");
        let names: Vec<&str> = artifact.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["T__0", "ID", "WS"]);
        assert_eq!(artifact.rules[2].token_type, 3);
        assert_eq!(artifact.rules[2].alternatives[0].actions, vec![LexerAction::Skip]);
        assert_eq!(artifact.channel_names, vec!["DEFAULT_TOKEN_CHANNEL", "HIDDEN"]);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let grammar = analyzed("lexer grammar Demo;\nA : 'a' ;\n");
        let artifact = assemble(&grammar, build_automata(&grammar).unwrap());

        let path = write_artifact(&artifact, dir.path(), true).unwrap();
        assert_eq!(path.file_name().unwrap(), "DemoLexer.json");
        let back: LexerArtifact =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, artifact);

        let tokens = write_tokens_file(&grammar, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(tokens).unwrap(), "A=1\n'a'=1\n");
    }

    #[test]
    fn test_write_error_has_code() {
        let grammar = analyzed("lexer grammar Demo;\nA : 'a' ;\n");
        let artifact = assemble(&grammar, build_automata(&grammar).unwrap());
        let err = write_artifact(&artifact, Path::new("/nonexistent/dir/for/lexvis"), false).unwrap_err();
        assert_eq!(err.error_code(), codes::artifact::WRITE_ERROR);
    }
}
