//! # Grammar Ingestor
//!
//! Validates an uploaded grammar, derives its identifier and stores it as
//! `<workspace>/<Identifier>.g4`.

use crate::workspace::Workspace;
use lexvis_compiler::config::compile_time::grammar::MAX_GRAMMAR_SIZE;
use lexvis_compiler::log_success;
use lexvis_compiler::logging::codes;
use lexvis_compiler::pipeline::is_valid_identifier;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Declared kind of a grammar header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Lexer,
    Parser,
    Combined,
    Undeclared,
}

/// A validated, named grammar stored inside a workspace
#[derive(Debug, Clone)]
pub struct GrammarSource {
    pub text: String,
    pub identifier: String,
    pub kind: GrammarKind,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("grammar is empty")]
    Empty,

    #[error("grammar is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("grammar is not valid UTF-8 (byte offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("cannot derive a grammar identifier from '{filename}'")]
    NoIdentifier { filename: String },

    #[error("cannot store grammar at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grammar header pattern is invalid: {0}")]
    Pattern(#[from] regex::Error),
}

impl IngestError {
    pub fn error_code(&self) -> codes::Code {
        codes::runtime::INVALID_GRAMMAR
    }
}

static HEADER_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn header_pattern() -> Result<&'static Regex, IngestError> {
    HEADER_PATTERN
        .get_or_init(|| {
            Regex::new(r"^(?:(lexer|parser)\s+)?grammar\s+([A-Za-z_][A-Za-z0-9_]*)\s*;")
        })
        .as_ref()
        .map_err(|e| IngestError::Pattern(e.clone()))
}

/// Validate `raw`, name it and write it into the workspace
pub fn ingest(raw: &[u8], filename: &str, workspace: &Workspace) -> Result<GrammarSource, IngestError> {
    if raw.len() > MAX_GRAMMAR_SIZE {
        return Err(IngestError::TooLarge {
            size: raw.len(),
            limit: MAX_GRAMMAR_SIZE,
        });
    }
    let text = std::str::from_utf8(raw).map_err(|e| IngestError::InvalidEncoding {
        offset: e.valid_up_to(),
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }

    let (identifier, kind) = match declared_name(text)? {
        Some(declared) => declared,
        None => (
            identifier_from_filename(filename).ok_or_else(|| IngestError::NoIdentifier {
                filename: filename.to_string(),
            })?,
            GrammarKind::Undeclared,
        ),
    };

    let path = workspace.file(&format!("{}.g4", identifier));
    std::fs::write(&path, text).map_err(|source| IngestError::Io {
        path: path.clone(),
        source,
    })?;

    log_success!(codes::success::GRAMMAR_INGESTED, "Grammar stored",
        "identifier" => &identifier,
        "kind" => format!("{:?}", kind),
        "bytes" => raw.len());

    Ok(GrammarSource {
        text: text.to_string(),
        identifier,
        kind,
        path,
    })
}

/// Name and kind from the first declaration line, if it is a grammar header
pub fn declared_name(text: &str) -> Result<Option<(String, GrammarKind)>, IngestError> {
    let rest = skip_leading_trivia(text);
    let line = rest.lines().next().unwrap_or("");
    let Some(captures) = header_pattern()?.captures(line) else {
        return Ok(None);
    };

    let kind = match captures.get(1).map(|m| m.as_str()) {
        Some("lexer") => GrammarKind::Lexer,
        Some(_) => GrammarKind::Parser,
        None => GrammarKind::Combined,
    };
    Ok(captures.get(2).map(|name| (name.as_str().to_string(), kind)))
}

/// Skip whitespace, `//` and `/* */` comments before the first declaration
fn skip_leading_trivia(text: &str) -> &str {
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            return rest;
        }
    }
}

/// Base name without extension, sanitized to `[A-Za-z_][A-Za-z0-9_]*`
pub fn identifier_from_filename(filename: &str) -> Option<String> {
    // Uploaded names may carry either separator
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = Path::new(base).file_stem()?.to_str()?;

    let mut identifier: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }

    is_valid_identifier(&identifier).then_some(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceManager;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn open_workspace(base: &Path) -> Workspace {
        WorkspaceManager::new(Some(base.to_path_buf()))
            .open("ingest-test")
            .unwrap()
    }

    #[test]
    fn test_declared_names() {
        assert_eq!(
            declared_name("lexer grammar Calc;\nA : 'a';").unwrap(),
            Some(("Calc".to_string(), GrammarKind::Lexer))
        );
        assert_eq!(
            declared_name("grammar Expr;").unwrap(),
            Some(("Expr".to_string(), GrammarKind::Combined))
        );
        assert_eq!(
            declared_name("parser grammar P;").unwrap(),
            Some(("P".to_string(), GrammarKind::Parser))
        );
        assert_eq!(declared_name("A : 'a';").unwrap(), None);
    }

    #[test]
    fn test_header_after_comments_and_blank_lines() {
        let text = "\n\n// leading comment\n/* block\n comment */\n  lexer grammar Words ;\n";
        assert_eq!(
            declared_name(text).unwrap(),
            Some(("Words".to_string(), GrammarKind::Lexer))
        );
    }

    #[test]
    fn test_filename_fallback_sanitization() {
        assert_eq!(identifier_from_filename("foo.ext").as_deref(), Some("foo"));
        assert_eq!(identifier_from_filename("my-grammar.g4").as_deref(), Some("my_grammar"));
        assert_eq!(identifier_from_filename("9lives.g4").as_deref(), Some("_9lives"));
        assert_eq!(identifier_from_filename("dir/sub\\Calc.g4").as_deref(), Some("Calc"));
        assert_eq!(identifier_from_filename(""), None);
    }

    #[test]
    fn test_ingest_persists_named_file() {
        let base = tempdir().unwrap();
        let workspace = open_workspace(base.path());
        let source = ingest(b"lexer grammar Calc;\nNUM : [0-9]+ ;\n", "upload.g4", &workspace).unwrap();

        assert_eq!(source.identifier, "Calc");
        assert_eq!(source.kind, GrammarKind::Lexer);
        assert_eq!(source.path, workspace.root().join("Calc.g4"));
        assert_eq!(std::fs::read_to_string(&source.path).unwrap(), source.text);
    }

    #[test]
    fn test_ingest_without_header_uses_filename() {
        let base = tempdir().unwrap();
        let workspace = open_workspace(base.path());
        let source = ingest(b"WORD : [a-z]+ ;", "foo.ext", &workspace).unwrap();
        assert_eq!(source.identifier, "foo");
        assert_eq!(source.kind, GrammarKind::Undeclared);
        assert!(workspace.root().join("foo.g4").is_file());
    }

    #[test]
    fn test_ingest_rejections() {
        let base = tempdir().unwrap();
        let workspace = open_workspace(base.path());

        assert_matches!(ingest(b"  \n\t ", "a.g4", &workspace), Err(IngestError::Empty));
        assert_matches!(
            ingest(&[0x66, 0x6f, 0xff, 0xfe], "a.g4", &workspace),
            Err(IngestError::InvalidEncoding { offset: 2 })
        );
        assert_matches!(
            ingest(b"A : 'a';", "", &workspace),
            Err(IngestError::NoIdentifier { .. })
        );
        let oversized = vec![b'a'; MAX_GRAMMAR_SIZE + 1];
        assert_matches!(
            ingest(&oversized, "big.g4", &workspace),
            Err(IngestError::TooLarge { .. })
        );
    }
}
