use lexvis_compiler::logging::codes;
use std::path::PathBuf;

/// Failures turning a compiled artifact into an executable lexer
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("artifact {} is {size} bytes, limit is {limit}", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("cannot read artifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("artifact defines lexer '{found}', expected '{expected}'")]
    LexerNameMismatch { expected: String, found: String },

    #[error("invalid artifact: {reason}")]
    InvalidArtifact { reason: String },

    #[error("resolution unit '{key}' is already registered")]
    DuplicateUnit { key: String },
}

impl LoadError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        LoadError::InvalidArtifact {
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> codes::Code {
        codes::runtime::LOAD_FAILED
    }
}
