// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerPreferences {
    /// Whether a grammar name that differs from its file stem is reported
    pub warn_on_name_mismatch: bool,

    /// Whether embedded actions and predicates are reported when skipped
    pub warn_on_ignored_actions: bool,

    /// Whether the ANTLR-style `.tokens` vocabulary file is written next to the artifact
    pub emit_tokens_file: bool,

    /// Whether the JSON artifact is pretty printed
    pub pretty_artifact: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            warn_on_name_mismatch: env::var("LEXVIS_WARN_NAME_MISMATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            warn_on_ignored_actions: env::var("LEXVIS_WARN_IGNORED_ACTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            emit_tokens_file: env::var("LEXVIS_EMIT_TOKENS_FILE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            pretty_artifact: env::var("LEXVIS_PRETTY_ARTIFACT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include stage timings in logs
    pub log_performance_events: bool,

    /// Whether to attach the grammar file context to log events
    pub include_grammar_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("LEXVIS_STRUCTURED_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("LEXVIS_LOG_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("LEXVIS_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_grammar_context: env::var("LEXVIS_LOG_GRAMMAR_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse a log level name (case-insensitive)
pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" | "trace" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub compiler: CompilerPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Compiler
    pub const WARN_NAME_MISMATCH: &str = "LEXVIS_WARN_NAME_MISMATCH";
    pub const WARN_IGNORED_ACTIONS: &str = "LEXVIS_WARN_IGNORED_ACTIONS";
    pub const EMIT_TOKENS_FILE: &str = "LEXVIS_EMIT_TOKENS_FILE";
    pub const PRETTY_ARTIFACT: &str = "LEXVIS_PRETTY_ARTIFACT";

    // Logging
    pub const STRUCTURED_LOGGING: &str = "LEXVIS_STRUCTURED_LOGGING";
    pub const LOG_LEVEL: &str = "LEXVIS_LOG_LEVEL";
    pub const LOG_PERFORMANCE: &str = "LEXVIS_LOG_PERFORMANCE";
    pub const LOG_GRAMMAR_CONTEXT: &str = "LEXVIS_LOG_GRAMMAR_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level(" warn "), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert_eq!(LogLevel::Info.as_str(), "INFO");
    }
}
