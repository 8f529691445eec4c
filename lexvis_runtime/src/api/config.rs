//! # Tokenizer Configuration
//!
//! Service configuration comes from defaults, the environment
//! (`LEXVIS_TOOL_PATH`, `LEXVIS_TOOL_VERSION`, `LEXVIS_COMPILE_TIMEOUT_MS`,
//! `LEXVIS_WORKSPACE_DIR`) or a TOML document.

use lexvis_compiler::artifact::schema::{TOOL_NAME, TOOL_VERSION};
use lexvis_compiler::config::compile_time::runtime::{
    DEFAULT_COMPILE_TIMEOUT_MS, MAX_COMPILE_TIMEOUT_MS,
};
use lexvis_compiler::logging::codes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location and expected version of the grammar compilation tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub path: PathBuf,
    pub expected_version: String,
    pub timeout_ms: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: default_tool_path(),
            expected_version: TOOL_VERSION.to_string(),
            timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
        }
    }
}

/// `lexgen` next to the running executable, else whatever `lexgen` resolves to
fn default_tool_path() -> PathBuf {
    let sibling = std::env::current_exe()
        .ok()
        .map(|exe| exe.with_file_name(format!("{}{}", TOOL_NAME, std::env::consts::EXE_SUFFIX)));
    match sibling {
        Some(path) if path.is_file() => path,
        _ => PathBuf::from(TOOL_NAME),
    }
}

impl ToolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_expected_version(mut self, version: impl Into<String>) -> Self {
        self.expected_version = version.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tool.path".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.expected_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "tool.expected_version".to_string(),
                value: self.expected_version.clone(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_COMPILE_TIMEOUT_MS {
            return Err(ConfigError::InvalidValue {
                key: "tool.timeout_ms".to_string(),
                value: self.timeout_ms.to_string(),
                reason: format!("must be between 1 and {}", MAX_COMPILE_TIMEOUT_MS),
            });
        }
        Ok(())
    }
}

/// Configuration for the [`crate::api::Tokenizer`] service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub tool: ToolConfig,
    /// Parent of request workspaces; the system temp directory when unset
    pub workspace_base: Option<PathBuf>,
}

impl TokenizerConfig {
    pub fn new(tool: ToolConfig) -> Self {
        Self {
            tool,
            workspace_base: None,
        }
    }

    /// Defaults overridden by `LEXVIS_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("LEXVIS_TOOL_PATH") {
            config.tool.path = PathBuf::from(path);
        }
        if let Some(version) = lookup("LEXVIS_TOOL_VERSION") {
            config.tool.expected_version = version;
        }
        if let Some(timeout) = lookup("LEXVIS_COMPILE_TIMEOUT_MS") {
            config.tool.timeout_ms =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "LEXVIS_COMPILE_TIMEOUT_MS".to_string(),
                        value: timeout.clone(),
                        reason: "not a number of milliseconds".to_string(),
                    })?;
        }
        if let Some(dir) = lookup("LEXVIS_WORKSPACE_DIR") {
            config.workspace_base = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_workspace_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.workspace_base = Some(base.into());
        self
    }

    pub fn with_tool_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool.path = path.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.tool.timeout_ms = timeout_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tool.validate()?;
        if let Some(base) = &self.workspace_base {
            if !base.is_dir() {
                return Err(ConfigError::InvalidValue {
                    key: "workspace_base".to_string(),
                    value: base.display().to_string(),
                    reason: "not a directory".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Startup configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration value for {key} ('{value}'): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid configuration document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot read configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grammar tool {} is unavailable: {reason}", path.display())]
    ToolUnavailable { path: PathBuf, reason: String },

    #[error("grammar tool version mismatch: expected {expected}, found '{found}'")]
    ToolVersionMismatch { expected: String, found: String },
}

impl ConfigError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            ConfigError::ToolUnavailable { .. } => codes::runtime::TOOL_UNAVAILABLE,
            ConfigError::ToolVersionMismatch { .. } => codes::runtime::TOOL_VERSION_MISMATCH,
            _ => codes::runtime::CONFIGURATION_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TokenizerConfig::default();
        assert_eq!(config.tool.expected_version, TOOL_VERSION);
        assert_eq!(config.tool.timeout_ms, DEFAULT_COMPILE_TIMEOUT_MS);
        assert!(config.workspace_base.is_none());
        assert!(config.tool.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TokenizerConfig::default()
            .with_tool_path("/opt/lexgen")
            .with_timeout_ms(2500)
            .with_workspace_base("/tmp");

        assert_eq!(config.tool.path, PathBuf::from("/opt/lexgen"));
        assert_eq!(config.tool.timeout(), Duration::from_millis(2500));
        assert_eq!(config.workspace_base, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LEXVIS_TOOL_PATH", "/usr/local/bin/lexgen"),
            ("LEXVIS_TOOL_VERSION", "9.9.9"),
            ("LEXVIS_COMPILE_TIMEOUT_MS", "750"),
            ("LEXVIS_WORKSPACE_DIR", "/var/tmp"),
        ]
        .into_iter()
        .collect();
        let config = TokenizerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.tool.path, PathBuf::from("/usr/local/bin/lexgen"));
        assert_eq!(config.tool.expected_version, "9.9.9");
        assert_eq!(config.tool.timeout_ms, 750);
        assert_eq!(config.workspace_base, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn test_bad_timeout_in_environment() {
        let result = TokenizerConfig::from_lookup(|k| {
            (k == "LEXVIS_COMPILE_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_matches!(result, Err(ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_toml_document() {
        let config = TokenizerConfig::from_toml_str(
            r#"
            workspace_base = "/srv/lexvis"

            [tool]
            path = "/opt/lexgen"
            timeout_ms = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.tool.path, PathBuf::from("/opt/lexgen"));
        assert_eq!(config.tool.timeout_ms, 3000);
        assert_eq!(config.tool.expected_version, TOOL_VERSION);
        assert_eq!(config.workspace_base, Some(PathBuf::from("/srv/lexvis")));

        assert_matches!(
            TokenizerConfig::from_toml_str("tool = 3"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_validation_limits() {
        let zero = ToolConfig::new("/opt/lexgen").with_timeout_ms(0);
        assert_matches!(zero.validate(), Err(ConfigError::InvalidValue { .. }));

        let huge = ToolConfig::new("/opt/lexgen").with_timeout_ms(MAX_COMPILE_TIMEOUT_MS + 1);
        assert_matches!(huge.validate(), Err(ConfigError::InvalidValue { .. }));

        let missing_base = TokenizerConfig::default().with_workspace_base("/definitely/not/here");
        assert_matches!(missing_base.validate(), Err(ConfigError::InvalidValue { .. }));
    }
}
