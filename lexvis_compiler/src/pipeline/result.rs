use crate::semantic_analysis::SemanticWarning;
use std::path::PathBuf;
use std::time::Duration;

/// Result of compiling one grammar file
#[derive(Debug)]
pub struct PipelineResult {
    pub grammar_name: String,
    pub artifact_path: PathBuf,
    pub tokens_path: Option<PathBuf>,
    pub warnings: Vec<SemanticWarning>,
    pub stats: CompileStats,
}

#[derive(Debug, Clone, Default)]
pub struct CompileStats {
    pub grammar_bytes: u64,
    pub grammar_tokens: usize,
    pub token_types: usize,
    pub modes: usize,
    pub automaton_states: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn log_success(&self, file_path: &str) {
        crate::log_performance!(
            crate::logging::codes::success::GRAMMAR_COMPILED,
            "Grammar compiled",
            duration = self.stats.processing_duration,
            "file" => file_path,
            "grammar" => &self.grammar_name,
            "token_types" => self.stats.token_types,
            "modes" => self.stats.modes,
            "states" => self.stats.automaton_states,
            "warnings" => self.warnings.len()
        );
    }
}
